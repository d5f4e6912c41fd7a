//! CLI argument definitions for Siren.

use clap::{Parser, Subcommand};

/// Siren - unit and incident dispatch for emergency response.
///
/// Log in with `sn login police` or `sn login driver`, then use `sn board`.
#[derive(Parser, Debug)]
#[command(name = "sn")]
#[command(author, version, about = "Unit and incident dispatch for emergency response", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Load units and incidents from a JSON roster instead of the demo roster.
    /// Can also be set via SN_ROSTER environment variable.
    #[arg(long = "roster", global = true, env = "SN_ROSTER")]
    pub roster: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an operator session
    Login {
        /// Role to log in as
        #[arg(value_parser = ["driver", "police"])]
        role: String,

        #[arg(long, short = 'u')]
        username: String,

        #[arg(long, short = 'p')]
        password: String,
    },

    /// End the operator session
    Logout,

    /// Show the active session
    Whoami,

    /// Unit commands
    Unit {
        #[command(subcommand)]
        command: UnitCommands,
    },

    /// Incident commands
    Incident {
        #[command(subcommand)]
        command: IncidentCommands,
    },

    /// Dashboard for the logged-in role
    Board {
        /// Show the driver board for this unit
        #[arg(long)]
        unit: Option<String>,
    },

    /// Look up the display style for a status or priority value
    Style {
        #[arg(value_parser = ["unit-status", "priority", "incident-status"])]
        domain: String,

        /// Raw value, e.g. "en-route" or "In Progress"
        value: String,
    },

    /// Roster commands
    Roster {
        #[command(subcommand)]
        command: RosterCommands,
    },

    /// Configuration commands (config.kdl)
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Map provider commands
    Map {
        #[command(subcommand)]
        command: MapCommands,
    },
}

/// Unit subcommands
#[derive(Subcommand, Debug)]
pub enum UnitCommands {
    /// List units
    List {
        /// Filter by kind
        #[arg(long, value_parser = ["ambulance", "police"])]
        kind: Option<String>,

        /// Filter by status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show a unit
    Show {
        /// Unit ID (e.g., AMB-001)
        id: String,
    },

    /// Report a unit's status
    Status {
        /// Unit ID
        id: String,

        /// available, en-route, on-scene, returning or off-duty
        status: String,
    },
}

/// Incident subcommands
#[derive(Subcommand, Debug)]
pub enum IncidentCommands {
    /// List incidents
    List {
        /// Only pending and in-progress incidents
        #[arg(long)]
        open: bool,
    },

    /// Show an incident
    Show {
        /// Incident ID (e.g., INC-001)
        id: String,
    },

    /// Report a new incident
    Report {
        /// Free-text category, e.g. "Traffic Accident"
        category: String,

        #[arg(long, default_value = "medium", value_parser = ["high", "medium", "low"])]
        priority: String,

        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
    },

    /// Change an incident's status
    Status {
        id: String,

        /// pending, in-progress or resolved
        status: String,
    },

    /// Assign a unit to an incident
    Assign { incident: String, unit: String },

    /// Clear an incident's assigned unit
    Unassign { incident: String },

    /// Find the closest available unit for an incident
    Nearest {
        incident: String,

        #[arg(long, value_parser = ["ambulance", "police"])]
        kind: Option<String>,
    },
}

/// Roster subcommands
#[derive(Subcommand, Debug)]
pub enum RosterCommands {
    /// Print the active roster as JSON
    Export,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show every setting and where it came from
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., app-name, splash.show-duration)
        key: String,
        /// Configuration value
        value: String,
    },
}

/// Map subcommands
#[derive(Subcommand, Debug)]
pub enum MapCommands {
    /// Map provider token
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

/// Map token subcommands
#[derive(Subcommand, Debug)]
pub enum TokenCommands {
    /// Store a token in state.kdl
    Set { token: String },

    /// Show the effective token (masked) and its source
    Show,

    /// Remove the stored token
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_coordinates_parse() {
        let cli = Cli::try_parse_from([
            "sn", "incident", "report", "Fire", "--lat", "40.7", "--lng", "-74.0",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Incident {
                command: IncidentCommands::Report { lng, priority, .. },
            }) => {
                assert_eq!(lng, -74.0);
                assert_eq!(priority, "medium");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
