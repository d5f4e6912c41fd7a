//! Siren CLI - unit and incident dispatch for emergency response.

use clap::Parser;
use siren::cli::{
    Cli, Commands, ConfigCommands, IncidentCommands, MapCommands, RosterCommands, TokenCommands,
    UnitCommands,
};
use siren::commands::{self, Output};
use siren::config::{ConfigOverrides, OutputFormat, resolve_config};
use siren::models::{IncidentPriority, IncidentStatus, Role, UnitKind, UnitStatus};
use siren::storage::Storage;
use siren::store::{EntityStore, Roster, fixtures};
use std::path::Path;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Tracing filter directive, e.g. `SN_LOG=siren=debug`.
const LOG_ENV: &str = "SN_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let human_flag = cli.human_readable;
    let mut human = human_flag;

    let result = Storage::open().and_then(|storage| {
        human = human || prefers_human(&storage);
        run_command(cli.command, cli.roster.as_deref(), &storage, human, human_flag)
    });

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Log to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `output-format "human"` in config.kdl turns on human output without `-H`.
fn prefers_human(storage: &Storage) -> bool {
    resolve_config(storage, &ConfigOverrides::new())
        .map(|c| *c.output_format() == OutputFormat::Human)
        .unwrap_or(false)
}

/// Units and incidents for this invocation: a roster file, or the demo roster.
fn load_store(roster: Option<&Path>) -> Result<EntityStore, siren::Error> {
    match roster {
        Some(path) => {
            debug!(path = %path.display(), "loading roster");
            EntityStore::from_roster(Roster::load(path)?)
        }
        None => fixtures::demo_store(),
    }
}

fn run_command(
    command: Option<Commands>,
    roster: Option<&Path>,
    storage: &Storage,
    human: bool,
    human_flag: bool,
) -> Result<(), siren::Error> {
    match command {
        None => {
            let store = load_store(roster)?;
            output(&commands::status(storage, &store)?, human);
        }

        Some(Commands::Login {
            role,
            username,
            password,
        }) => {
            let role: Role = role.parse()?;
            output(&commands::login(storage, role, &username, &password)?, human);
        }

        Some(Commands::Logout) => output(&commands::logout(storage)?, human),

        Some(Commands::Whoami) => output(&commands::whoami(storage)?, human),

        Some(Commands::Unit { command }) => {
            let mut store = load_store(roster)?;
            match command {
                UnitCommands::List { kind, status } => {
                    let kind = kind.map(|k| k.parse::<UnitKind>()).transpose()?;
                    let status = status.map(|s| s.parse::<UnitStatus>()).transpose()?;
                    output(&commands::unit_list(&store, kind, status)?, human);
                }
                UnitCommands::Show { id } => output(&commands::unit_show(&store, &id)?, human),
                UnitCommands::Status { id, status } => {
                    let status: UnitStatus = status.parse()?;
                    output(
                        &commands::unit_status(storage, &mut store, &id, status)?,
                        human,
                    );
                }
            }
        }

        Some(Commands::Incident { command }) => {
            let mut store = load_store(roster)?;
            match command {
                IncidentCommands::List { open } => {
                    output(&commands::incident_list(&store, open)?, human)
                }
                IncidentCommands::Show { id } => {
                    output(&commands::incident_show(&store, &id)?, human)
                }
                IncidentCommands::Report {
                    category,
                    priority,
                    lat,
                    lng,
                } => {
                    let priority: IncidentPriority = priority.parse()?;
                    output(
                        &commands::incident_report(
                            storage, &mut store, &category, priority, lat, lng,
                        )?,
                        human,
                    );
                }
                IncidentCommands::Status { id, status } => {
                    let status: IncidentStatus = status.parse()?;
                    output(
                        &commands::incident_status(storage, &mut store, &id, status)?,
                        human,
                    );
                }
                IncidentCommands::Assign { incident, unit } => output(
                    &commands::incident_assign(storage, &mut store, &incident, &unit)?,
                    human,
                ),
                IncidentCommands::Unassign { incident } => output(
                    &commands::incident_unassign(storage, &mut store, &incident)?,
                    human,
                ),
                IncidentCommands::Nearest { incident, kind } => {
                    let kind = kind.map(|k| k.parse::<UnitKind>()).transpose()?;
                    output(&commands::incident_nearest(&store, &incident, kind)?, human);
                }
            }
        }

        Some(Commands::Board { unit }) => {
            let store = load_store(roster)?;
            output(&commands::board(storage, &store, unit.as_deref())?, human);
        }

        Some(Commands::Style { domain, value }) => {
            output(&commands::style(&domain, &value)?, human)
        }

        Some(Commands::Roster { command }) => match command {
            RosterCommands::Export => {
                let store = load_store(roster)?;
                output(&commands::roster_export(&store)?, human);
            }
        },

        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => {
                let mut overrides = ConfigOverrides::new();
                if human_flag {
                    overrides = overrides.with_output_format(OutputFormat::Human);
                }
                output(&commands::config_show(storage, &overrides)?, human);
            }
            ConfigCommands::Set { key, value } => {
                output(&commands::config_set(storage, &key, &value)?, human)
            }
        },

        Some(Commands::Map { command }) => match command {
            MapCommands::Token { command } => match command {
                TokenCommands::Set { token } => {
                    output(&commands::map_token_set(storage, &token)?, human)
                }
                TokenCommands::Show => output(&commands::map_token_show(storage)?, human),
                TokenCommands::Clear => output(&commands::map_token_clear(storage)?, human),
            },
        },
    }

    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
