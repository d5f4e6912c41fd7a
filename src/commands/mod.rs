//! Command implementations for the Siren CLI.
//!
//! This module contains the business logic for each CLI command.
//! Commands are organized by area:
//! - `account` - login, logout, whoami
//! - `fleet` - units, incidents, boards, styles, roster export
//! - `settings` - config.kdl and the map token
//!
//! Every command returns a result struct implementing [`Output`].

mod account;
mod fleet;
mod settings;

pub use account::*;
pub use fleet::*;
pub use settings::*;

use crate::Result;
use crate::session::Session;
use crate::storage::Storage;
use crate::store::EntityStore;
use serde::Serialize;
use tracing::warn;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

pub(crate) fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Bare `sn`: build info, session and roster totals.
#[derive(Serialize)]
pub struct StatusSummary {
    pub version: &'static str,
    pub commit: &'static str,
    pub built_at: &'static str,
    pub session: Option<Session>,
    pub units: usize,
    pub units_on_duty: usize,
    pub open_incidents: usize,
}

impl Output for StatusSummary {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Siren {} ({}, built {})",
            self.version, self.commit, self.built_at
        )];
        match &self.session {
            Some(s) => lines.push(format!("Logged in as {} ({})", s.username, s.role)),
            None => lines.push("Not logged in".to_string()),
        }
        lines.push(format!(
            "{} units ({} on duty), {} open incidents",
            self.units, self.units_on_duty, self.open_incidents
        ));
        lines.join("\n")
    }
}

/// Summarize the build, the session and the roster.
///
/// An unreadable state file is reported as no session rather than failing.
pub fn status(storage: &Storage, store: &EntityStore) -> Result<StatusSummary> {
    let session = match storage.read_state() {
        Ok(state) => Session::from_state(&state),
        Err(e) => {
            warn!(path = %storage.state_path().display(), error = %e, "ignoring unreadable state");
            None
        }
    };

    Ok(StatusSummary {
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("SN_GIT_COMMIT"),
        built_at: env!("SN_BUILD_TIMESTAMP"),
        session,
        units: store.list_units().len(),
        units_on_duty: store
            .list_units()
            .iter()
            .filter(|u| u.status.is_on_duty())
            .count(),
        open_incidents: store.open_incidents().count(),
    })
}
