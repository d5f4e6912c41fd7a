//! Operator session: who is logged in, and as which role.
//!
//! The session flag is persisted in state.kdl so it survives between
//! invocations. Credentials are checked only for presence; there is no
//! backend to verify them against.

use crate::config::SirenState;
use crate::models::Role;
use crate::storage::Storage;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// An active operator session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub role: Role,
    pub username: String,
    pub logged_in_at: DateTime<Utc>,
}

impl Session {
    /// Start a session. Both credentials must be non-blank.
    pub fn login(role: Role, username: &str, password: &str) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidInput("username cannot be empty".to_string()));
        }
        if password.trim().is_empty() {
            return Err(Error::InvalidInput("password cannot be empty".to_string()));
        }
        Ok(Self {
            role,
            username: username.to_string(),
            logged_in_at: Utc::now(),
        })
    }

    /// Read the session out of persisted state, if one is active.
    pub fn from_state(state: &SirenState) -> Option<Self> {
        let role = state.role?;
        Some(Self {
            role,
            username: state.username.clone().unwrap_or_default(),
            logged_in_at: state.logged_in_at.unwrap_or_else(Utc::now),
        })
    }

    /// Record this session in `state`, leaving the map token alone.
    pub fn apply_to(&self, state: &mut SirenState) {
        state.role = Some(self.role);
        state.username = Some(self.username.clone());
        state.logged_in_at = Some(self.logged_in_at);
    }

    /// Fail with `Forbidden` unless this session holds `role`.
    pub fn require_role(&self, role: Role) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "requires the {} role (logged in as {})",
                role, self.role
            )))
        }
    }
}

/// Drop the session fields from `state`.
pub fn clear(state: &mut SirenState) {
    state.role = None;
    state.username = None;
    state.logged_in_at = None;
}

/// The active session, or `NotLoggedIn`.
pub fn current(storage: &Storage) -> Result<Session> {
    Session::from_state(&storage.read_state()?).ok_or(Error::NotLoggedIn)
}

/// The active session, which must hold `role`.
pub fn require(storage: &Storage, role: Role) -> Result<Session> {
    let session = current(storage)?;
    session.require_role(role)?;
    Ok(session)
}

/// Persist a new session, replacing any previous one.
pub fn save(storage: &Storage, session: &Session) -> Result<()> {
    let mut state = storage.read_state()?;
    session.apply_to(&mut state);
    storage.write_state(&state)?;
    info!(role = %session.role, username = %session.username, "logged in");
    Ok(())
}

/// End the session. Returns the session that was active, if any.
pub fn logout(storage: &Storage) -> Result<Option<Session>> {
    let mut state = storage.read_state()?;
    let previous = Session::from_state(&state);
    if previous.is_some() {
        clear(&mut state);
        storage.write_state(&state)?;
        info!("logged out");
    }
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> Storage {
        Storage::with_dirs(dir.path().join("config"), dir.path().join("data"))
    }

    #[test]
    fn test_login_requires_credentials() {
        assert!(matches!(
            Session::login(Role::Police, "  ", "secret"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Session::login(Role::Police, "dispatcher7", ""),
            Err(Error::InvalidInput(_))
        ));
        let session = Session::login(Role::Driver, " medic12 ", "pw").unwrap();
        assert_eq!(session.username, "medic12");
    }

    #[test]
    fn test_require_role() {
        let session = Session::login(Role::Driver, "medic12", "pw").unwrap();
        assert!(session.require_role(Role::Driver).is_ok());
        assert!(matches!(
            session.require_role(Role::Police),
            Err(Error::Forbidden(_))
        ));
    }

    #[test]
    fn test_no_session_is_not_logged_in() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(current(&storage(&dir)), Err(Error::NotLoggedIn)));
        assert!(logout(&storage(&dir)).unwrap().is_none());
    }

    #[test]
    fn test_save_and_end_keep_map_token() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        storage
            .write_state(&SirenState {
                map_token: Some("pk.keepme".to_string()),
                ..Default::default()
            })
            .unwrap();

        let session = Session::login(Role::Police, "dispatcher7", "pw").unwrap();
        save(&storage, &session).unwrap();
        let loaded = require(&storage, Role::Police).unwrap();
        assert_eq!(loaded.username, "dispatcher7");
        assert_eq!(loaded.role, Role::Police);

        let ended = logout(&storage).unwrap().unwrap();
        assert_eq!(ended.username, "dispatcher7");
        let state = storage.read_state().unwrap();
        assert!(state.role.is_none());
        assert_eq!(state.map_token.as_deref(), Some("pk.keepme"));
    }

    #[test]
    fn test_login_replaces_previous_session() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        save(&storage, &Session::login(Role::Police, "a", "pw").unwrap()).unwrap();
        save(&storage, &Session::login(Role::Driver, "b", "pw").unwrap()).unwrap();
        let session = current(&storage).unwrap();
        assert_eq!(session.role, Role::Driver);
        assert_eq!(session.username, "b");
    }
}
