use super::{Output, json};
use crate::Result;
use crate::models::Role;
use crate::session::{self, Session};
use crate::storage::Storage;
use serde::Serialize;

#[derive(Serialize)]
pub struct LoginResult {
    #[serde(flatten)]
    pub session: Session,
}

impl Output for LoginResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!(
            "Logged in as {} ({})",
            self.session.username, self.session.role
        )
    }
}

/// Log in and persist the session, replacing any previous one.
pub fn login(storage: &Storage, role: Role, username: &str, password: &str) -> Result<LoginResult> {
    let session = Session::login(role, username, password)?;
    session::save(storage, &session)?;
    Ok(LoginResult { session })
}

#[derive(Serialize)]
pub struct LogoutResult {
    pub logged_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Output for LogoutResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.username {
            Some(name) => format!("Logged out {}", name),
            None => "Not logged in".to_string(),
        }
    }
}

/// Clear the session. Logging out twice is not an error.
pub fn logout(storage: &Storage) -> Result<LogoutResult> {
    let previous = session::logout(storage)?;
    Ok(LogoutResult {
        logged_out: previous.is_some(),
        username: previous.map(|s| s.username),
    })
}

#[derive(Serialize)]
pub struct WhoamiResult {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

impl Output for WhoamiResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.session {
            Some(s) => format!(
                "{} ({}) since {}",
                s.username,
                s.role,
                s.logged_in_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => "Not logged in".to_string(),
        }
    }
}

pub fn whoami(storage: &Storage) -> Result<WhoamiResult> {
    let session = Session::from_state(&storage.read_state()?);
    Ok(WhoamiResult {
        logged_in: session.is_some(),
        session,
    })
}
