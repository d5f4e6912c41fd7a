//! Siren - A unit and incident dispatch model for emergency response.
//!
//! This library provides the core functionality for the `sn` CLI tool,
//! including the entity store, the assignment rule, the status policy used by
//! the dashboards, and the operator session.

pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod models;
pub mod policy;
pub mod session;
pub mod storage;
pub mod store;

/// Library-level error type for Siren operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("KDL error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not logged in: run `sn login <driver|police>` first")]
    NotLoggedIn,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Siren operations.
pub type Result<T> = std::result::Result<T, Error>;
