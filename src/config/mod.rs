//! Configuration and state management for Siren.
//!
//! This module defines KDL schemas for two distinct files:
//!
//! ## config.kdl - Operator preferences and mobile shell settings
//!
//! Located at `$SN_CONFIG_DIR/config.kdl`, or `~/.config/siren/config.kdl`.
//!
//! Contains:
//! - `output-format` - "json" or "human"
//! - `app-id`, `app-name`, `content-url` - mobile host shell identity
//! - `splash { ... }` - splash-screen presentation
//!
//! ## state.kdl - Session flag and secrets (machine-specific)
//!
//! Located at `$SN_DATA_DIR/state.kdl`, or `~/.local/share/siren/state.kdl`.
//!
//! Contains:
//! - `role`, `username`, `logged-in-at` - the active session
//! - `map-token` - map provider token
//!
//! ## Security
//!
//! `state.kdl` is written with 0600 permissions because it holds the map token.
//!
//! ## Precedence
//!
//! For the map token: env var > state.kdl
//! For preferences: CLI flag > config.kdl > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, MAP_TOKEN_ENV, Resolved, ResolvedConfig, SplashSettings, ValueSource,
    resolve_config, resolve_map_token,
};
pub use schema::{
    CONFIG_FILE_MODE, CONFIG_KEYS, OutputFormat, STATE_FILE_MODE, ShellConfig, SirenState,
    SplashConfig, mask_token,
};
