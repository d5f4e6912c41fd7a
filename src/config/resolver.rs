//! Unified precedence resolution for configuration and state.
//!
//! ## Map Token Precedence (highest to lowest)
//!
//! 1. `SN_MAP_TOKEN` environment variable (ignored when blank)
//! 2. state.kdl
//!
//! ## Config Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. config.kdl
//! 3. Built-in defaults

use crate::Result;
use crate::config::{OutputFormat, ShellConfig, SplashConfig};
use crate::storage::Storage;
use serde::Serialize;

/// Environment variable name for the map token override.
pub const MAP_TOKEN_ENV: &str = "SN_MAP_TOKEN";

pub const DEFAULT_APP_ID: &str = "app.siren.dispatch";
pub const DEFAULT_APP_NAME: &str = "Siren";
pub const DEFAULT_CONTENT_URL: &str = "http://localhost:8080";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from config.kdl or state.kdl
    File,
    /// Value from CLI flag
    CliFlag,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::File => write!(f, "file"),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully populated splash settings handed to the mobile host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplashSettings {
    pub show_duration_ms: u64,
    pub auto_hide: bool,
    pub background_color: String,
    pub show_spinner: bool,
    pub android_spinner_style: String,
    pub ios_spinner_style: String,
    pub spinner_color: String,
}

impl Default for SplashSettings {
    fn default() -> Self {
        Self {
            show_duration_ms: 3000,
            auto_hide: true,
            background_color: "#ffffffff".to_string(),
            show_spinner: true,
            android_spinner_style: "large".to_string(),
            ios_spinner_style: "small".to_string(),
            spinner_color: "#999999".to_string(),
        }
    }
}

impl SplashSettings {
    /// Fill unset file values from the defaults.
    fn from_config(config: &SplashConfig) -> Self {
        let defaults = Self::default();
        Self {
            show_duration_ms: config.show_duration_ms.unwrap_or(defaults.show_duration_ms),
            auto_hide: config.auto_hide.unwrap_or(defaults.auto_hide),
            background_color: config
                .background_color
                .clone()
                .unwrap_or(defaults.background_color),
            show_spinner: config.show_spinner.unwrap_or(defaults.show_spinner),
            android_spinner_style: config
                .android_spinner_style
                .clone()
                .unwrap_or(defaults.android_spinner_style),
            ios_spinner_style: config
                .ios_spinner_style
                .clone()
                .unwrap_or(defaults.ios_spinner_style),
            spinner_color: config.spinner_color.clone().unwrap_or(defaults.spinner_color),
        }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub output_format: Resolved<OutputFormat>,
    pub app_id: Resolved<String>,
    pub app_name: Resolved<String>,
    pub content_url: Resolved<String>,
    /// Source is `file` if any splash value came from config.kdl.
    pub splash: Resolved<SplashSettings>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            app_id: Resolved::new(DEFAULT_APP_ID.to_string(), ValueSource::Default),
            app_name: Resolved::new(DEFAULT_APP_NAME.to_string(), ValueSource::Default),
            content_url: Resolved::new(DEFAULT_CONTENT_URL.to_string(), ValueSource::Default),
            splash: Resolved::new(SplashSettings::default(), ValueSource::Default),
        }
    }
}

impl ResolvedConfig {
    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format.value
    }

    /// Flatten into `(key, value, source)` rows for display.
    pub fn entries(&self) -> Vec<(String, String, String)> {
        let splash = &self.splash.value;
        let splash_source = self.splash.source.to_string();
        let mut rows = vec![
            row("output-format", self.output_format.value.as_str(), &self.output_format.source),
            row("app-id", &self.app_id.value, &self.app_id.source),
            row("app-name", &self.app_name.value, &self.app_name.source),
            row("content-url", &self.content_url.value, &self.content_url.source),
        ];
        for (key, value) in [
            ("splash.show-duration", splash.show_duration_ms.to_string()),
            ("splash.auto-hide", splash.auto_hide.to_string()),
            ("splash.background-color", splash.background_color.clone()),
            ("splash.show-spinner", splash.show_spinner.to_string()),
            ("splash.android-spinner-style", splash.android_spinner_style.clone()),
            ("splash.ios-spinner-style", splash.ios_spinner_style.clone()),
            ("splash.spinner-color", splash.spinner_color.clone()),
        ] {
            rows.push((key.to_string(), value, splash_source.clone()));
        }
        rows
    }
}

fn row(key: &str, value: &str, source: &ValueSource) -> (String, String, String) {
    (key.to_string(), value.to_string(), source.to_string())
}

/// CLI overrides for configuration resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Resolve a config file plus overrides, without touching the filesystem.
pub fn resolve_from(config: &ShellConfig, overrides: &ConfigOverrides) -> ResolvedConfig {
    let mut result = ResolvedConfig::default();

    if let Some(ref format) = overrides.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::CliFlag);
    } else if let Some(ref format) = config.output_format {
        result.output_format = Resolved::new(format.clone(), ValueSource::File);
    }

    if let Some(ref id) = config.app_id {
        result.app_id = Resolved::new(id.clone(), ValueSource::File);
    }
    if let Some(ref name) = config.app_name {
        result.app_name = Resolved::new(name.clone(), ValueSource::File);
    }
    if let Some(ref url) = config.content_url {
        result.content_url = Resolved::new(url.clone(), ValueSource::File);
    }

    if !config.splash.is_empty() {
        result.splash = Resolved::new(SplashSettings::from_config(&config.splash), ValueSource::File);
    }

    result
}

/// Resolve configuration with full precedence chain.
///
/// Precedence (highest to lowest):
/// 1. CLI flags (from `overrides`)
/// 2. config.kdl
/// 3. Built-in defaults
pub fn resolve_config(storage: &Storage, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let config = storage.read_config()?;
    Ok(resolve_from(&config, overrides))
}

/// Resolve the map token: `SN_MAP_TOKEN` first, then state.kdl.
pub fn resolve_map_token(storage: &Storage) -> Result<Option<Resolved<String>>> {
    if let Ok(token) = std::env::var(MAP_TOKEN_ENV) {
        let token = token.trim();
        if !token.is_empty() {
            return Ok(Some(Resolved::new(
                token.to_string(),
                ValueSource::EnvVar(MAP_TOKEN_ENV.to_string()),
            )));
        }
    }

    let state = storage.read_state()?;
    Ok(state
        .map_token
        .map(|token| Resolved::new(token, ValueSource::File)))
}
