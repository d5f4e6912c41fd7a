//! KDL schema definitions for config.kdl and state.kdl.
//!
//! This module provides:
//! - Rust structs representing the KDL schema
//! - Serialization/deserialization to/from KDL format
//! - Validation functions
//! - Key-based updates used by `sn config set`

use crate::models::Role;
use chrono::{DateTime, Utc};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted by [`ShellConfig::set`].
pub const CONFIG_KEYS: &[&str] = &[
    "output-format",
    "app-id",
    "app-name",
    "content-url",
    "splash.show-duration",
    "splash.auto-hide",
    "splash.background-color",
    "splash.show-spinner",
    "splash.android-spinner-style",
    "splash.ios-spinner-style",
    "splash.spinner-color",
];

/// Splash-screen presentation consumed by the mobile host shell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplashConfig {
    /// How long the splash stays up, in milliseconds
    pub show_duration_ms: Option<u64>,
    /// Hide automatically after `show_duration_ms`
    pub auto_hide: Option<bool>,
    /// `#RRGGBB` or `#RRGGBBAA`
    pub background_color: Option<String>,
    pub show_spinner: Option<bool>,
    pub android_spinner_style: Option<String>,
    pub ios_spinner_style: Option<String>,
    /// `#RRGGBB` or `#RRGGBBAA`
    pub spinner_color: Option<String>,
}

impl SplashConfig {
    pub fn is_empty(&self) -> bool {
        self == &SplashConfig::default()
    }

    fn from_kdl(doc: &KdlDocument) -> Self {
        SplashConfig {
            show_duration_ms: get_integer(doc, "show-duration")
                .and_then(|i| u64::try_from(i).ok()),
            auto_hide: get_bool(doc, "auto-hide"),
            background_color: get_string(doc, "background-color"),
            show_spinner: get_bool(doc, "show-spinner"),
            android_spinner_style: get_string(doc, "android-spinner-style"),
            ios_spinner_style: get_string(doc, "ios-spinner-style"),
            spinner_color: get_string(doc, "spinner-color"),
        }
    }

    fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();
        if let Some(ms) = self.show_duration_ms {
            push_node(&mut doc, "show-duration", KdlValue::Integer(ms as i128));
        }
        if let Some(auto_hide) = self.auto_hide {
            push_node(&mut doc, "auto-hide", KdlValue::Bool(auto_hide));
        }
        if let Some(ref color) = self.background_color {
            push_node(&mut doc, "background-color", KdlValue::String(color.clone()));
        }
        if let Some(show) = self.show_spinner {
            push_node(&mut doc, "show-spinner", KdlValue::Bool(show));
        }
        if let Some(ref style) = self.android_spinner_style {
            push_node(&mut doc, "android-spinner-style", KdlValue::String(style.clone()));
        }
        if let Some(ref style) = self.ios_spinner_style {
            push_node(&mut doc, "ios-spinner-style", KdlValue::String(style.clone()));
        }
        if let Some(ref color) = self.spinner_color {
            push_node(&mut doc, "spinner-color", KdlValue::String(color.clone()));
        }
        doc
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(ref color) = self.background_color {
            validate_color("splash.background-color", color)?;
        }
        if let Some(ref color) = self.spinner_color {
            validate_color("splash.spinner-color", color)?;
        }
        for (key, style) in [
            ("splash.android-spinner-style", &self.android_spinner_style),
            ("splash.ios-spinner-style", &self.ios_spinner_style),
        ] {
            if let Some(style) = style {
                if style.trim().is_empty() {
                    return Err(format!("{} cannot be empty", key));
                }
            }
        }
        Ok(())
    }
}

/// Operator preferences and mobile shell settings stored in config.kdl.
///
/// File permissions: 0644 (rw-r--r--)
///
/// # KDL Schema
///
/// ```kdl
/// output-format "human"
/// app-id "app.siren.dispatch"
/// app-name "Siren"
/// content-url "https://dispatch.example.org"
/// splash {
///     show-duration 3000
///     auto-hide #true
///     background-color "#ffffffff"
///     show-spinner #true
///     android-spinner-style "large"
///     ios-spinner-style "small"
///     spinner-color "#999999"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Application identifier for the mobile host
    pub app_id: Option<String>,

    /// Display name shown by the mobile host
    pub app_name: Option<String>,

    /// Remote content URL loaded by the webview
    pub content_url: Option<String>,

    pub splash: SplashConfig,
}

impl ShellConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref id) = self.app_id {
            if id.trim().is_empty() || id.contains(char::is_whitespace) {
                return Err(format!("app-id must be a non-empty identifier, got {:?}", id));
            }
        }
        if let Some(ref name) = self.app_name {
            if name.trim().is_empty() {
                return Err("app-name cannot be empty".to_string());
            }
        }
        if let Some(ref url) = self.content_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!(
                    "content-url must start with http:// or https://, got {}",
                    url
                ));
            }
        }
        self.splash.validate()
    }

    /// Set a single value by its config key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        match key {
            "output-format" => {
                self.output_format = Some(
                    OutputFormat::parse(value)
                        .ok_or_else(|| format!("output-format must be json or human, got {}", value))?,
                );
            }
            "app-id" => self.app_id = Some(value.to_string()),
            "app-name" => self.app_name = Some(value.to_string()),
            "content-url" => self.content_url = Some(value.to_string()),
            "splash.show-duration" => {
                let ms = value
                    .parse::<u64>()
                    .map_err(|_| format!("splash.show-duration must be milliseconds, got {}", value))?;
                self.splash.show_duration_ms = Some(ms);
            }
            "splash.auto-hide" => self.splash.auto_hide = Some(parse_bool(key, value)?),
            "splash.background-color" => self.splash.background_color = Some(value.to_string()),
            "splash.show-spinner" => self.splash.show_spinner = Some(parse_bool(key, value)?),
            "splash.android-spinner-style" => {
                self.splash.android_spinner_style = Some(value.to_string())
            }
            "splash.ios-spinner-style" => self.splash.ios_spinner_style = Some(value.to_string()),
            "splash.spinner-color" => self.splash.spinner_color = Some(value.to_string()),
            _ => {
                return Err(format!(
                    "Unknown config key: {} (valid keys: {})",
                    key,
                    CONFIG_KEYS.join(", ")
                ));
            }
        }
        self.validate()
    }

    /// Parse config from a KDL document.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let splash = doc
            .get("splash")
            .and_then(|node| node.children())
            .map(SplashConfig::from_kdl)
            .unwrap_or_default();

        ShellConfig {
            output_format: get_string(doc, "output-format").and_then(|s| OutputFormat::parse(&s)),
            app_id: get_string(doc, "app-id"),
            app_name: get_string(doc, "app-name"),
            content_url: get_string(doc, "content-url"),
            splash,
        }
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(ref format) = self.output_format {
            push_node(&mut doc, "output-format", KdlValue::String(format.as_str().to_string()));
        }
        if let Some(ref id) = self.app_id {
            push_node(&mut doc, "app-id", KdlValue::String(id.clone()));
        }
        if let Some(ref name) = self.app_name {
            push_node(&mut doc, "app-name", KdlValue::String(name.clone()));
        }
        if let Some(ref url) = self.content_url {
            push_node(&mut doc, "content-url", KdlValue::String(url.clone()));
        }
        if !self.splash.is_empty() {
            let mut node = KdlNode::new("splash");
            node.set_children(self.splash.to_kdl());
            doc.nodes_mut().push(node);
        }

        doc
    }
}

/// Runtime state stored in state.kdl.
///
/// Holds the session flag and the map token.
/// **MUST be created with 0600 permissions (owner read/write only)**.
///
/// # KDL Schema
///
/// ```kdl
/// role "police"
/// username "dispatcher7"
/// logged-in-at "2026-01-31T09:00:00Z"
/// map-token "pk.xxxxxxxxxxxxxxxx"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SirenState {
    /// Active role, set at login and cleared at logout
    pub role: Option<Role>,

    pub username: Option<String>,

    pub logged_in_at: Option<DateTime<Utc>>,

    /// Map provider token (sensitive!)
    pub map_token: Option<String>,
}

impl SirenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask the map token for display purposes.
    pub fn masked_token(&self) -> Option<String> {
        self.map_token.as_deref().map(mask_token)
    }

    /// Parse state from a KDL document.
    ///
    /// An unrecognized role is dropped rather than failing the whole file.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        SirenState {
            role: get_string(doc, "role").and_then(|s| s.parse().ok()),
            username: get_string(doc, "username"),
            logged_in_at: get_string(doc, "logged-in-at")
                .and_then(|s| s.parse::<DateTime<Utc>>().ok()),
            map_token: get_string(doc, "map-token"),
        }
    }

    /// Convert state to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(role) = self.role {
            push_node(&mut doc, "role", KdlValue::String(role.as_str().to_string()));
        }
        if let Some(ref username) = self.username {
            push_node(&mut doc, "username", KdlValue::String(username.clone()));
        }
        if let Some(ref at) = self.logged_in_at {
            push_node(&mut doc, "logged-in-at", KdlValue::String(at.to_rfc3339()));
        }
        if let Some(ref token) = self.map_token {
            push_node(&mut doc, "map-token", KdlValue::String(token.clone()));
        }

        doc
    }
}

/// Required permissions for state.kdl (Unix: 0600, owner read/write only).
/// Ignored on other platforms.
pub const STATE_FILE_MODE: u32 = 0o600;

/// Required permissions for config.kdl (Unix: 0644, readable by all).
pub const CONFIG_FILE_MODE: u32 = 0o644;

/// Show the first and last 4 characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        let head: String = chars.iter().take(4).collect();
        format!("{}...", head)
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

fn push_node(doc: &mut KdlDocument, name: &str, value: KdlValue) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(value));
    doc.nodes_mut().push(node);
}

fn first_value<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a KdlValue> {
    doc.get(name)
        .and_then(|node| node.entries().first())
        .map(|entry| entry.value())
}

fn get_string(doc: &KdlDocument, name: &str) -> Option<String> {
    first_value(doc, name)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

fn get_bool(doc: &KdlDocument, name: &str) -> Option<bool> {
    first_value(doc, name).and_then(|v| v.as_bool())
}

fn get_integer(doc: &KdlDocument, name: &str) -> Option<i128> {
    first_value(doc, name).and_then(|v| v.as_integer())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(format!("{} must be true or false, got {}", key, value)),
    }
}

fn validate_color(key: &str, color: &str) -> Result<(), String> {
    let hex = color.strip_prefix('#').unwrap_or("");
    let ok = matches!(hex.len(), 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    if ok {
        Ok(())
    } else {
        Err(format!("{} must be #RRGGBB or #RRGGBBAA, got {}", key, color))
    }
}
