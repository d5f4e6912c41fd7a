use super::{Output, json};
use crate::config::{ConfigOverrides, mask_token, resolve_config, resolve_map_token};
use crate::storage::Storage;
use crate::{Error, Result};
use serde::Serialize;
use tracing::info;

// === Config ===

#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

#[derive(Serialize)]
pub struct ConfigShow {
    pub path: String,
    pub entries: Vec<ConfigEntry>,
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let width = self.entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
        let mut lines = vec![format!("# {}", self.path)];
        for entry in &self.entries {
            lines.push(format!(
                "{:<width$}  {}  ({})",
                entry.key,
                entry.value,
                entry.source,
                width = width
            ));
        }
        lines.join("\n")
    }
}

/// Every effective setting with the layer it came from.
pub fn config_show(storage: &Storage, overrides: &ConfigOverrides) -> Result<ConfigShow> {
    let resolved = resolve_config(storage, overrides)?;
    Ok(ConfigShow {
        path: storage.config_path().display().to_string(),
        entries: resolved
            .entries()
            .into_iter()
            .map(|(key, value, source)| ConfigEntry { key, value, source })
            .collect(),
    })
}

#[derive(Serialize)]
pub struct ConfigSetResult {
    pub key: String,
    pub value: String,
}

impl Output for ConfigSetResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("Set {} = {}", self.key, self.value)
    }
}

/// Validate and persist one config.kdl value.
pub fn config_set(storage: &Storage, key: &str, value: &str) -> Result<ConfigSetResult> {
    let mut config = storage.read_config()?;
    config.set(key, value).map_err(Error::InvalidInput)?;
    storage.write_config(&config)?;
    info!(key, value = value.trim(), "config updated");
    Ok(ConfigSetResult {
        key: key.to_string(),
        value: value.trim().to_string(),
    })
}

// === Map token ===

#[derive(Serialize)]
pub struct MapTokenResult {
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Output for MapTokenResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match (self.action, &self.token) {
            ("set", Some(token)) => format!("Map token set ({})", token),
            ("cleared", _) => "Map token cleared".to_string(),
            _ => "No map token stored".to_string(),
        }
    }
}

/// Store a map token in state.kdl.
pub fn map_token_set(storage: &Storage, token: &str) -> Result<MapTokenResult> {
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::InvalidInput("map token cannot be empty".to_string()));
    }
    let mut state = storage.read_state()?;
    state.map_token = Some(token.to_string());
    storage.write_state(&state)?;
    info!(token = %mask_token(token), "map token stored");
    Ok(MapTokenResult {
        action: "set",
        token: Some(mask_token(token)),
    })
}

/// Remove the stored map token. Clearing an absent token is not an error.
pub fn map_token_clear(storage: &Storage) -> Result<MapTokenResult> {
    let mut state = storage.read_state()?;
    let had_token = state.map_token.take().is_some();
    if had_token {
        storage.write_state(&state)?;
        info!("map token cleared");
    }
    Ok(MapTokenResult {
        action: if had_token { "cleared" } else { "none" },
        token: None,
    })
}

#[derive(Serialize)]
pub struct MapTokenShow {
    pub configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Output for MapTokenShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match (&self.token, &self.source) {
            (Some(token), Some(source)) => format!("{} (from {})", token, source),
            _ => "No map token configured".to_string(),
        }
    }
}

/// The effective map token, masked, and where it came from.
pub fn map_token_show(storage: &Storage) -> Result<MapTokenShow> {
    let resolved = resolve_map_token(storage)?;
    Ok(match resolved {
        Some(r) => MapTokenShow {
            configured: true,
            token: Some(mask_token(&r.value)),
            source: Some(r.source.to_string()),
        },
        None => MapTokenShow {
            configured: false,
            token: None,
            source: None,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAP_TOKEN_ENV, OutputFormat};
    use serial_test::serial;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> Storage {
        Storage::with_dirs(dir.path().join("c"), dir.path().join("d"))
    }

    #[test]
    fn test_config_set_then_show() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        config_set(&storage, "app-name", " Metro EMS ").unwrap();

        let show = config_show(&storage, &ConfigOverrides::new()).unwrap();
        let entry = show.entries.iter().find(|e| e.key == "app-name").unwrap();
        assert_eq!(entry.value, "Metro EMS");
        assert_eq!(entry.source, "file");

        let show = config_show(
            &storage,
            &ConfigOverrides::new().with_output_format(OutputFormat::Human),
        )
        .unwrap();
        let entry = show.entries.iter().find(|e| e.key == "output-format").unwrap();
        assert_eq!(entry.source, "cli");
    }

    #[test]
    fn test_config_set_invalid_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        assert!(matches!(
            config_set(&storage, "splash.spinner-color", "grey"),
            Err(Error::InvalidInput(_))
        ));
        assert!(!storage.config_path().exists());
    }

    #[test]
    #[serial]
    fn test_map_token_lifecycle() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        // SAFETY: serialized with other env-mutating tests.
        unsafe { std::env::remove_var(MAP_TOKEN_ENV) };

        assert!(!map_token_show(&storage).unwrap().configured);
        assert!(matches!(
            map_token_set(&storage, "  "),
            Err(Error::InvalidInput(_))
        ));

        let set = map_token_set(&storage, "pk.abcdefghijklmnop").unwrap();
        assert_eq!(set.token.as_deref(), Some("pk.a...mnop"));

        let show = map_token_show(&storage).unwrap();
        assert_eq!(show.source.as_deref(), Some("file"));
        assert!(!show.to_json().contains("abcdefghijkl"));

        assert_eq!(map_token_clear(&storage).unwrap().action, "cleared");
        assert_eq!(map_token_clear(&storage).unwrap().action, "none");
        assert!(!map_token_show(&storage).unwrap().configured);
    }
}
