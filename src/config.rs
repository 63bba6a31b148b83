//! Surface configuration persistence
//!
//! Stores user preferences in `~/.config/sigil/config.yaml`

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Attribute that keeps outside interactions from ending a signal session
pub const DEFAULT_IGNORE_ATTRIBUTE: &str = "data-signal-operator-ignore";

/// Configuration of one editable surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// HTML applied when the surface is mounted
    pub default_content: String,
    /// Focus the surface (caret at the end) when it is mounted
    pub auto_focus: bool,
    /// Elements carrying this attribute (or inside one) do not cancel the
    /// session when clicked
    pub ignore_attribute: String,
    /// Extra characters that break keyword input for operators using the
    /// default whitespace policy
    pub break_chars: Vec<char>,
    /// Reset an effectively empty surface to `""` when it loses focus
    pub clear_on_blur_when_empty: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            default_content: String::new(),
            auto_focus: false,
            ignore_attribute: DEFAULT_IGNORE_ATTRIBUTE.to_string(),
            break_chars: Vec::new(),
            clear_on_blur_when_empty: true,
        }
    }
}

impl SurfaceConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, or return defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
