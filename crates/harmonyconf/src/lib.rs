//! Configuration loading for the harmonize CLI.
//!
//! Settings here sit between the command line and the interactive prompt:
//! flags win over them, and anything left unset is asked for.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/harmonize/config.toml` (system)
//! 2. `~/.config/harmonize/config.toml` (user)
//! 3. `./harmonize.toml` (local override, replaced by `--config <path>`)
//! 4. Environment variables (`HARMONIZE_*`)
//!
//! # Example Config
//!
//! ```toml
//! [defaults]
//! scale = "minor"
//! blue_note_mode = "move"
//! root = 57
//!
//! [input]
//! track = 0
//!
//! [output]
//! upper = "~/harmonies/upper.mid"
//! lower = "~/harmonies/lower.mid"
//! clamp = false
//!
//! [telemetry]
//! log_level = "info"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use sections::{DefaultsConfig, InputConfig, OutputConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete harmonize configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HarmonyConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl HarmonyConfig {
    /// Load configuration from all sources, with `config_path` replacing
    /// `./harmonize.toml`, and report where the values came from.
    pub fn load_with_sources_from(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut config = HarmonyConfig::default();

        for path in loader::discover_config_files_with_override(config_path) {
            config = loader::overlay_file(config, &path)?;
            sources.files.push(path);
        }

        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Serialize config to TOML string.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();

        output.push_str("# harmonize configuration\n\n");

        output.push_str("[defaults]\n");
        match &self.defaults.scale {
            Some(scale) => output.push_str(&format!("scale = {}\n", quoted(scale))),
            None => output.push_str("# scale = \"major\"\n"),
        }
        match &self.defaults.blue_note_mode {
            Some(mode) => output.push_str(&format!("blue_note_mode = {}\n", quoted(mode))),
            None => output.push_str("# blue_note_mode = \"snap\"\n"),
        }
        match self.defaults.root {
            Some(root) => output.push_str(&format!("root = {}\n", root)),
            None => output.push_str("# root = 60\n"),
        }

        output.push_str("\n[input]\n");
        output.push_str(&format!("track = {}\n", self.input.track));

        output.push_str("\n[output]\n");
        output.push_str(&format!(
            "upper = {}\n",
            quoted(&self.output.upper.display().to_string())
        ));
        output.push_str(&format!(
            "lower = {}\n",
            quoted(&self.output.lower.display().to_string())
        ));
        output.push_str(&format!("clamp = {}\n", self.output.clamp));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!(
            "log_level = {}\n",
            quoted(&self.telemetry.log_level)
        ));

        output
    }
}

/// A TOML string literal for `value`, escaped as needed.
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
