//! Configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Harmonization parameters used when the command line leaves them out.
///
/// Anything unset here is asked for interactively. Scale and blue-note mode
/// stay as text; the CLI interprets them leniently so a typo falls back to
/// the default instead of failing the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// major or minor
    #[serde(default)]
    pub scale: Option<String>,

    /// snap or move
    #[serde(default)]
    pub blue_note_mode: Option<String>,

    /// Scale root as a MIDI note number.
    #[serde(default)]
    pub root: Option<u8>,
}

/// Where the melody is read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Track holding the melody. Default: 0
    #[serde(default)]
    pub track: usize,
}

/// Where the harmonies go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default: upper_harmony_output.mid
    #[serde(default = "OutputConfig::default_upper")]
    pub upper: PathBuf,

    /// Default: lower_harmony_output.mid
    #[serde(default = "OutputConfig::default_lower")]
    pub lower: PathBuf,

    /// Clamp pitches into 0..=127 before writing. Default: false
    #[serde(default)]
    pub clamp: bool,
}

impl OutputConfig {
    fn default_upper() -> PathBuf {
        PathBuf::from("upper_harmony_output.mid")
    }

    fn default_lower() -> PathBuf {
        PathBuf::from("lower_harmony_output.mid")
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            upper: Self::default_upper(),
            lower: Self::default_lower(),
            clamp: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}
