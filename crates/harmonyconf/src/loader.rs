//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, HarmonyConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/harmonize/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("harmonize/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("harmonize.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a TOML file and apply whatever it sets on top of `base`.
pub fn overlay_file(base: HarmonyConfig, path: &Path) -> Result<HarmonyConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    overlay_toml(base, &contents, path)
}

/// Parse a complete config from a TOML string, defaults filling the gaps.
pub fn parse_toml(contents: &str, path: &Path) -> Result<HarmonyConfig, ConfigError> {
    overlay_toml(HarmonyConfig::default(), contents, path)
}

/// Apply only the keys present in `contents` on top of `base`.
pub fn overlay_toml(
    mut config: HarmonyConfig,
    contents: &str,
    path: &Path,
) -> Result<HarmonyConfig, ConfigError> {
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let table: toml::Table = contents
        .parse()
        .map_err(|e: toml::de::Error| parse_err(e.to_string()))?;

    if let Some(defaults) = table.get("defaults").and_then(|v| v.as_table()) {
        if let Some(v) = defaults.get("scale").and_then(|v| v.as_str()) {
            config.defaults.scale = Some(v.to_string());
        }
        if let Some(v) = defaults.get("blue_note_mode").and_then(|v| v.as_str()) {
            config.defaults.blue_note_mode = Some(v.to_string());
        }
        if let Some(v) = defaults.get("root").and_then(|v| v.as_integer()) {
            let root = u8::try_from(v)
                .ok()
                .filter(|r| *r <= 127)
                .ok_or_else(|| parse_err(format!("root {} is outside 0..=127", v)))?;
            config.defaults.root = Some(root);
        }
    }

    if let Some(input) = table.get("input").and_then(|v| v.as_table()) {
        if let Some(v) = input.get("track").and_then(|v| v.as_integer()) {
            config.input.track = usize::try_from(v)
                .map_err(|_| parse_err(format!("track {} must not be negative", v)))?;
        }
    }

    if let Some(output) = table.get("output").and_then(|v| v.as_table()) {
        if let Some(v) = output.get("upper").and_then(|v| v.as_str()) {
            config.output.upper = expand_path(v);
        }
        if let Some(v) = output.get("lower").and_then(|v| v.as_str()) {
            config.output.lower = expand_path(v);
        }
        if let Some(v) = output.get("clamp").and_then(|v| v.as_bool()) {
            config.output.clamp = v;
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
    }

    Ok(config)
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut HarmonyConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |key| env::var(key).ok());
}

/// Apply overrides read through `lookup`. Unparseable values are skipped.
pub fn apply_overrides_from(
    config: &mut HarmonyConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let mut applied = |key: &str| sources.env_overrides.push(key.to_string());

    if let Some(v) = lookup("HARMONIZE_SCALE") {
        config.defaults.scale = Some(v);
        applied("HARMONIZE_SCALE");
    }
    if let Some(v) = lookup("HARMONIZE_BLUE_NOTE_MODE") {
        config.defaults.blue_note_mode = Some(v);
        applied("HARMONIZE_BLUE_NOTE_MODE");
    }
    if let Some(v) = lookup("HARMONIZE_ROOT") {
        if let Some(root) = v.trim().parse::<u8>().ok().filter(|r| *r <= 127) {
            config.defaults.root = Some(root);
            applied("HARMONIZE_ROOT");
        }
    }

    if let Some(v) = lookup("HARMONIZE_TRACK") {
        if let Ok(track) = v.trim().parse() {
            config.input.track = track;
            applied("HARMONIZE_TRACK");
        }
    }

    if let Some(v) = lookup("HARMONIZE_UPPER") {
        config.output.upper = expand_path(&v);
        applied("HARMONIZE_UPPER");
    }
    if let Some(v) = lookup("HARMONIZE_LOWER") {
        config.output.lower = expand_path(&v);
        applied("HARMONIZE_LOWER");
    }
    if let Some(v) = lookup("HARMONIZE_CLAMP") {
        if let Some(clamp) = parse_bool(&v) {
            config.output.clamp = clamp;
            applied("HARMONIZE_CLAMP");
        }
    }

    if let Some(v) = lookup("HARMONIZE_LOG_LEVEL") {
        config.telemetry.log_level = v;
        applied("HARMONIZE_LOG_LEVEL");
    }
    // RUST_LOG wins over everything
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        applied("RUST_LOG");
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // Handle $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/harmonies/upper.mid");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("harmonies/upper.mid"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let expanded = expand_path("/absolute/path.mid");
        assert_eq!(expanded, PathBuf::from("/absolute/path.mid"));
    }

    #[test]
    fn test_discover_uses_existing_override() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let files = discover_config_files_with_override(Some(file.path()));
        assert_eq!(files.last(), Some(&file.path().to_path_buf()));

        let missing = Path::new("/nonexistent/harmonize-test.toml");
        let files = discover_config_files_with_override(Some(missing));
        assert!(!files.iter().any(|f| f == missing));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[defaults]
root = 57
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();
        assert_eq!(config.defaults.root, Some(57));
        // Other values should be defaults
        assert_eq!(config.defaults.scale, None);
        assert_eq!(config.input.track, 0);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[defaults]
scale = "Minor"
blue_note_mode = "move"
root = 69

[input]
track = 2

[output]
upper = "/tmp/up.mid"
lower = "/tmp/down.mid"
clamp = true

[telemetry]
log_level = "debug"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();

        assert_eq!(config.defaults.scale.as_deref(), Some("Minor"));
        assert_eq!(config.defaults.blue_note_mode.as_deref(), Some("move"));
        assert_eq!(config.defaults.root, Some(69));
        assert_eq!(config.input.track, 2);
        assert_eq!(config.output.upper, PathBuf::from("/tmp/up.mid"));
        assert_eq!(config.output.lower, PathBuf::from("/tmp/down.mid"));
        assert!(config.output.clamp);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_later_files_only_override_what_they_set() {
        let base = parse_toml("[defaults]\nroot = 62\nscale = \"minor\"", Path::new("a.toml")).unwrap();
        let merged = overlay_toml(base, "[defaults]\nscale = \"major\"", Path::new("b.toml")).unwrap();

        assert_eq!(merged.defaults.root, Some(62));
        assert_eq!(merged.defaults.scale.as_deref(), Some("major"));
    }

    #[test]
    fn test_root_out_of_range_is_a_parse_error() {
        let err = parse_toml("[defaults]\nroot = 128", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.toml"));

        assert!(parse_toml("[input]\ntrack = -1", Path::new("bad.toml")).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HARMONIZE_SCALE", "minor"),
            ("HARMONIZE_ROOT", "64"),
            ("HARMONIZE_TRACK", "not-a-number"),
            ("HARMONIZE_CLAMP", "yes"),
            ("HARMONIZE_UPPER", "/out/hi.mid"),
            ("RUST_LOG", "harmony=trace"),
        ]
        .into_iter()
        .collect();

        let mut config = HarmonyConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides_from(&mut config, &mut sources, |k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.defaults.scale.as_deref(), Some("minor"));
        assert_eq!(config.defaults.root, Some(64));
        assert_eq!(config.input.track, 0);
        assert!(config.output.clamp);
        assert_eq!(config.output.upper, PathBuf::from("/out/hi.mid"));
        assert_eq!(config.telemetry.log_level, "harmony=trace");
        assert!(!sources.env_overrides.contains(&"HARMONIZE_TRACK".to_string()));
        assert_eq!(sources.env_overrides.len(), 5);
    }

    #[test]
    fn test_env_root_out_of_range_is_ignored() {
        let mut config = HarmonyConfig::default();
        let mut sources = ConfigSources::default();
        apply_overrides_from(&mut config, &mut sources, |k| {
            (k == "HARMONIZE_ROOT").then(|| "200".to_string())
        });
        assert_eq!(config.defaults.root, None);
        assert!(sources.env_overrides.is_empty());
    }
}
