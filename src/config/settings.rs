//! TOML-based configuration for Gantry.
//!
//! Supports a config file (gantry.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [engine]
//! path = "${HOME}/bin/gantry-engine"
//! timeout_secs = 60
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Engine sidecar configuration.
    pub engine: EngineSettings,
}

/// Engine sidecar configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Path to the engine sidecar binary.
    pub path: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `GANTRY_CONFIG`
    /// 2. `./gantry.toml`
    /// 3. `~/.config/gantry/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var("GANTRY_CONFIG") {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("gantry.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("gantry").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    /// Resolve the engine sidecar binary path.
    ///
    /// Returns the configured path (with env vars expanded) or searches
    /// common locations.
    pub fn engine_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.engine.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        // Search common locations
        let candidates = ["gantry-engine", "./gantry-engine"];

        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        // Try PATH
        if let Ok(output) = std::process::Command::new("which")
            .arg("gantry-engine")
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' {
            if chars.peek() == Some(&'{') {
                chars.next(); // consume '{'
                let mut var_name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }
                let value = env::var(&var_name)
                    .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                result.push_str(&value);
            } else {
                // $VAR (ends at non-alphanumeric/underscore)
                let mut var_name = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        var_name.push(chars.next().unwrap());
                    } else {
                        break;
                    }
                }
                if var_name.is_empty() {
                    // Just a lone $, keep it
                    result.push('$');
                } else {
                    let value = env::var(&var_name)
                        .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                    result.push_str(&value);
                }
            }
        } else {
            result.push(c);
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_braces() {
        env::set_var("GANTRY_TEST_VAR", "hello");
        assert_eq!(expand_env_vars("${GANTRY_TEST_VAR}").unwrap(), "hello");
        assert_eq!(
            expand_env_vars("pre_${GANTRY_TEST_VAR}_post").unwrap(),
            "pre_hello_post"
        );
        env::remove_var("GANTRY_TEST_VAR");
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        env::set_var("GANTRY_TEST_VAR2", "world");
        assert_eq!(expand_env_vars("$GANTRY_TEST_VAR2").unwrap(), "world");
        assert_eq!(expand_env_vars("$GANTRY_TEST_VAR2!").unwrap(), "world!");
        env::remove_var("GANTRY_TEST_VAR2");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("${GANTRY_NONEXISTENT_VAR_12345}");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[engine]
path = "/opt/gantry/engine"
timeout_secs = 60
"#;

        let settings: Settings = toml::from_str(toml).unwrap();

        assert_eq!(settings.engine.path.as_deref(), Some("/opt/gantry/engine"));
        assert_eq!(settings.engine.timeout_secs, 60);
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert!(settings.engine.path.is_none());
        assert_eq!(settings.engine.timeout_secs, 30);
    }
}
