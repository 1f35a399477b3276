//! Configuration system for Keybench.
//!
//! Uses `figment` for layered configuration: defaults -> user config file
//! -> workspace config file -> environment. Configuration is loaded from
//! `~/.config/keybench/config.toml` and/or `.keybench/config.toml` in the
//! workspace directory.

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeybenchConfig {
    pub bench: BenchConfig,
    pub efficiency: EfficiencyConfig,
}

/// Configuration for benchmark runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Repetitions per phase.
    pub iterations: usize,
    /// Message signed and verified during benchmark runs.
    pub message: String,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            iterations: 20,
            message: "benchmark".to_string(),
        }
    }
}

/// Configuration for the security-efficiency probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyConfig {
    /// Message signed and verified during the probe.
    pub message: String,
}

impl Default for EfficiencyConfig {
    fn default() -> Self {
        Self {
            message: "security-efficiency".to_string(),
        }
    }
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `KEYBENCH_`)
/// 3. Workspace-local config (`.keybench/config.toml`)
/// 4. User config (`~/.config/keybench/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    overrides: Option<&KeybenchConfig>,
) -> Result<KeybenchConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(KeybenchConfig::default()));

    // User-level config
    if let Some(config_dir) = directories::ProjectDirs::from("dev", "keybench", "keybench") {
        let user_config = config_dir.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = ws.join(".keybench").join("config.toml");
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    // Environment variables (KEYBENCH_BENCH__ITERATIONS, etc.)
    figment = figment.merge(Env::prefixed("KEYBENCH_").split("__"));

    // Explicit overrides
    if let Some(overrides) = overrides {
        figment = figment.merge(Serialized::defaults(overrides));
    }

    let config: KeybenchConfig = figment
        .extract()
        .map_err(|e| ConfigError::ParseError { message: e.to_string() })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &KeybenchConfig) -> Result<(), ConfigError> {
    if config.bench.iterations == 0 {
        return Err(ConfigError::Invalid {
            message: "bench.iterations must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Render a configuration as pretty TOML, for `keybench config init/show`.
pub fn to_toml_string(config: &KeybenchConfig) -> Result<String, ConfigError> {
    toml::to_string_pretty(config).map_err(|e| ConfigError::ParseError { message: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = KeybenchConfig::default();
        assert_eq!(config.bench.iterations, 20);
        assert_eq!(config.bench.message, "benchmark");
        assert_eq!(config.efficiency.message, "security-efficiency");
    }

    #[test]
    fn test_load_without_files_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config, KeybenchConfig::default());
    }

    #[test]
    fn test_workspace_config_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".keybench");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            "[bench]\niterations = 5\nmessage = \"hello\"\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.bench.iterations, 5);
        assert_eq!(config.bench.message, "hello");
        // Untouched sections keep their defaults.
        assert_eq!(config.efficiency.message, "security-efficiency");
    }

    #[test]
    fn test_explicit_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = KeybenchConfig {
            bench: BenchConfig {
                iterations: 3,
                message: "override".to_string(),
            },
            ..Default::default()
        };
        let config = load_config(Some(dir.path()), Some(&overrides)).unwrap();
        assert_eq!(config.bench.iterations, 3);
        assert_eq!(config.bench.message, "override");
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config_dir = dir.path().join(".keybench");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.toml"), "[bench]\niterations = 0\n").unwrap();

        let err = load_config(Some(dir.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_to_toml_string_round_trips() {
        let config = KeybenchConfig::default();
        let rendered = to_toml_string(&config).unwrap();
        let parsed: KeybenchConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
