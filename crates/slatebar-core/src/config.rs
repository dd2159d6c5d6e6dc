//! Panel configuration, parsed from TOML.
//!
//! The config file lives at `$XDG_CONFIG_HOME/slatebar/config.toml`
//! (default `~/.config/slatebar/config.toml`). A missing file is not an
//! error (the built-in defaults are used), but a file passed explicitly
//! via `--config` must exist.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// The default config file, written out by `--print-default-config`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# slatebar configuration

[panel]
# Bar height in logical pixels.
height = 32
# Connector names to place a panel on (e.g. ["DP-1", "eDP-1"]).
# Empty means every connected monitor.
monitors = []

[compositor]
# Compositor backend: "auto", "sway", or "none".
backend = "auto"

[menus]
# strftime-style format for the clock button label.
clock_format = "%H:%M"
# Command spawned by the activities button. Empty disables the button's
# launcher action (the button itself is still shown).
activities_command = ""
"#;

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults (no file found).
    Defaults,
    /// Parsed from the given file.
    File(PathBuf),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub panel: PanelConfig,
    pub compositor: CompositorConfig,
    pub menus: MenusConfig,
}

/// `[panel]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Bar height in logical pixels.
    pub height: u32,
    /// Connector allow-list; empty means all monitors.
    pub monitors: Vec<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            height: 32,
            monitors: Vec::new(),
        }
    }
}

/// `[compositor]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Backend selection: "auto", "sway", or "none".
    pub backend: String,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            backend: "auto".to_string(),
        }
    }
}

/// `[menus]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MenusConfig {
    /// strftime-style format for the clock button label.
    pub clock_format: String,
    /// Command spawned by the activities button; empty disables it.
    pub activities_command: String,
}

impl Default for MenusConfig {
    fn default() -> Self {
        Self {
            clock_format: "%H:%M".to_string(),
            activities_command: String::new(),
        }
    }
}

impl Config {
    /// Parse and validate a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration.
    ///
    /// With an explicit `path`, the file must exist. Otherwise the default
    /// location is tried and a missing file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !path.exists() {
            if required {
                return Err(Error::ConfigNotFound(path));
            }
            return Ok((Config::default(), ConfigSource::Defaults));
        }

        let text = std::fs::read_to_string(&path)?;
        let config = Config::from_toml(&text)?;
        Ok((config, ConfigSource::File(path)))
    }

    /// Validate field ranges, collecting every problem before failing.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if !(16..=256).contains(&self.panel.height) {
            problems.push(format!(
                "panel.height = {} is outside the supported range 16..=256",
                self.panel.height
            ));
        }

        match self.compositor.backend.as_str() {
            "auto" | "sway" | "none" => {}
            other => problems.push(format!(
                "compositor.backend = {other:?} is not one of \"auto\", \"sway\", \"none\""
            )),
        }

        if self.menus.clock_format.is_empty() {
            problems.push("menus.clock_format must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::ConfigValidation(problems))
        }
    }
}

/// Default config file location.
///
/// `$XDG_CONFIG_HOME/slatebar/config.toml`, falling back to
/// `~/.config/slatebar/config.toml`.
fn default_config_path() -> PathBuf {
    let config_home = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.config")
    });
    PathBuf::from(config_home)
        .join("slatebar")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.panel.height, 32);
        assert!(config.panel.monitors.is_empty());
        assert_eq!(config.compositor.backend, "auto");
        assert_eq!(config.menus.clock_format, "%H:%M");
        assert!(config.menus.activities_command.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_toml_matches_defaults() {
        let parsed = Config::from_toml(DEFAULT_CONFIG_TOML).unwrap();
        let defaults = Config::default();
        assert_eq!(parsed.panel.height, defaults.panel.height);
        assert_eq!(parsed.panel.monitors, defaults.panel.monitors);
        assert_eq!(parsed.compositor.backend, defaults.compositor.backend);
        assert_eq!(parsed.menus.clock_format, defaults.menus.clock_format);
    }

    #[test]
    fn test_full_parse() {
        let config = Config::from_toml(
            r#"
            [panel]
            height = 40
            monitors = ["DP-1"]

            [compositor]
            backend = "sway"

            [menus]
            clock_format = "%a %H:%M"
            activities_command = "fuzzel"
            "#,
        )
        .unwrap();
        assert_eq!(config.panel.height, 40);
        assert_eq!(config.panel.monitors, vec!["DP-1".to_string()]);
        assert_eq!(config.compositor.backend, "sway");
        assert_eq!(config.menus.clock_format, "%a %H:%M");
        assert_eq!(config.menus.activities_command, "fuzzel");
    }

    #[test]
    fn test_partial_parse_keeps_defaults() {
        let config = Config::from_toml("[panel]\nheight = 28\n").unwrap();
        assert_eq!(config.panel.height, 28);
        assert_eq!(config.compositor.backend, "auto");
        assert_eq!(config.menus.clock_format, "%H:%M");
    }

    #[test]
    fn test_height_out_of_range() {
        let err = Config::from_toml("[panel]\nheight = 8\n").unwrap_err();
        match err {
            Error::ConfigValidation(problems) => {
                assert_eq!(problems.len(), 1);
                assert!(problems[0].contains("panel.height"));
            }
            other => panic!("expected ConfigValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Config::from_toml("[compositor]\nbackend = \"mutter\"\n").unwrap_err();
        match err {
            Error::ConfigValidation(problems) => {
                assert!(problems[0].contains("compositor.backend"));
            }
            other => panic!("expected ConfigValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_collects_all_problems() {
        let err = Config::from_toml(
            "[panel]\nheight = 4\n[compositor]\nbackend = \"x\"\n[menus]\nclock_format = \"\"\n",
        )
        .unwrap_err();
        match err {
            Error::ConfigValidation(problems) => assert_eq!(problems.len(), 3),
            other => panic!("expected ConfigValidation, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        assert!(matches!(
            Config::from_toml("[panel\nheight = 32"),
            Err(Error::ConfigParse(_))
        ));
    }
}
