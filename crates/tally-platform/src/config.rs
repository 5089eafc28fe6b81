use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Runner settings. Every field has a default, so a partial file is fine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Window title until a view requests another one.
    pub title: String,
    /// Print the title and scene after every command.
    pub echo_frames: bool,
    /// Start with the HUD overlay enabled.
    pub inspector: bool,
    pub prompt: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            title: "Tally".to_string(),
            echo_frames: true,
            inspector: false,
            prompt: "> ".to_string(),
        }
    }
}

impl RunnerConfig {
    /// Loads a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::info!("no config at {}; using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = RunnerConfig::from_toml_str("inspector = true\ntitle = \"Demo\"\n").unwrap();
        assert!(cfg.inspector);
        assert_eq!(cfg.title, "Demo");
        assert!(cfg.echo_frames);
        assert_eq!(cfg.prompt, "> ");
    }

    #[test]
    fn missing_file_is_default() {
        let cfg = RunnerConfig::load(Path::new("/definitely/not/here/tally.toml")).unwrap();
        assert_eq!(cfg, RunnerConfig::default());
    }

    #[test]
    fn unknown_types_are_errors() {
        assert!(RunnerConfig::from_toml_str("echo_frames = \"yes\"").is_err());
    }

    #[test]
    fn round_trips_through_toml() {
        let cfg = RunnerConfig {
            prompt: "$ ".into(),
            ..RunnerConfig::default()
        };
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(RunnerConfig::from_toml_str(&text).unwrap(), cfg);
    }
}
