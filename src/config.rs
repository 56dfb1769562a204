use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub programs: Programs,
    #[serde(default)]
    pub mp3: Mp3Options,
}

/// Names (or full paths) of the external tools the converter shells out to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Programs {
    #[serde(default = "default_flac")]
    pub flac: String,
    #[serde(default = "default_lame")]
    pub lame: String,
    #[serde(default = "default_metaflac")]
    pub metaflac: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            flac: default_flac(),
            lame: default_lame(),
            metaflac: default_metaflac(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mp3Options {
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
}

impl Default for Mp3Options {
    fn default() -> Self {
        Self {
            bitrate: default_bitrate(),
        }
    }
}

fn default_flac() -> String {
    "flac".to_string()
}

fn default_lame() -> String {
    "lame".to_string()
}

fn default_metaflac() -> String {
    "metaflac".to_string()
}

fn default_bitrate() -> u32 {
    320
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("anarky")
        .join("config.toml")
}

/// Loads the config file, falling back to defaults when it is missing or
/// cannot be parsed.
pub fn load_config() -> Config {
    let path = config_path();
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => toml::from_str(&content).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.programs.flac, "flac");
        assert_eq!(cfg.programs.lame, "lame");
        assert_eq!(cfg.programs.metaflac, "metaflac");
        assert_eq!(cfg.mp3.bitrate, 320);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: Config = toml::from_str("[mp3]\nbitrate = 192\n").unwrap();
        assert_eq!(cfg.mp3.bitrate, 192);
        assert_eq!(cfg.programs.flac, "flac");
    }

    #[test]
    fn test_config_round_trip() {
        let mut cfg = Config::default();
        cfg.programs.lame = "/opt/lame/bin/lame".to_string();
        cfg.mp3.bitrate = 256;

        let content = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.programs.lame, "/opt/lame/bin/lame");
        assert_eq!(parsed.mp3.bitrate, 256);
    }
}
