use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

const DATA_DIR_NAME: &str = ".minutes";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "Config::default_log_level")]
    pub log_level: String,
    /// Destination hint used when an import names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_hint: Option<String>,
    #[serde(default = "Config::default_inbox_name")]
    pub inbox_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
            default_hint: None,
            inbox_name: Self::default_inbox_name(),
        }
    }
}

impl Config {
    fn default_log_level() -> String {
        "warn".to_string()
    }

    fn default_inbox_name() -> String {
        "Inbox".to_string()
    }

    /// `~/.minutes`
    pub fn default_data_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home_dir.join(DATA_DIR_NAME))
    }

    pub fn resolve_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
        match data_dir {
            Some(dir) => Ok(dir),
            None => Self::default_data_dir(),
        }
    }

    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE_NAME)
    }

    /// Reads `config.json` from `data_dir`; a missing file means defaults.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = Self::path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(data_dir), content)?;
        Ok(())
    }
}
