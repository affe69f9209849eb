use std::fs;
use std::path::PathBuf;

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Get the data directory for the application.
pub fn get_data_dir() -> PathBuf {
    if let Ok(s) = std::env::var("EMBER_WALLET_DATA") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("io", "emberwallet", "ember-wallet") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Get the config directory for the application.
pub fn get_config_dir() -> PathBuf {
    if let Ok(s) = std::env::var("EMBER_WALLET_CONFIG") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("io", "emberwallet", "ember-wallet") {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

pub const DEFAULT_GATEWAY_URL: &str = "https://api.emberwallet.io";
pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address of the watched wallet.
    pub address: String,
    /// Fiat currency for prices and diffs.
    pub currency: String,
    /// Base URL of the wallet API.
    pub gateway_url: String,
    /// Events fetched per activity page.
    pub page_size: usize,
}

impl Config {
    pub fn new(address: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            currency: currency.into(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    fn path() -> PathBuf {
        get_config_dir().join("config.json")
    }

    /// Loads the persisted config; `None` on first run.
    pub fn load() -> Result<Option<Config>> {
        let path = Self::path();
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn save(&self) -> Result<()> {
        fs::create_dir_all(get_config_dir())?;
        fs::write(Self::path(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        // SAFETY: nothing else in this test binary touches the variable.
        unsafe {
            std::env::set_var("EMBER_WALLET_CONFIG", dir.path());
        }

        assert!(Config::load().expect("load").is_none());

        let config = Config {
            address: "EQabc123456789".to_string(),
            currency: "EUR".to_string(),
            gateway_url: "http://localhost:8080".to_string(),
            page_size: 10,
        };
        config.save().expect("save");

        assert_eq!(Config::load().expect("load"), Some(config));

        unsafe {
            std::env::remove_var("EMBER_WALLET_CONFIG");
        }
    }
}
