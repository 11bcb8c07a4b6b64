use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const CONFIG_ENV: &str = "HOTELTASK_CONFIG";
pub const DATA_DIR_ENV: &str = "HOTELTASK_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `tasks.json` and `definitions.jsonl`.
    pub data_dir: PathBuf,
    /// IANA zone deciding which calendar day "now" is.
    pub timezone: String,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        data_dir.push("hoteltask");
        Config {
            data_dir,
            timezone: "Europe/Paris".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| anyhow!("invalid timezone in config: {}", self.timezone))
    }
}

/// `$HOTELTASK_CONFIG`, else `<config dir>/hoteltask/config.toml`.
pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_ENV).map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("hoteltask");
        p.push("config.toml");
        p
    })
}

/// Loads the config file (defaults when absent) and applies
/// `$HOTELTASK_DATA_DIR`.
pub fn load_config() -> Result<Config> {
    let p = config_path();
    let mut cfg = if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?
    } else {
        Config::default()
    };
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        cfg.data_dir = PathBuf::from(dir);
    }
    cfg.timezone().context("check timezone")?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = config_path();
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}
