//! Run settings: defaults, then `cb_scraper.toml` if present, then `CB_*`
//! environment variables (`CB_DB_PATH`, `CB_TIMEOUT_SECS`, ...).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory page listing the boroughs.
    #[serde(default = "default_root_url")]
    pub root_url: String,
    /// Id of the element wrapping the borough link list.
    #[serde(default = "default_content_region")]
    pub content_region: String,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_root_url() -> String {
    "http://www.nyc.gov/html/cau/html/cb/cb.shtml".to_string()
}

fn default_content_region() -> String {
    "main_content".to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("community_boards.db")
}

fn default_csv_path() -> PathBuf {
    PathBuf::from("community_boards.csv")
}

fn default_user_agent() -> String {
    concat!("cb_scraper/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root_url: default_root_url(),
            content_region: default_content_region(),
            db_path: default_db_path(),
            csv_path: default_csv_path(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Settings {
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("cb_scraper").required(false))
            .add_source(config::Environment::with_prefix("CB").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
