// Runtime configuration from the environment; a local `.env` file is
// honored when present.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the collaborator's normalized catalog feed (JSON).
    pub catalog_path: String,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            catalog_path: "data/catalog.json".to_string(),
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Config {
        let _ = dotenv::dotenv();
        let defaults = Config::default();
        Config {
            catalog_path: env::var("SCARLETSHIFT_CATALOG").unwrap_or(defaults.catalog_path),
            bind_addr: env::var("SCARLETSHIFT_BIND").unwrap_or(defaults.bind_addr),
        }
    }
}
