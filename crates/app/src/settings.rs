//! Runtime configuration.
//!
//! Settings come from `config/default.toml` (optional) overlaid with
//! `PACCO_`-prefixed environment variables, e.g. `PACCO_APP__LEVEL=debug`
//! or `PACCO_SERVER__PORT=8080`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the env filter (`error`..`trace`).
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
}

/// Where package records live: a throwaway in-memory store or a sqlite
/// file. In TOML: `database = "memory"` or `database = { sqlite = { path = "./pacco.db" } }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite { path: String },
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("PACCO").separator("__"))
            .build()?
            .try_deserialize()
    }
}
