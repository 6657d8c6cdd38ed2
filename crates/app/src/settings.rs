//! Settings of the `ledgerctl` binary.
//!
//! Values come from an optional `settings.toml`, then from environment
//! variables prefixed with `LEDGER__` (e.g. `LEDGER__DATABASE__URL`).
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [database]
//! url = "sqlite:./ledger.db?mode=rwc"
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_DATABASE_URL: &str = "sqlite:./ledger.db?mode=rwc";

#[derive(Debug, Deserialize)]
pub struct App {
    /// `tracing` level applied to the binary and to the engine.
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

impl Settings {
    /// Load the settings. `path` is the settings file without extension and
    /// may be missing.
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("app.level", DEFAULT_LEVEL)?
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("LEDGER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}
