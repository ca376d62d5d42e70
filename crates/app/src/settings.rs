//! Settings for the `fintrack` binary.
//!
//! Values are layered: built-in defaults, then an optional `settings.toml`
//! in the working directory, then `FINTRACK__*` environment variables
//! (`FINTRACK__DATABASE__URL`, `FINTRACK__APP__LEVEL`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./fintrack.db?mode=rwc";

#[derive(Debug, Deserialize)]
pub struct App {
    /// Log level for the workspace crates.
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
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("database.url", DEFAULT_DATABASE_URL)?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("FINTRACK").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let settings = Settings::new().unwrap();
        assert!(!settings.app.level.is_empty());
        assert!(settings.database.url.starts_with("sqlite:"));
    }
}
