use std::path::Path;

use anyhow::Context;
use config::{Config, Environment, File, Map};
use serde::Deserialize;

const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
    pub storage: StorageBackend,
    pub seed_sample_data: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/pizzas.db".into(),
            storage: StorageBackend::Sqlite,
            seed_sample_data: false,
        }
    }
}

/// Defaults, then `server.toml`, then `SERVER_BIND`/`DATABASE_URL`, then `APP__*`.
pub fn load_settings() -> anyhow::Result<Settings> {
    build_settings(Path::new(SETTINGS_FILE), std::env::vars().collect())
}

pub(crate) fn build_settings(file: &Path, vars: Map<String, String>) -> anyhow::Result<Settings> {
    let defaults = Settings::default();
    let mut builder = Config::builder()
        .set_default("bind_addr", defaults.bind_addr)?
        .set_default("database_url", defaults.database_url)?
        .set_default("storage", "sqlite")?
        .set_default("seed_sample_data", defaults.seed_sample_data)?
        .add_source(File::from(file.to_path_buf()).required(false));

    for (key, conventional, prefixed) in [
        ("bind_addr", "SERVER_BIND", "APP__BIND_ADDR"),
        ("database_url", "DATABASE_URL", "APP__DATABASE_URL"),
    ] {
        if let (Some(v), false) = (vars.get(conventional), vars.contains_key(prefixed)) {
            builder = builder.set_override(key, v.as_str())?;
        }
    }

    builder
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars)),
        )
        .build()
        .context("failed to assemble server settings")?
        .try_deserialize()
        .context("invalid server settings")
}

/// Turns a plain path or `sqlite:` path into a `sqlite://` url. `Storage::new`
/// creates the parent directory.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
