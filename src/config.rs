//! Settings loaded from defaults, an optional config file and `WIDGETS__*` env vars

use std::path::Path;

use config::{Config, Environment, File, Map};
use serde::Deserialize;

use crate::db::DEFAULT_MAP_SIZE;
use crate::error::{Result, WidgetError};

pub const ENV_PREFIX: &str = "WIDGETS";
pub const DEFAULT_CONFIG_FILE: &str = "config/widgets";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// LMDB environment directory
    pub db_path: String,
    pub bind_addr: String,
    pub map_size: usize,
    /// `EnvFilter` directive, e.g. `info,partner_widgets=debug`
    pub log_filter: String,
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: "data/widgets".into(),
            bind_addr: "127.0.0.1:3000".into(),
            map_size: DEFAULT_MAP_SIZE,
            log_filter: "info".into(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Load from `config/widgets.{toml,yaml,json}` if present, then the environment
    pub fn load() -> Result<Self> {
        build(None, None)
    }

    /// Load from an explicit file, which must exist, then the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        build(Some(path), None)
    }
}

fn cfg_err(e: config::ConfigError) -> WidgetError {
    WidgetError::Config(e.to_string())
}

/// `env` replaces the process environment, for tests
fn build(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Settings> {
    let d = Settings::default();
    let file = match path {
        Some(p) => File::from(p).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };
    Config::builder()
        .set_default("db_path", d.db_path)
        .map_err(cfg_err)?
        .set_default("bind_addr", d.bind_addr)
        .map_err(cfg_err)?
        .set_default("map_size", d.map_size as u64)
        .map_err(cfg_err)?
        .set_default("log_filter", d.log_filter)
        .map_err(cfg_err)?
        .set_default("log_json", d.log_json)
        .map_err(cfg_err)?
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(env),
        )
        .build()
        .map_err(cfg_err)?
        .try_deserialize()
        .map_err(cfg_err)
}
