use anyhow::Context;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "webstore";
const DEFAULT_IMAGES_DIR: &str = "images";

/// Runtime settings, each overridable from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub mongo_uri: String,
    pub database: String,
    pub images_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            mongo_uri: lookup("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.into()),
            database: lookup("MONGO_DB").unwrap_or_else(|| DEFAULT_DATABASE.into()),
            images_dir: lookup("IMAGES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR)),
        })
    }
}
