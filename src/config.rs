use crate::store::Backend;
use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/topics.json";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid value for {key}: `{value}`")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub backend: Backend,
    /// Seed the starter topics when the store opens empty.
    pub seed_sample: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = match lookup("HOST") {
            Some(value) => value
                .parse::<IpAddr>()
                .map_err(|_| ConfigError { key: "HOST", value })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let backend = match lookup("HEATMAP_STORAGE").as_deref() {
            None | Some("file") => Backend::File(resolve_data_path(&lookup)),
            Some("memory") => Backend::Memory,
            Some(other) => {
                return Err(ConfigError {
                    key: "HEATMAP_STORAGE",
                    value: other.to_string(),
                });
            }
        };

        let seed_sample = match lookup("HEATMAP_SEED_SAMPLE") {
            Some(value) => parse_flag(&value).ok_or(ConfigError {
                key: "HEATMAP_SEED_SAMPLE",
                value,
            })?,
            None => false,
        };

        Ok(Self {
            addr: SocketAddr::new(host, port),
            backend,
            seed_sample,
        })
    }
}

pub fn resolve_data_path(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    lookup("HEATMAP_DATA_PATH")
        .or_else(|| lookup("APP_DATA_PATH"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
