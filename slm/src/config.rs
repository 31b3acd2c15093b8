use slm_core::{
    error::SlmError,
    settings::{registered_domain, ClientSettings},
};
use std::net::SocketAddr;

const DEFAULT_OPTION_PREFIX: &str = "slm_plugin";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

pub struct Config {
    pub settings: ClientSettings,
    /// Postgres connection string. Options are kept in memory when absent.
    pub database_conn: Option<String>,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, SlmError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SlmError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| SlmError::config(format!("{name} must be set")))
        };

        let item_reference = required("SLM_ITEM_REFERENCE")?;
        let plugin_basename = var("SLM_PLUGIN_BASENAME")
            .unwrap_or_else(|| format!("{item_reference}/{item_reference}.php"));
        let settings = ClientSettings {
            server_url: required("SLM_SERVER_URL")?,
            secret_key: required("SLM_SECRET_KEY")?,
            registered_domain: registered_domain(&required("SLM_SITE_URL")?)?,
            version: var("SLM_PLUGIN_VERSION")
                .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            option_prefix: var("SLM_OPTION_PREFIX")
                .unwrap_or_else(|| DEFAULT_OPTION_PREFIX.to_string()),
            item_reference,
            plugin_basename,
        };

        let bind_addr = var("SLM_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|err| SlmError::config(format!("SLM_BIND_ADDR {bind_addr:?}: {err}")))?;

        Ok(Self {
            settings,
            database_conn: var("DATABASE_CONN"),
            bind_addr,
        })
    }
}
