//! Gateway configuration: API base URL and transport timeout.
//!
//! Sources, in the order callers usually try them:
//! - a TOML file ([`GatewayConfig::from_toml_path`]) with `base_url` and
//!   `timeout_secs` keys, both optional
//! - the environment ([`GatewayConfig::from_env`]): `INVENTORY_API_URL` and
//!   `INVENTORY_API_TIMEOUT_SECS`
//!
//! Without either, the gateway targets a development server on
//! `http://localhost:8000/api/` and uses the transport's default timeout.

use std::{path::Path, time::Duration};

use serde::Deserialize;
use shared_utils::env::{get_env_var_or, parse_env_var};
use snafu::{ResultExt, ensure};
use tracing::debug;
use url::Url;

use crate::gateway::{
    ConfigSnafu, GatewayInitError, InvalidBaseUrlSnafu, ParseConfigSnafu, ReadConfigSnafu,
    UnusableBaseUrlSnafu,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/";
pub const BASE_URL_ENV: &str = "INVENTORY_API_URL";
pub const TIMEOUT_ENV: &str = "INVENTORY_API_TIMEOUT_SECS";

/// Where and how the REST gateway connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API root. Always ends with `/` so relative endpoint paths join beneath it.
    pub base_url: Url,
    /// Per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl GatewayConfig {
    pub fn new(base_url: &str) -> Result<Self, GatewayInitError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration from `INVENTORY_API_URL` and
    /// `INVENTORY_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, GatewayInitError> {
        let base_url = get_env_var_or(BASE_URL_ENV, DEFAULT_BASE_URL);
        let timeout = parse_env_var::<u64>(TIMEOUT_ENV)
            .context(ConfigSnafu)?
            .map(Duration::from_secs);
        debug!(%base_url, ?timeout, "gateway config from environment");

        let mut config = Self::new(&base_url)?;
        config.timeout = timeout;
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, GatewayInitError> {
        let file: ConfigFile = toml::from_str(s).context(ParseConfigSnafu)?;
        let mut config = Self::new(file.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        config.timeout = file.timeout_secs.map(Duration::from_secs);
        Ok(config)
    }

    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, GatewayInitError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
        Self::from_toml_str(&s)
    }

    /// Resolves an endpoint path such as `"stock/3/update/"` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path.trim_start_matches('/'))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: None,
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, GatewayInitError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).context(InvalidBaseUrlSnafu { url: trimmed })?;
    ensure!(!url.cannot_be_a_base(), UnusableBaseUrlSnafu { url: trimmed });
    Ok(url)
}
