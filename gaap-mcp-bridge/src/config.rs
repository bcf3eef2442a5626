//! Bridge configuration.
//!
//! Credentials and the endpoint come from the process environment and are
//! read exactly once at startup into an immutable [`BridgeConfig`]. HTTP
//! timeouts can additionally be tuned through a TOML file.
//!
//! # Environment Variables
//!
//! - `GAAP_TENANT_ID`: tenant identifier (required)
//! - `GAAP_API_KEY`: API key (required)
//! - `GAAP_WEBHOOK_SECRET`: HMAC signing secret (required)
//! - `GAAP_MCP_URL`: endpoint override (default: [`DEFAULT_ENDPOINT`])
//! - `GAAP_HTTP_CONFIG`: path to a TOML file holding [`HttpConfig`]
//!
//! # Examples
//!
//! ```toml
//! timeout_secs = 20
//! connect_timeout_secs = 5
//! ```

use std::{fmt, time::Duration};

use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::error::{BridgeError, Result};

/// Default GaaP invoke endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://automation.omnidm.ai/webhook/gaap-mcp/invoke";

/// Environment variable holding the tenant identifier.
pub const ENV_TENANT_ID: &str = "GAAP_TENANT_ID";
/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "GAAP_API_KEY";
/// Environment variable holding the HMAC signing secret.
pub const ENV_WEBHOOK_SECRET: &str = "GAAP_WEBHOOK_SECRET";
/// Environment variable overriding the endpoint URL.
pub const ENV_ENDPOINT: &str = "GAAP_MCP_URL";
/// Environment variable pointing at an optional TOML file with HTTP settings.
pub const ENV_HTTP_CONFIG: &str = "GAAP_HTTP_CONFIG";

/// Tenant credentials shared by every invocation.
///
/// The API key and signing secret are wiped from memory on drop and never
/// appear in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    tenant_id: String,
    api_key: Zeroizing<String>,
    webhook_secret: Zeroizing<String>,
}

impl Credentials {
    /// Creates credentials from their three parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaap_mcp_bridge::config::Credentials;
    ///
    /// let credentials = Credentials::new("tenant-1", "key-1", "s3cr3t");
    /// assert_eq!(credentials.tenant_id(), "tenant-1");
    /// assert!(!format!("{credentials:?}").contains("s3cr3t"));
    /// ```
    #[must_use]
    #[allow(
        clippy::impl_trait_in_params,
        reason = "impl Into<String> is idiomatic for constructors"
    )]
    pub fn new(
        tenant_id: impl Into<String>,
        api_key: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            api_key: Zeroizing::new(api_key.into()),
            webhook_secret: Zeroizing::new(webhook_secret.into()),
        }
    }

    /// Tenant identifier sent in `X-Tenant-ID`.
    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// API key sent in `X-API-Key`.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Shared HMAC signing secret.
    #[must_use]
    pub fn webhook_secret(&self) -> &str {
        &self.webhook_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("api_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Total request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl HttpConfig {
    /// Parses HTTP settings from TOML and validates them.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the TOML is malformed or values are
    /// out of range.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| BridgeError::Config(format!("invalid HTTP config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values are within acceptable bounds.
    ///
    /// # Errors
    ///
    /// Returns error if timeout values are outside valid ranges:
    /// - `timeout_secs`: must be 1-300 seconds
    /// - `connect_timeout_secs`: must be 1-60 seconds
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(BridgeError::Config("timeout_secs must be between 1 and 300".to_owned()));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(BridgeError::Config(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns timeout as Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns connect timeout as Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_connect_timeout_secs() -> u64 {
    10
}

/// Immutable bridge configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Tenant credentials.
    pub credentials: Credentials,
    /// Endpoint every tool call is POSTed to.
    pub endpoint: Url,
    /// HTTP client settings.
    pub http: HttpConfig,
}

impl BridgeConfig {
    /// Creates a configuration targeting [`DEFAULT_ENDPOINT`].
    ///
    /// # Errors
    ///
    /// Never fails in practice; returns `Result` because the endpoint is parsed.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Ok(Self { credentials, endpoint: parse_endpoint(DEFAULT_ENDPOINT)?, http: HttpConfig::default() })
    }

    /// Overrides the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if `endpoint` is not an `http(s)` URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = parse_endpoint(endpoint)?;
        Ok(self)
    }

    /// Replaces the HTTP settings after validating them.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if the settings are out of range.
    pub fn with_http(mut self, http: HttpConfig) -> Result<Self> {
        http.validate()?;
        self.http = http;
        Ok(self)
    }

    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if a required variable is missing or
    /// empty, the endpoint is invalid, or the HTTP config file cannot be read.
    pub fn from_env() -> Result<Self> {
        let config = Self::from_lookup(|name| std::env::var(name).ok())?;
        match std::env::var(ENV_HTTP_CONFIG) {
            Ok(path) if !path.is_empty() => {
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    BridgeError::Config(format!("cannot read {ENV_HTTP_CONFIG} file {path}: {e}"))
                })?;
                config.with_http(HttpConfig::from_toml(&contents)?)
            }
            _ => Ok(config),
        }
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as missing.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] naming the first missing variable, or
    /// describing an invalid endpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use gaap_mcp_bridge::config::BridgeConfig;
    ///
    /// let config = BridgeConfig::from_lookup(|name| match name {
    ///     "GAAP_TENANT_ID" => Some("tenant-1".to_owned()),
    ///     "GAAP_API_KEY" => Some("key-1".to_owned()),
    ///     "GAAP_WEBHOOK_SECRET" => Some("s3cr3t".to_owned()),
    ///     _ => None,
    /// })?;
    /// assert_eq!(config.endpoint.as_str(), gaap_mcp_bridge::config::DEFAULT_ENDPOINT);
    /// # Ok::<(), gaap_mcp_bridge::BridgeError>(())
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name).filter(|value| !value.is_empty()).ok_or_else(|| {
                BridgeError::Config(format!("missing required environment variable: {name}"))
            })
        };

        let credentials = Credentials::new(
            require(ENV_TENANT_ID)?,
            require(ENV_API_KEY)?,
            require(ENV_WEBHOOK_SECRET)?,
        );

        let endpoint = lookup(ENV_ENDPOINT)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());

        Ok(Self { credentials, endpoint: parse_endpoint(&endpoint)?, http: HttpConfig::default() })
    }
}

/// Parses and validates the endpoint URL.
fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| BridgeError::Config(format!("invalid endpoint URL {endpoint}: {e}")))?;

    if !matches!(url.scheme(), "https" | "http") {
        return Err(BridgeError::Config(format!(
            "endpoint must use http or https, got {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(BridgeError::Config(format!("endpoint URL missing host: {endpoint}")));
    }

    Ok(url)
}
