use std::net::SocketAddr;
use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use secrecy::SecretString;
use serde::Deserialize;

/// Layered application configuration:
/// YAML file (if provided) -> `CONCIERGE__*` environment -> CLI overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Origin used for redirect defaults when a request has no `Origin`
    /// header (e.g. server-to-server calls).
    #[serde(default = "default_public_origin")]
    pub public_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_origin: default_public_origin(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    #[allow(clippy::expect_used)] // literal address
    "127.0.0.1:8080".parse().expect("default bind address")
}

fn default_public_origin() -> String {
    "http://localhost:3000".to_owned()
}

/// One hosted provider endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub url: String,
    pub api_key: SecretString,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Hosted database (vouchers, newsletter). Optional: without it the
    /// pricing endpoint is disabled and newsletter writes are skipped.
    #[serde(default)]
    pub record_store: Option<EndpointConfig>,
    /// Identity provider admin API. Required.
    #[serde(default)]
    pub identity: Option<EndpointConfig>,
    /// Email delivery API. Required.
    #[serde(default)]
    pub email_api: Option<EndpointConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    #[serde(default = "default_sender_address")]
    pub sender_address: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// Internal addresses notified of new signups. May be empty.
    #[serde(default)]
    pub admin_recipients: Vec<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sender_address: default_sender_address(),
            sender_name: default_sender_name(),
            admin_recipients: Vec::new(),
        }
    }
}

fn default_sender_address() -> String {
    "no-reply@localhost".to_owned()
}

fn default_sender_name() -> String {
    "Concierge".to_owned()
}

impl AppConfig {
    /// Load the layered configuration. Missing file means defaults + env.
    ///
    /// # Errors
    ///
    /// Fails when the YAML is malformed or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment
            .merge(Env::prefixed("CONCIERGE__").split("__"))
            .extract()?;
        Ok(config)
    }

    /// Dispatcher credentials are required up front; a missing provider
    /// must stop the process, not fail per-request.
    ///
    /// # Errors
    ///
    /// Lists every missing required section.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut missing = Vec::new();
        if self.providers.identity.is_none() {
            missing.push("providers.identity");
        }
        if self.providers.email_api.is_none() {
            missing.push("providers.email_api");
        }
        if self.email.sender_address.trim().is_empty() {
            missing.push("email.sender_address");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("missing required configuration: {}", missing.join(", "))
        }
    }
}
