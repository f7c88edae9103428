//! SDK configuration
//!
//! Values come from the builder or from `MONETA_*` environment variables
//! (a `.env` file is loaded first when present):
//!
//! | variable | field |
//! |---|---|
//! | `MONETA_MONEY_API` | [`Hosts::money_api`] |
//! | `MONETA_WEB` | [`Hosts::web`] |
//! | `MONETA_ACCESS_TOKEN` | [`ClientConfig::access_token`] |
//! | `MONETA_INSTANCE_ID` | [`ClientConfig::instance_id`] |
//! | `MONETA_USER_AGENT` | [`ClientConfig::user_agent`] |
//! | `MONETA_TIMEOUT_SECS` | [`ClientConfig::timeout`] |

use crate::error::{PaymentError, PaymentResult};
use secrecy::SecretString;
use std::collections::HashMap;
use std::time::Duration;

const ENV_PREFIX: &str = "MONETA_";

/// Service endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hosts {
    /// Base of the money API, without a trailing slash
    pub money_api: String,
    /// Web host used for authorization pages
    pub web: String,
}

impl Default for Hosts {
    fn default() -> Self {
        Self {
            money_api: "https://yoomoney.ru/api".to_string(),
            web: "https://yoomoney.ru".to_string(),
        }
    }
}

impl Hosts {
    /// Join a path onto the money API base
    pub fn money_api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.money_api.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service endpoints
    pub hosts: Hosts,
    /// OAuth access token for authorized sessions
    pub access_token: Option<SecretString>,
    /// Application instance id for external payments
    pub instance_id: Option<String>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hosts: Hosts::default(),
            access_token: None,
            instance_id: None,
            user_agent: format!("moneta/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load from the environment, reading `.env` first if there is one
    pub fn from_env() -> PaymentResult<Self> {
        // A missing .env file is the normal case.
        let _ = dotenvy::dotenv();

        let vars: HashMap<String, String> = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .map(|rest| (rest.to_lowercase(), value))
            })
            .collect();
        Self::from_vars(&vars)
    }

    /// Build from already-collected variables (keys lowercase, prefix stripped)
    pub fn from_vars(vars: &HashMap<String, String>) -> PaymentResult<Self> {
        let mut builder = Self::builder();

        if let Some(money_api) = vars.get("money_api") {
            builder = builder.money_api(money_api.clone());
        }
        if let Some(web) = vars.get("web") {
            builder = builder.web_host(web.clone());
        }
        if let Some(token) = vars.get("access_token") {
            builder = builder.access_token(token.clone());
        }
        if let Some(instance_id) = vars.get("instance_id") {
            builder = builder.instance_id(instance_id.clone());
        }
        if let Some(user_agent) = vars.get("user_agent") {
            builder = builder.user_agent(user_agent.clone());
        }
        if let Some(timeout) = vars.get("timeout_secs") {
            let secs = timeout.parse::<u64>().map_err(|e| {
                PaymentError::Config(format!("MONETA_TIMEOUT_SECS={}: {}", timeout, e))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        builder.build()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the money API base
    pub fn money_api(mut self, url: impl Into<String>) -> Self {
        self.config.hosts.money_api = url.into();
        self
    }

    /// Set the web host
    pub fn web_host(mut self, url: impl Into<String>) -> Self {
        self.config.hosts.web = url.into();
        self
    }

    /// Set the access token
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(SecretString::new(token.into().into()));
        self
    }

    /// Set the instance id
    pub fn instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.config.instance_id = Some(instance_id.into());
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Validate and build
    pub fn build(self) -> PaymentResult<ClientConfig> {
        url::Url::parse(&self.config.hosts.money_api)
            .map_err(|e| PaymentError::Config(format!("money_api: {}", e)))?;
        url::Url::parse(&self.config.hosts.web)
            .map_err(|e| PaymentError::Config(format!("web: {}", e)))?;
        if self.config.timeout.is_zero() {
            return Err(PaymentError::Config("timeout must be positive".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.hosts.money_api, "https://yoomoney.ru/api");
        assert_eq!(
            config.hosts.money_api_url("/process-payment"),
            "https://yoomoney.ru/api/process-payment"
        );
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_from_vars() {
        let vars: HashMap<String, String> = [
            ("money_api", "http://localhost:8080/api/"),
            ("access_token", "410012345.ABCDEF"),
            ("instance_id", "instance-1"),
            ("timeout_secs", "5"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = ClientConfig::from_vars(&vars).unwrap();
        assert_eq!(
            config.hosts.money_api_url("request-payment"),
            "http://localhost:8080/api/request-payment"
        );
        assert_eq!(
            config.access_token.as_ref().map(|t| t.expose_secret().to_string()),
            Some("410012345.ABCDEF".to_string())
        );
        assert_eq!(config.instance_id.as_deref(), Some("instance-1"));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let vars: HashMap<String, String> =
            [("timeout_secs".to_string(), "soon".to_string())].into_iter().collect();
        assert!(matches!(
            ClientConfig::from_vars(&vars),
            Err(PaymentError::Config(_))
        ));

        assert!(ClientConfig::builder().money_api("not a url").build().is_err());
    }
}
