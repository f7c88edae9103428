//! HTTP client configuration.

use std::time::Duration;

/// What the client does with 3xx answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Redirects {
    /// Hand 3xx answers to the caller untouched.
    ///
    /// The payment protocol reads `Location` on 300 and 400 answers as the
    /// next submission endpoint, so this is the default.
    #[default]
    Manual,
    /// Follow up to `max` redirects.
    Follow {
        /// Redirect limit.
        max: usize,
    },
}

/// Connection pool settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// How long an idle connection is kept.
    pub idle_timeout: Duration,
    /// Idle connections kept per host.
    pub max_idle_per_host: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(90),
            max_idle_per_host: 8,
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL that relative request URLs are joined onto.
    pub base_url: Option<String>,
    /// Whole-request timeout, unless a request sets its own.
    pub timeout: Duration,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Connection pool.
    pub pool: PoolConfig,
    /// Headers added to every request before the request's own.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Accept gzip and brotli encoded bodies.
    pub compression: bool,
    /// Redirect handling.
    pub redirects: Redirects,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool: PoolConfig::default(),
            default_headers: Vec::new(),
            user_agent: format!("moneta-http/{}", env!("CARGO_PKG_VERSION")),
            compression: true,
            redirects: Redirects::Manual,
        }
    }
}

impl HttpClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`].
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Base URL for relative request URLs.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Connection pool settings.
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.config.pool = pool;
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// User agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Accept compressed bodies.
    pub fn compression(mut self, enable: bool) -> Self {
        self.config.compression = enable;
        self
    }

    /// Redirect handling.
    pub fn redirects(mut self, redirects: Redirects) -> Self {
        self.config.redirects = redirects;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_redirects_visible() {
        let config = HttpClientConfig::default();
        assert_eq!(config.redirects, Redirects::Manual);
        assert!(config.compression);
        assert!(config.user_agent.starts_with("moneta-http/"));
    }

    #[test]
    fn test_builder() {
        let config = HttpClientConfig::builder()
            .timeout(Duration::from_secs(5))
            .default_header("Accept-Language", "ru")
            .redirects(Redirects::Follow { max: 3 })
            .pool(PoolConfig {
                max_idle_per_host: 1,
                ..Default::default()
            })
            .build();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.default_headers.len(), 1);
        assert_eq!(config.redirects, Redirects::Follow { max: 3 });
        assert_eq!(config.pool.max_idle_per_host, 1);
    }
}
