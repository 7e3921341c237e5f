//! Client configuration
//!
//! Settings are passed explicitly into the clients that use them; nothing
//! here touches process-wide HTTP defaults.

/// `Accept` header sent with every link check, in preference order
pub const DEFAULT_ACCEPT: &str = "application/json,application/xhtml+xml,text/html";

/// Default ScienceBase catalog endpoint
pub const DEFAULT_CATALOG_URL: &str = "https://www.sciencebase.gov/catalog/";

/// Default user agent for both clients
pub const DEFAULT_USER_AGENT: &str = concat!("sciencebase-weblinks/", env!("CARGO_PKG_VERSION"));

/// Configuration for fetching link targets
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// `Accept` header value (default: [`DEFAULT_ACCEPT`])
    pub accept: String,
    /// User agent string
    pub user_agent: String,
    /// Whole-request timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (default: 10000)
    pub connect_timeout_ms: u64,
    /// Maximum redirects followed (default: 30)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            accept: DEFAULT_ACCEPT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            max_redirects: 30,
        }
    }
}

impl FetchConfig {
    /// Create a new config builder
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::default()
    }
}

/// Builder for FetchConfig
#[derive(Default)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    /// Set the `Accept` header
    pub fn accept<S: Into<String>>(mut self, accept: S) -> Self {
        self.config.accept = accept.into();
        self
    }

    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Set request timeout
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.config.timeout_ms = ms;
        self
    }

    /// Set connect timeout
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set redirect limit
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Build the config
    pub fn build(self) -> FetchConfig {
        self.config
    }
}

/// Configuration for the catalog API client
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Catalog root; item URLs are `{base_url}item/{id}`
    pub base_url: String,
    /// User agent string
    pub user_agent: String,
    /// Request timeout in milliseconds (default: 30000)
    pub timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl CatalogConfig {
    /// Config pointing at another catalog root
    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}
