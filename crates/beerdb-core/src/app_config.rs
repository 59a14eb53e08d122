use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration, loaded once at startup.
///
/// `retail_api_base` and `retail_api_v3_base` are the two generations of the
/// retailer API; the search endpoints live on the former, per-product detail
/// on the latter. `community_base_url` is the rating service's web root.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub retail_api_base: String,
    pub retail_api_v3_base: String,
    pub community_base_url: String,
    pub categories_path: PathBuf,
    pub auto_accept_wrong_match: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_request_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_inter_request_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("retail_api_base", &self.retail_api_base)
            .field("retail_api_v3_base", &self.retail_api_v3_base)
            .field("community_base_url", &self.community_base_url)
            .field("categories_path", &self.categories_path)
            .field("auto_accept_wrong_match", &self.auto_accept_wrong_match)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "http_request_timeout_secs",
                &self.http_request_timeout_secs,
            )
            .field("http_user_agent", &self.http_user_agent)
            .field(
                "http_inter_request_delay_ms",
                &self.http_inter_request_delay_ms,
            )
            .finish()
    }
}
