use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
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

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Serper.dev API key. Optional at load time; absence is surfaced as a
    /// per-request configuration error rather than a startup failure.
    pub serper_api_key: Option<String>,
    /// Overrides the production Serper endpoint, e.g. to point at a local
    /// proxy or a mock server in tests.
    pub serper_base_url: Option<String>,
    pub serper_timeout_secs: u64,
    /// Fixed pause between consecutive keyword searches in a batch.
    pub batch_delay_ms: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "serper_api_key",
                &self.serper_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("serper_base_url", &self.serper_base_url)
            .field("serper_timeout_secs", &self.serper_timeout_secs)
            .field("batch_delay_ms", &self.batch_delay_ms)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
