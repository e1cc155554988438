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
    /// Upstream station feed (JSON array of station objects).
    pub feed_url: String,
    pub feed_timeout_secs: u64,
    pub feed_user_agent: String,
    /// Six-field cron expression (seconds first) for the counts job.
    pub counts_refresh_cron: String,
    /// Six-field cron expression (seconds first) for the station metadata job.
    pub stations_refresh_cron: String,
    pub nearest_radius_miles: f64,
    pub nearest_limit: usize,
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
            .field("feed_url", &self.feed_url)
            .field("feed_timeout_secs", &self.feed_timeout_secs)
            .field("feed_user_agent", &self.feed_user_agent)
            .field("counts_refresh_cron", &self.counts_refresh_cron)
            .field("stations_refresh_cron", &self.stations_refresh_cron)
            .field("nearest_radius_miles", &self.nearest_radius_miles)
            .field("nearest_limit", &self.nearest_limit)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
