#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub http_addr: String,
}

impl ServiceConfig {
    /// Reads configuration from the environment. The database defaults to a
    /// local SQLite file so the service runs with no setup at all.
    pub fn from_env(default_http_addr: &str) -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://granary.db?mode=rwc".to_string());
        let http_addr =
            std::env::var("HTTP_ADDR").unwrap_or_else(|_| default_http_addr.to_string());

        Self {
            database_url,
            http_addr,
        }
    }
}
