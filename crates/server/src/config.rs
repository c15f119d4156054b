//! Environment-driven server configuration. `.env` files are honored via
//! dotenvy in `main`.

use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()?
            .unwrap_or(3001);
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://wrenchbay.db".to_string());
        Ok(Self {
            host,
            port,
            database_url,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
