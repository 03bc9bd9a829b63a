use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "backend")]
#[command(about = "Item service backend")]
pub struct Config {
    /// Enable development mode (in-memory store, no DATABASE_URL needed)
    #[arg(long)]
    pub dev_mode: bool,

    /// Address to bind the HTTP server to
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8080")]
    pub server_addr: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Also append logs to this file
    #[arg(long, env = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DB_POOL_SIZE", default_value_t = 10)]
    pub db_pool_size: u32,

    /// Seconds to wait for a pooled connection
    #[arg(long, env = "DB_CONNECT_TIMEOUT_SECS", default_value_t = 5)]
    pub db_connect_timeout_secs: u64,

    /// Longest a single statement may run, even when the request has more time left
    #[arg(long, env = "DB_STATEMENT_TIMEOUT_MS", default_value_t = 5000)]
    pub db_statement_timeout_ms: u64,

    /// Seconds a request may spend before its store work is abandoned with 408
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    /// The database URL, required outside dev mode.
    pub fn database_url(&self) -> anyhow::Result<Option<&str>> {
        match (&self.database_url, self.dev_mode) {
            (_, true) => Ok(None),
            (Some(url), false) => Ok(Some(url)),
            (None, false) => anyhow::bail!("DATABASE_URL must be set (or pass --dev-mode)"),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_millis(self.db_statement_timeout_ms)
    }

    /// Directive used when `RUST_LOG` is unset.
    pub fn default_log_directive(&self) -> String {
        format!("{level},tower_http={level}", level = self.log_level)
    }
}
