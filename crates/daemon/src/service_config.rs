use std::path::PathBuf;
use std::time::Duration;

/// Resolved runtime configuration for the daemon
#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port for the API HTTP server
    pub api_port: u16,
    /// Timeout applied to every API request
    pub request_timeout: Duration,

    // data store configuration
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used
    pub sqlite_path: Option<PathBuf>,

    // grid rules
    /// Cap on authorized contacts per identity
    pub max_contacts: i64,
    /// Undelivered live hints kept per connection
    pub live_buffer: usize,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_port: 5001,
            request_timeout: Duration::from_secs(30),
            sqlite_path: None,
            max_contacts: crate::contacts::DEFAULT_MAX_CONTACTS,
            live_buffer: crate::notify::DEFAULT_LIVE_BUFFER,
            log_level: tracing::Level::INFO,
            log_dir: None,
        }
    }
}
