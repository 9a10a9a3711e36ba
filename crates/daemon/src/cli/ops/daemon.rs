use std::time::Duration;

use clap::Args;

use tiletalk_daemon::state::AppState;
use tiletalk_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override API server port (default from config)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] tiletalk_daemon::state::StateError),
    #[error("service error: {0}")]
    ServiceError(#[from] tiletalk_daemon::StateSetupError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.tiletalk)
        let state = AppState::load(ctx.config_path.clone())?;

        let config = ServiceConfig {
            api_port: self.api_port.unwrap_or(state.config.api_port),
            request_timeout: Duration::from_secs(state.config.request_timeout_secs),
            sqlite_path: Some(state.db_path.clone()),
            max_contacts: state.config.max_contacts,
            live_buffer: state.config.live_buffer,
            log_level: state.config.tracing_level(),
            log_dir: self.log_dir.clone(),
        };

        spawn_service(&config).await?;
        Ok("daemon ended".to_string())
    }
}
