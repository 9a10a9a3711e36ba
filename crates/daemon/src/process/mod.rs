pub mod utils;

use std::net::SocketAddr;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::http_server;
use crate::service_state::StateSetupError;
use crate::{ServiceConfig, ServiceState};

/// How long the API server gets to drain after shutdown is signalled
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

const LOG_FILE_NAME: &str = "tiletalk.log";

/// A running daemon. Dropping it leaves the server running.
pub struct ShutdownHandle {
    signal_waiter: JoinHandle<()>,
    api: JoinHandle<()>,
    shutdown_tx: watch::Sender<()>,
}

impl ShutdownHandle {
    /// Block until a signal or [`ShutdownHandle::shutdown`] stops the daemon
    pub async fn wait(self) {
        let _ = self.signal_waiter.await;

        if timeout(DRAIN_TIMEOUT, self.api).await.is_err() {
            tracing::error!(
                "API server did not drain within {} seconds",
                DRAIN_TIMEOUT.as_secs()
            );
            std::process::exit(4);
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn env_filter(config: &ServiceConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env_lossy()
}

/// Install the global subscriber: compact stdout always, plus a daily
/// `tiletalk.log` when a log directory is configured
///
/// The returned guards flush the non-blocking writers and must outlive the daemon.
fn init_logging(config: &ServiceConfig) -> Vec<WorkerGuard> {
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut guards = vec![stdout_guard];

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stdout_writer)
        .with_filter(env_filter(config));

    let file_layer = config.log_dir.as_ref().map(|log_dir| {
        if let Err(e) = std::fs::create_dir_all(log_dir) {
            eprintln!("Warning: cannot create log directory {:?}: {}", log_dir, e);
        }
        let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
        guards.push(file_guard);

        tracing_subscriber::fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_filter(env_filter(config))
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    utils::register_panic_logger();
    utils::report_build_info();

    guards
}

/// Open the store and start serving the API and live channel
pub async fn start_service(
    config: &ServiceConfig,
) -> Result<(ServiceState, ShutdownHandle), StateSetupError> {
    let state = ServiceState::from_config(config).await?;
    let (signal_waiter, shutdown_tx, shutdown_rx) = utils::graceful_shutdown_blocker();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let mut api_config = http_server::Config::new(addr, config.request_timeout);
    api_config.log_level = config.log_level;

    let api_state = state.clone();
    let api = tokio::spawn(async move {
        if let Err(e) = http_server::run_api(api_config, api_state, shutdown_rx).await {
            tracing::error!(error = %e, "API server stopped");
        }
    });

    tracing::info!(
        port = config.api_port,
        max_contacts = config.max_contacts,
        live_buffer = config.live_buffer,
        "tiletalk daemon running"
    );

    Ok((
        state,
        ShutdownHandle {
            signal_waiter,
            api,
            shutdown_tx,
        },
    ))
}

/// Run the daemon in the foreground until it is told to stop
pub async fn spawn_service(config: &ServiceConfig) -> Result<(), StateSetupError> {
    let _guards = init_logging(config);
    let (_, handle) = start_service(config).await?;
    handle.wait().await;
    Ok(())
}
