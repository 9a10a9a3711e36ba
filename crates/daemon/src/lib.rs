// Service modules (daemon functionality)
pub mod contacts;
pub mod database;
pub mod error;
pub mod http_server;
pub mod identities;
pub mod notify;
pub mod process;
pub mod service_config;
pub mod service_state;
pub mod tiles;
pub mod version;

// App state (configuration, paths)
pub mod state;

// Re-exports for consumers
pub use error::ServiceError;
pub use process::{spawn_service, start_service, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use service_state::{State as ServiceState, StateSetupError};
pub use state::{AppConfig, AppState, StateError};
