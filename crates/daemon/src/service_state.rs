use std::sync::Arc;

use axum::extract::FromRef;
use url::Url;

use crate::contacts::ContactGraph;
use crate::database::{Database, DatabaseSetupError};
use crate::http_server::auth::{Authenticator, TrustedHeaderAuthenticator};
use crate::identities::IdentityDirectory;
use crate::notify::NotificationHub;
use crate::service_config::Config;
use crate::tiles::TileStore;

/// Main service state - shared by every request handler
#[derive(Clone)]
pub struct State {
    database: Database,
    identities: IdentityDirectory,
    contacts: ContactGraph,
    tiles: TileStore,
    hub: NotificationHub,
    authenticator: Arc<dyn Authenticator>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let sqlite_database_url = match config.sqlite_path {
            Some(ref path) => {
                // check that the path exists
                if !path.exists() {
                    return Err(StateSetupError::DatabasePathDoesNotExist);
                }
                // parse the path into a URL
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!("Database URL: {:?}", sqlite_database_url);
        let database = Database::connect(&sqlite_database_url).await?;

        Ok(Self::from_database(
            database,
            config.max_contacts,
            config.live_buffer,
        ))
    }

    /// Wire every component over an already migrated database
    ///
    /// Callers are authenticated by the trusted proxy header unless
    /// [`State::with_authenticator`] swaps in another scheme.
    pub fn from_database(database: Database, max_contacts: i64, live_buffer: usize) -> Self {
        let hub = NotificationHub::new(live_buffer);
        let authenticator: Arc<dyn Authenticator> =
            Arc::new(TrustedHeaderAuthenticator::new(database.clone()));
        let identities = IdentityDirectory::new(database.clone());
        let contacts = ContactGraph::new(database.clone(), max_contacts);
        let tiles = TileStore::new(database.clone(), contacts.clone(), hub.clone());

        Self {
            database,
            identities,
            contacts,
            tiles,
            hub,
            authenticator,
        }
    }

    /// Fresh in-memory state with default limits
    pub async fn in_memory() -> Result<Self, StateSetupError> {
        let config = Config::default();
        Ok(Self::from_database(
            Database::in_memory().await?,
            config.max_contacts,
            config.live_buffer,
        ))
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn identities(&self) -> &IdentityDirectory {
        &self.identities
    }

    pub fn contacts(&self) -> &ContactGraph {
        &self.contacts
    }

    pub fn tiles(&self) -> &TileStore {
        &self.tiles
    }

    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
        &self.authenticator
    }
}

impl AsRef<Database> for State {
    fn as_ref(&self) -> &Database {
        self.database()
    }
}

impl FromRef<State> for Database {
    fn from_ref(state: &State) -> Self {
        state.database.clone()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("Database path does not exist")]
    DatabasePathDoesNotExist,
    #[error("Database setup error")]
    DatabaseSetupError(#[from] DatabaseSetupError),
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,
}
