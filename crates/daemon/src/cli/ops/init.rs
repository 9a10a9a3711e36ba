use clap::Args;

use common::vault::KeyVault;
use tiletalk_daemon::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Local identity name; also names its key pair in the vault
    #[arg(long)]
    pub username: String,

    /// API server port (default: 5001)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Cap on authorized contacts per identity (default: 20)
    #[arg(long)]
    pub max_contacts: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] tiletalk_daemon::state::StateError),
    #[error("key generation failed: {0}")]
    Vault(#[from] common::vault::VaultError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_port: self.api_port.unwrap_or(defaults.api_port),
            max_contacts: self.max_contacts.unwrap_or(defaults.max_contacts),
            username: Some(self.username.clone()),
            ..defaults
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;
        let pair = state.vault()?.generate(&self.username)?;
        let fingerprint = pair
            .public
            .to_base64()
            .map_err(common::vault::VaultError::from)?;

        let output = format!(
            "Initialized tiletalk directory at: {}\n\
             - Database: {}\n\
             - Vault: {}\n\
             - Config: {}\n\
             - Username: {}\n\
             - API port: {}\n\
             - Max contacts: {}\n\
             - Public key: {}...",
            state.tiletalk_dir.display(),
            state.db_path.display(),
            state.vault_path.display(),
            state.config_path.display(),
            self.username,
            state.config.api_port,
            state.config.max_contacts,
            &fingerprint[..fingerprint.len().min(24)]
        );

        Ok(output)
    }
}
