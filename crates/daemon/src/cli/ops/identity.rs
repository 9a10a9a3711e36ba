use clap::{Args, Subcommand};

use common::crypto::KeyPair;
use common::vault::{KeyVault, VaultError};
use tiletalk_daemon::database::models::Identity as IdentityRecord;
use tiletalk_daemon::http_server::api::client::ApiError;
use tiletalk_daemon::http_server::api::v0::identity::{
    DeleteIdentityRequest, DeleteIdentityResponse, ProfileRequest, RegisterRequest,
    RotateKeyRequest,
};
use tiletalk_daemon::state::StateError;

use crate::cli::op::{Op, OpContext};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
    #[error("no local identity registered; pass --id or --username")]
    NoSelector,
}

fn public_key_of(pair: &KeyPair) -> Result<String, VaultError> {
    Ok(pair.public.to_base64()?)
}

pub(crate) fn render_identity(identity: &IdentityRecord) -> String {
    let key = match identity.public_key.as_deref() {
        Some(key) => format!("{}...", &key[..key.len().min(24)]),
        None => "none".to_string(),
    };
    format!(
        "{} (id: {}) key: {} since {}",
        identity.username, identity.id, key, identity.created_at
    )
}

/// Register the configured username with the daemon and publish its key
#[derive(Args, Debug, Clone)]
pub struct Register;

/// Generate a new key pair and publish it, then keep it locally
#[derive(Args, Debug, Clone)]
pub struct Rotate;

#[async_trait::async_trait]
impl Op for Register {
    type Error = IdentityError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let mut state = ctx.state()?;
        let username = state.username()?.to_string();

        let vault = state.vault()?;
        let pair = match vault.get(&username)? {
            Some(pair) => pair,
            None => vault.generate(&username)?,
        };

        let identity = ctx
            .client
            .call(RegisterRequest {
                username,
                public_key: Some(public_key_of(&pair)?),
            })
            .await?;

        state.config.identity_id = Some(identity.id);
        state.save_config()?;

        Ok(format!("Registered {}", render_identity(&identity)))
    }
}

#[async_trait::async_trait]
impl Op for ProfileRequest {
    type Error = IdentityError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let mut request = self.clone();
        if request.id.is_none() && request.username.is_none() {
            request.id = Some(ctx.client.identity().ok_or(IdentityError::NoSelector)?);
        }
        let identity = ctx.client.call(request).await?;
        Ok(render_identity(&identity))
    }
}

#[async_trait::async_trait]
impl Op for Rotate {
    type Error = IdentityError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let username = state.username()?;

        // Only replace the local pair once the daemon has the new public half
        let pair = KeyPair::generate().map_err(VaultError::from)?;
        let identity = ctx
            .client
            .call(RotateKeyRequest {
                public_key: public_key_of(&pair)?,
            })
            .await?;
        state.vault()?.put(username, &pair)?;

        Ok(format!(
            "Rotated key for {}. Messages sealed to the old key can no longer be read.",
            render_identity(&identity)
        ))
    }
}

#[async_trait::async_trait]
impl Op for DeleteIdentityRequest {
    type Error = IdentityError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let mut state = ctx.state()?;
        let response: DeleteIdentityResponse = ctx.client.call(self.clone()).await?;

        state.config.identity_id = None;
        state.save_config()?;

        Ok(format!(
            "Deleted identity {} with its contacts, tiles and messages",
            response.id
        ))
    }
}

crate::command_enum! {
    (Register, Register),
    (Show, ProfileRequest),
    (Rotate, Rotate),
    (Delete, DeleteIdentityRequest),
}

pub type IdentityCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Identity {
    #[command(subcommand)]
    pub command: IdentityCommand,
}

#[async_trait::async_trait]
impl Op for Identity {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
