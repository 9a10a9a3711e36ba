use clap::{Args, Subcommand};
use futures::future::join_all;

use common::crypto::{compose, compose_audience, ComposeError, PrivateKey, PublicKey, Recipient};
use common::types::IdentityId;
use common::vault::{KeyVault, VaultError};
use tiletalk_daemon::database::models::ReceivedMessage;
use tiletalk_daemon::http_server::api::client::{ApiClient, ApiError};
use tiletalk_daemon::http_server::api::v0::contact::ListContactsRequest;
use tiletalk_daemon::http_server::api::v0::identity::ProfileRequest;
use tiletalk_daemon::http_server::api::v0::message::{
    CreateMessageRequest, DeleteMessageRequest, ReadMessagesRequest,
};
use tiletalk_daemon::state::StateError;

use crate::cli::op::{Op, OpContext};

/// Shown in place of a message this identity cannot open
pub const UNREADABLE_PLACEHOLDER: &str = "[unreadable message]";

#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
    #[error("{0}")]
    Compose(#[from] ComposeError),
}

/// Write a message on a tile, sealed for everyone entitled to read it
#[derive(Args, Debug, Clone)]
pub struct SendMessage {
    /// Grid owner
    #[arg(long)]
    pub owner: IdentityId,
    #[arg(short = 'x', long = "x")]
    pub x: i64,
    #[arg(short = 'y', long = "y")]
    pub y: i64,
    #[arg(long)]
    pub text: String,
}

/// Read and decrypt the messages on a tile
#[derive(Args, Debug, Clone)]
pub struct ReadMessages {
    /// Grid owner
    #[arg(long)]
    pub owner: IdentityId,
    #[arg(short = 'x', long = "x")]
    pub x: i64,
    #[arg(short = 'y', long = "y")]
    pub y: i64,
}

/// Look up each audience member's published key concurrently
///
/// Anyone whose profile cannot be fetched or whose key does not parse is
/// treated as keyless and skipped by the composer.
async fn resolve_recipients(client: &ApiClient, audience: &[IdentityId]) -> Vec<Recipient> {
    let lookups = audience.iter().map(|&id| async move {
        let public_key = match client
            .call(ProfileRequest {
                id: Some(id),
                username: None,
            })
            .await
        {
            Ok(profile) => profile
                .public_key
                .as_deref()
                .and_then(|key| PublicKey::from_base64(key).ok()),
            Err(e) => {
                tracing::warn!(recipient = id, error = %e, "could not fetch recipient key");
                None
            }
        };
        Recipient { id, public_key }
    });
    join_all(lookups).await
}

/// Decrypt each message, substituting a placeholder for any that fail
pub(crate) fn open_messages(messages: &[ReceivedMessage], private: &PrivateKey) -> Vec<String> {
    messages
        .iter()
        .map(|message| {
            let text = message
                .payload
                .open_text(private)
                .unwrap_or_else(|_| UNREADABLE_PLACEHOLDER.to_string());
            format!(
                "[{}] {}{}: {}",
                message.created_at,
                message.responder_id,
                if message.seen { "" } else { " (new)" },
                text
            )
        })
        .collect()
}

#[async_trait::async_trait]
impl Op for SendMessage {
    type Error = MessageError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let sender = state.identity_id()?;

        let contacts = ctx.client.call(ListContactsRequest {}).await?;
        let audience = compose_audience(&contacts.contacts, self.owner, sender);
        let recipients = resolve_recipients(&ctx.client, &audience).await;
        let message_set = compose(self.text.as_bytes(), &recipients, self.owner, sender)?;
        let sealed_for = message_set.len();

        let response = ctx
            .client
            .call(CreateMessageRequest {
                owner_id: self.owner,
                x_coord: self.x,
                y_coord: self.y,
                message_set,
            })
            .await?;

        Ok(format!(
            "Sent message {} to ({}, {}) on grid {}, sealed for {} of {} recipients",
            response.id,
            self.x,
            self.y,
            self.owner,
            sealed_for,
            audience.len()
        ))
    }
}

#[async_trait::async_trait]
impl Op for ReadMessages {
    type Error = MessageError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let pair = state.vault()?.require(state.username()?)?;

        let messages = ctx
            .client
            .call(ReadMessagesRequest {
                owner_id: self.owner,
                x_coord: self.x,
                y_coord: self.y,
            })
            .await?;

        if messages.is_empty() {
            return Ok("No messages".to_string());
        }
        Ok(open_messages(&messages, &pair.private).join("\n"))
    }
}

#[async_trait::async_trait]
impl Op for DeleteMessageRequest {
    type Error = MessageError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.clone()).await?;
        Ok(format!(
            "Deleted your message at ({}, {}) on grid {}",
            response.x_coord, response.y_coord, response.owner_id
        ))
    }
}

crate::command_enum! {
    (Send, SendMessage),
    (Read, ReadMessages),
    (Delete, DeleteMessageRequest),
}

pub type MessageCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Message {
    #[command(subcommand)]
    pub command: MessageCommand,
}

#[async_trait::async_trait]
impl Op for Message {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
