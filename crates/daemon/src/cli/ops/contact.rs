use clap::{Args, Subcommand};

use common::types::{ContactList, IdentityId};
use tiletalk_daemon::http_server::api::client::ApiError;
use tiletalk_daemon::http_server::api::v0::contact::{
    AcceptContactRequest, ListContactsRequest, RemoveContactRequest, RequestContactRequest,
};

use crate::cli::op::{Op, OpContext};

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

fn join_ids(ids: &[IdentityId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn render(list: &ContactList) -> String {
    format!(
        "Contacts of {}:\n  authorized: {}\n  pending:    {}\n  incoming:   {}",
        list.user_id,
        join_ids(&list.contacts),
        join_ids(&list.pending),
        join_ids(&list.incoming)
    )
}

#[async_trait::async_trait]
impl Op for RequestContactRequest {
    type Error = ContactError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let list = ctx.client.call(self.clone()).await?;
        Ok(format!(
            "Sent contact request to {}\n{}",
            self.target_id,
            render(&list)
        ))
    }
}

#[async_trait::async_trait]
impl Op for AcceptContactRequest {
    type Error = ContactError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let list = ctx.client.call(self.clone()).await?;
        Ok(format!(
            "Accepted contact request from {}\n{}",
            self.requester_id,
            render(&list)
        ))
    }
}

#[async_trait::async_trait]
impl Op for RemoveContactRequest {
    type Error = ContactError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let list = ctx.client.call(self.clone()).await?;
        Ok(format!("Removed {}\n{}", self.other_id, render(&list)))
    }
}

#[async_trait::async_trait]
impl Op for ListContactsRequest {
    type Error = ContactError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let list = ctx.client.call(self.clone()).await?;
        Ok(render(&list))
    }
}

crate::command_enum! {
    (Request, RequestContactRequest),
    (Accept, AcceptContactRequest),
    (Remove, RemoveContactRequest),
    (List, ListContactsRequest),
}

pub type ContactCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Contact {
    #[command(subcommand)]
    pub command: ContactCommand,
}

#[async_trait::async_trait]
impl Op for Contact {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
