use std::path::PathBuf;

use clap::{Args, Subcommand};

use common::vault::{export_portable, import_portable, KeyVault, VaultError};
use tiletalk_daemon::state::StateError;

use crate::cli::op::{Op, OpContext};

#[derive(Debug, thiserror::Error)]
pub enum KeysError {
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Generate a fresh local key pair, replacing the current one
///
/// The daemon keeps the old public key until `identity rotate` or a
/// re-register uploads the new one.
#[derive(Args, Debug, Clone)]
pub struct Generate;

/// Print the local public key
#[derive(Args, Debug, Clone)]
pub struct Show;

/// Write the key pair to a portable backup file
#[derive(Args, Debug, Clone)]
pub struct Export {
    #[arg(long)]
    pub out: PathBuf,
}

/// Load a key pair from a portable backup file
#[derive(Args, Debug, Clone)]
pub struct Import {
    #[arg(long)]
    pub file: PathBuf,
}

#[async_trait::async_trait]
impl Op for Generate {
    type Error = KeysError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let username = state.username()?;
        let pair = state.vault()?.generate(username)?;
        Ok(format!(
            "Generated a new key pair for {}\n{}",
            username,
            pair.public.to_base64().map_err(VaultError::from)?
        ))
    }
}

#[async_trait::async_trait]
impl Op for Show {
    type Error = KeysError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let pair = state.vault()?.require(state.username()?)?;
        Ok(pair.public.to_base64().map_err(VaultError::from)?)
    }
}

#[async_trait::async_trait]
impl Op for Export {
    type Error = KeysError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let pair = state.vault()?.require(state.username()?)?;
        std::fs::write(&self.out, export_portable(&pair)?)?;
        Ok(format!(
            "Exported key pair to {}. Anyone holding this file can read your messages.",
            self.out.display()
        ))
    }
}

#[async_trait::async_trait]
impl Op for Import {
    type Error = KeysError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let username = state.username()?;
        let pair = import_portable(&std::fs::read(&self.file)?)?;
        state.vault()?.put(username, &pair)?;
        Ok(format!("Imported key pair for {}", username))
    }
}

crate::command_enum! {
    (Generate, Generate),
    (Show, Show),
    (Export, Export),
    (Import, Import),
}

pub type KeysCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Keys {
    #[command(subcommand)]
    pub command: KeysCommand,
}

#[async_trait::async_trait]
impl Op for Keys {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
