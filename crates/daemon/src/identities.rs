//! The identity directory: usernames and published public keys
//!
//! Senders look up recipients' keys here when composing. Private keys never
//! reach the server.

use common::crypto::PublicKey;
use common::types::IdentityId;

use crate::database::models::Identity;
use crate::database::{is_unique_violation, Database};
use crate::error::ServiceError;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;

#[derive(Debug, Clone)]
pub struct IdentityDirectory {
    db: Database,
}

fn check_username(username: &str) -> Result<(), ServiceError> {
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(ServiceError::OutOfBounds(format!(
            "username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ServiceError::OutOfBounds(
            "username must contain only letters and numbers".into(),
        ));
    }
    Ok(())
}

fn check_public_key(public_key: &str) -> Result<(), ServiceError> {
    PublicKey::from_base64(public_key)
        .map(|_| ())
        .map_err(|e| ServiceError::OutOfBounds(format!("unusable public key: {}", e)))
}

impl IdentityDirectory {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn register(
        &self,
        username: &str,
        public_key: Option<&str>,
    ) -> Result<Identity, ServiceError> {
        let username = username.trim();
        check_username(username)?;
        if let Some(key) = public_key {
            check_public_key(key)?;
        }

        match Identity::create(username, public_key, &self.db).await {
            Ok(identity) => {
                tracing::info!(id = identity.id, username, "identity registered");
                Ok(identity)
            }
            Err(e) if is_unique_violation(&e) => Err(ServiceError::Conflict(format!(
                "username {} is already registered",
                username
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: IdentityId) -> Result<Identity, ServiceError> {
        Identity::get(id, &self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("identity {} not found", id)))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Identity, ServiceError> {
        Identity::get_by_username(username, &self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("identity {} not found", username)))
    }

    pub async fn exists(&self, id: IdentityId) -> Result<bool, ServiceError> {
        Ok(Identity::exists(id, &self.db).await?)
    }

    /// Replace the caller's own published key
    pub async fn rotate_key(
        &self,
        caller: IdentityId,
        public_key: &str,
    ) -> Result<Identity, ServiceError> {
        check_public_key(public_key)?;
        if !Identity::set_public_key(caller, public_key, &self.db).await? {
            return Err(ServiceError::NotFound(format!(
                "identity {} not found",
                caller
            )));
        }
        tracing::info!(id = caller, "public key rotated");
        self.get(caller).await
    }

    /// Remove the caller and everything that hangs off them
    pub async fn delete(&self, caller: IdentityId) -> Result<(), ServiceError> {
        if !Identity::delete(caller, &self.db).await? {
            return Err(ServiceError::NotFound(format!(
                "identity {} not found",
                caller
            )));
        }
        tracing::info!(id = caller, "identity deleted");
        Ok(())
    }
}
