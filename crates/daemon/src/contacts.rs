//! The contact graph
//!
//! Each unordered pair of identities is `Unrelated`, `Pending(requester ->
//! target)` or `Authorized`. Only the target of a pending edge can authorize
//! it. Either side can remove the edge at any time.
//!
//! Grid access is decided here and nowhere else: [`ContactGraph::can_access`]
//! answers who may read and write a grid, and [`ContactGraph::audience`] lists
//! who gets told about changes to it. Both derive from the same authorized
//! edge set.

use common::types::{ContactList, IdentityId};

use crate::database::models::{ContactEdge, Identity};
use crate::database::{is_unique_violation, Database};
use crate::error::ServiceError;

/// Default cap on authorized contacts per identity
pub const DEFAULT_MAX_CONTACTS: i64 = 20;

#[derive(Debug, Clone)]
pub struct ContactGraph {
    db: Database,
    max_contacts: i64,
}

impl ContactGraph {
    pub fn new(db: Database, max_contacts: i64) -> Self {
        Self { db, max_contacts }
    }

    pub fn max_contacts(&self) -> i64 {
        self.max_contacts
    }

    /// Open a pending edge `requester -> target`
    pub async fn request(
        &self,
        requester: IdentityId,
        target: IdentityId,
    ) -> Result<(), ServiceError> {
        if requester == target {
            return Err(ServiceError::Conflict(
                "cannot add yourself as a contact".into(),
            ));
        }
        if !Identity::exists(target, &self.db).await? {
            return Err(ServiceError::NotFound(format!("identity {} not found", target)));
        }
        if ContactEdge::between(requester, target, &self.db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "a contact edge already exists between these identities".into(),
            ));
        }

        match ContactEdge::insert_pending(requester, target, self.max_contacts, &self.db).await {
            Ok(Some(_)) => {
                tracing::info!(requester, target, "contact requested");
                Ok(())
            }
            Ok(None) => Err(ServiceError::CapacityExceeded(format!(
                "identity {} already has {} contacts",
                requester, self.max_contacts
            ))),
            // Lost a race with a concurrent request for the same pair
            Err(e) if is_unique_violation(&e) => Err(ServiceError::Conflict(
                "a contact edge already exists between these identities".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Authorize the pending edge `requester -> target`, called by `target`
    pub async fn accept(
        &self,
        target: IdentityId,
        requester: IdentityId,
    ) -> Result<(), ServiceError> {
        if ContactEdge::authorize(requester, target, self.max_contacts, &self.db).await? {
            tracing::info!(requester, target, "contact accepted");
            return Ok(());
        }

        // Nothing flipped: either there is no such pending edge or the cap held it back
        match ContactEdge::between(requester, target, &self.db).await? {
            Some(edge)
                if edge.requester_id == requester
                    && edge.target_id == target
                    && !*edge.authorized =>
            {
                Err(ServiceError::CapacityExceeded(format!(
                    "identity {} already has {} contacts",
                    target, self.max_contacts
                )))
            }
            _ => Err(ServiceError::NotFound("contact request not found".into())),
        }
    }

    /// Drop whatever edge joins the pair. Absent edges are fine.
    pub async fn remove(&self, caller: IdentityId, other: IdentityId) -> Result<(), ServiceError> {
        let removed = ContactEdge::delete_between(caller, other, &self.db).await?;
        tracing::info!(caller, other, removed, "contact removed");
        Ok(())
    }

    /// Split every edge touching `identity` into authorized, outgoing and incoming
    pub async fn list_for(&self, identity: IdentityId) -> Result<ContactList, ServiceError> {
        let mut list = ContactList {
            user_id: identity,
            ..Default::default()
        };

        for edge in ContactEdge::touching(identity, &self.db).await? {
            let outgoing = edge.requester_id == identity;
            let other = if outgoing {
                edge.target_id
            } else {
                edge.requester_id
            };
            match (*edge.authorized, outgoing) {
                (true, _) => list.contacts.push(other),
                (false, true) => list.pending.push(other),
                (false, false) => list.incoming.push(other),
            }
        }

        Ok(list)
    }

    pub async fn authorized_contacts(
        &self,
        identity: IdentityId,
    ) -> Result<Vec<IdentityId>, ServiceError> {
        Ok(ContactEdge::authorized_contacts(identity, &self.db).await?)
    }

    /// Whether `caller` may read and write `owner`'s grid
    pub async fn can_access(
        &self,
        owner: IdentityId,
        caller: IdentityId,
    ) -> Result<bool, ServiceError> {
        if owner == caller {
            return Ok(true);
        }
        Ok(ContactEdge::is_authorized_pair(owner, caller, &self.db).await?)
    }

    /// Fails with AuthorizationDenied unless [`ContactGraph::can_access`] holds
    pub async fn ensure_access(
        &self,
        owner: IdentityId,
        caller: IdentityId,
    ) -> Result<(), ServiceError> {
        if self.can_access(owner, caller).await? {
            Ok(())
        } else {
            tracing::warn!(owner, caller, "grid access denied");
            Err(ServiceError::denied())
        }
    }

    /// Everyone entitled to `owner`'s grid: the owner plus their authorized contacts
    pub async fn audience(&self, owner: IdentityId) -> Result<Vec<IdentityId>, ServiceError> {
        let mut audience = self.authorized_contacts(owner).await?;
        audience.push(owner);
        Ok(audience)
    }
}
