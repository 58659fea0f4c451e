use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::broadcasts::broadcasts_model::{
    Broadcast, BroadcastAttendees, BroadcastKind, BroadcastUpdate, NewBroadcast,
};
use crate::errors::Result;
use crate::roles::{NewRoleRecord, RoleKind, RoleRecord};

/// Persistence for broadcasts.
#[async_trait]
pub trait BroadcastRepositoryTrait: Send + Sync {
    fn get_by_id(&self, broadcast_id: &str) -> Result<Broadcast>;
    fn list(&self, account_id: &str, kind: BroadcastKind) -> Result<Vec<Broadcast>>;

    /// Inserts the broadcast, its role records and an empty stats row together.
    async fn create(&self, broadcast: Broadcast, roles: Vec<NewRoleRecord>) -> Result<Broadcast>;
    /// Persists the editable fields of `broadcast`. Dispatch bookkeeping
    /// (`in_process`, lease, `creator_notified`) is left untouched.
    async fn update(&self, broadcast: Broadcast) -> Result<Broadcast>;
    /// Deletes the broadcast and everything it owns.
    async fn delete(&self, broadcast_id: &str) -> Result<usize>;
    /// Sets `is_cancelled` only if the broadcast is launched and not yet cancelled.
    async fn mark_cancelled(&self, broadcast_id: &str) -> Result<bool>;
    /// Claims the dispatch lease if it is free or expired at `now`.
    async fn claim_dispatch_lease(
        &self,
        broadcast_id: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool>;
    async fn release_dispatch_lease(&self, broadcast_id: &str) -> Result<()>;
    async fn mark_creator_notified(&self, broadcast_id: &str) -> Result<()>;
}

/// Lifecycle operations on broadcasts.
#[async_trait]
pub trait BroadcastServiceTrait: Send + Sync {
    fn get_broadcast(&self, kind: BroadcastKind, broadcast_id: &str) -> Result<Broadcast>;
    fn list_broadcasts(&self, actor_id: &str, kind: BroadcastKind) -> Result<Vec<Broadcast>>;
    fn get_attendees(&self, kind: BroadcastKind, broadcast_id: &str)
        -> Result<BroadcastAttendees>;

    async fn create_broadcast(&self, actor_id: &str, new_broadcast: NewBroadcast)
        -> Result<Broadcast>;
    async fn update_broadcast(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        update: BroadcastUpdate,
    ) -> Result<Broadcast>;
    async fn cancel_broadcast(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<Broadcast>;
    async fn delete_broadcast(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<()>;
    /// Re-arms launch emails for the given records (all when `None`).
    async fn resend_invitations(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        role_ids: Option<Vec<String>>,
    ) -> Result<usize>;
    async fn register_invitee(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<RoleRecord>;
    async fn deregister_invitee(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
    ) -> Result<RoleRecord>;
    async fn reorder(
        &self,
        actor_id: &str,
        kind: BroadcastKind,
        broadcast_id: &str,
        role: RoleKind,
        ordered_ids: Vec<String>,
    ) -> Result<BroadcastAttendees>;
}
