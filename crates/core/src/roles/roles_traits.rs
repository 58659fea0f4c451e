use async_trait::async_trait;

use crate::errors::Result;
use crate::roles::roles_model::{InviteeStatus, NewRoleRecord, RoleKind, RoleRecord};

/// Persistence for role records.
#[async_trait]
pub trait RoleRepositoryTrait: Send + Sync {
    fn get(&self, role_id: &str) -> Result<RoleRecord>;
    fn list_for_broadcast(&self, broadcast_id: &str) -> Result<Vec<RoleRecord>>;

    /// Inserts `insert` and deletes `delete_ids` in one transaction.
    async fn apply_changes(
        &self,
        insert: Vec<NewRoleRecord>,
        delete_ids: Vec<String>,
    ) -> Result<Vec<RoleRecord>>;
    /// Sets `is_mail_sent` and `email_status = SENT`.
    async fn mark_email_sent(&self, role_id: &str) -> Result<()>;
    /// Resets the given records to `NOT_SENT`. Returns the number of rows touched.
    async fn reset_email_status(&self, role_ids: Vec<String>) -> Result<usize>;
    async fn set_conference_url(&self, role_id: &str, url: Option<String>) -> Result<()>;
    async fn set_invitee_status(&self, role_id: &str, status: InviteeStatus) -> Result<()>;
    /// Clears the role's sequence ids, then numbers `ordered_ids` from 1.
    async fn reorder(
        &self,
        broadcast_id: &str,
        role: RoleKind,
        ordered_ids: Vec<String>,
    ) -> Result<()>;
}
