use async_trait::async_trait;

use crate::errors::Result;
use crate::users::users_model::{Account, ContactStatus, NewUser, User};

/// Lookup of accounts, users and their contact relationships.
#[async_trait]
pub trait DirectoryRepositoryTrait: Send + Sync {
    fn get_account(&self, account_id: &str) -> Result<Account>;
    fn get_user(&self, user_id: &str) -> Result<User>;
    /// Returns the users among `user_ids` that exist; unknown ids are omitted.
    fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>>;
    /// Returns the ids among `candidate_ids` linked to `user_id` with the given status,
    /// in either direction of the link.
    fn get_linked_contact_ids(
        &self,
        user_id: &str,
        candidate_ids: &[String],
        status: ContactStatus,
    ) -> Result<Vec<String>>;
    fn get_device_tokens(&self, user_id: &str) -> Result<Vec<String>>;

    async fn create_account(&self, account: Account) -> Result<Account>;
    async fn create_user(&self, new_user: NewUser) -> Result<User>;
    async fn link_contact(
        &self,
        owner_id: &str,
        contact_id: &str,
        status: ContactStatus,
    ) -> Result<()>;
    async fn add_device_token(&self, user_id: &str, token: &str) -> Result<()>;
}
