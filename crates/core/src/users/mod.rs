//! Users module - accounts, users and the contact directory.

mod users_model;
mod users_traits;

pub use users_model::{Account, ContactStatus, NewUser, User};
pub use users_traits::DirectoryRepositoryTrait;
