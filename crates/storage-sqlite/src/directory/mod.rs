//! SQLite storage implementation for accounts, users, contacts and device tokens.

mod model;
mod repository;

pub use model::{AccountDB, ContactDB, DeviceTokenDB, UserDB};
pub use repository::DirectoryRepository;
