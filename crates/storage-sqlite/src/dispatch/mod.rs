mod model;
mod repository;

pub use model::{NotificationDB, UnsubscribeDB};
pub use repository::{NotificationRepository, UnsubscribeRepository};
