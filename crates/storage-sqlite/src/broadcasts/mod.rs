mod model;
mod repository;

pub use model::{BroadcastChangesDB, BroadcastDB};
pub use repository::BroadcastRepository;
