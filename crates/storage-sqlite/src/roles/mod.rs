mod model;
mod repository;

pub use model::RoleRecordDB;
pub use repository::RoleRepository;
