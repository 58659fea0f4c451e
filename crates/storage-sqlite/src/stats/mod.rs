mod model;
mod repository;

pub use model::BroadcastStatsDB;
pub use repository::StatsRepository;
