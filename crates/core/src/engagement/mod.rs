//! Engagement - attendance, ratings and Q&A that feed broadcast stats.

mod engagement_model;
mod engagement_service;
mod engagement_traits;

#[cfg(test)]
mod engagement_service_tests;

pub use engagement_model::{Answer, Attendance, NewAnswer, NewQuestion, Question};
pub use engagement_service::EngagementService;
pub use engagement_traits::{EngagementRepositoryTrait, EngagementServiceTrait};
