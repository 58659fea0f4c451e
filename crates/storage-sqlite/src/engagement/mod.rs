mod model;
mod repository;

pub use model::{AnswerDB, AttendanceDB, QuestionDB};
pub use repository::EngagementRepository;
