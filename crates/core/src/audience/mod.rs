//! Audience resolution - turns a requested audience into deduplicated role members.

mod audience_model;
mod audience_resolver;


pub use audience_model::{AudienceDiff, AudienceMember, AudienceRequest, ExternalGuest, ResolvedAudience};
pub use audience_resolver::{diff_audience, AudienceResolver};
