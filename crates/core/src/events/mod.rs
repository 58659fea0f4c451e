//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events after
//! successful broadcast mutations. The server implements the sink to queue
//! events for its background worker.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
