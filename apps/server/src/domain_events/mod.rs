//! Domain events runtime bridge for the web server.
//!
//! Receives domain events via DomainEventSink, debounces them, and triggers:
//! - Conference pre-registration for newly launched or extended audiences
//! - Email and in-app notification passes (launch, additions, updates, cancellation)
//! - Stats recomputation for every touched broadcast
//!
//! Failed tasks are retried with backoff while the error is retryable.

mod planner;
mod queue_worker;
mod sink;

pub use queue_worker::RetryPolicy;
pub use sink::WebDomainEventSink;
