//! Broadcasts module - the webcast/webinar aggregate and its lifecycle.
//!
//! A broadcast moves `draft -> launched -> cancelled`. Launching is gated on
//! the conferencing provider; failed external calls leave the state unchanged.

mod broadcasts_model;
mod broadcasts_service;
mod broadcasts_traits;


pub use broadcasts_model::{
    Broadcast, BroadcastAttendees, BroadcastKind, BroadcastState, BroadcastUpdate, FileRef,
    NewBroadcast, Visibility,
};
pub use broadcasts_service::BroadcastService;
pub use broadcasts_traits::{BroadcastRepositoryTrait, BroadcastServiceTrait};
