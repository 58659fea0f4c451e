//! Role records - per-broadcast membership of hosts, participants, invitees and RSVPs.

mod roles_model;
mod roles_traits;

pub use roles_model::{
    EmailStatus, Holder, HolderKey, InviteeStatus, NewRoleRecord, RoleKind, RoleOrigin,
    RoleRecord,
};
pub use roles_traits::RoleRepositoryTrait;
