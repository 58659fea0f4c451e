/// Default sender for broadcast emails.
pub const DEFAULT_FROM_ADDRESS: &str = "events@eventcast.local";

/// How long a dispatch pass may hold a broadcast's in-process lease.
pub const DEFAULT_DISPATCH_LEASE_SECS: i64 = 600;

/// Realtime event names.
pub const NOTIFICATION_CREATED_EVENT: &str = "notification:created";
pub const BROADCAST_CHANGED_EVENT: &str = "broadcast:changed";
