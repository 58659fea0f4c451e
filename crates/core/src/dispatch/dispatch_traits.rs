use async_trait::async_trait;

use crate::broadcasts::BroadcastKind;
use crate::dispatch::dispatch_model::{
    DispatchReport, DispatchScope, DispatchVariant, NewNotification, NotificationRecord,
    OutboundEmail, PushMessage, RealtimeEvent,
};
use crate::errors::Result;

/// Outbound email transport.
#[async_trait]
pub trait MailTransportTrait: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

/// Mobile push gateway.
#[async_trait]
pub trait PushGatewayTrait: Send + Sync {
    async fn push(&self, message: &PushMessage) -> Result<()>;
}

/// Realtime fan-out to connected clients. Must not block.
pub trait RealtimePublisherTrait: Send + Sync {
    fn publish(&self, event: RealtimeEvent);
}

#[async_trait]
pub trait NotificationRepositoryTrait: Send + Sync {
    fn list_for_user(&self, user_id: &str) -> Result<Vec<NotificationRecord>>;
    /// Inserts the notification and increments the recipient's unread counter
    /// in one transaction. Returns the record and the new counter value.
    async fn create_and_increment(
        &self,
        notification: NewNotification,
    ) -> Result<(NotificationRecord, i64)>;
}

/// Registry of (email, broadcast kind) opt-outs.
#[async_trait]
pub trait UnsubscribeRepositoryTrait: Send + Sync {
    fn is_unsubscribed(&self, email: &str, kind: BroadcastKind) -> Result<bool>;
    async fn unsubscribe(&self, email: &str, kind: BroadcastKind) -> Result<()>;
    async fn resubscribe(&self, email: &str, kind: BroadcastKind) -> Result<()>;
}

/// Per-recipient email and notification delivery for broadcasts.
#[async_trait]
pub trait DispatchServiceTrait: Send + Sync {
    /// Runs one email pass under the broadcast's dispatch lease.
    async fn send_emails(
        &self,
        broadcast_id: &str,
        variant: DispatchVariant,
        scope: DispatchScope,
    ) -> Result<DispatchReport>;
    /// Fans out in-app notifications to internal recipients.
    async fn notify(
        &self,
        broadcast_id: &str,
        variant: DispatchVariant,
        scope: DispatchScope,
    ) -> Result<DispatchReport>;
}
