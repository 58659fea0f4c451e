//! Dispatch tracker - idempotent per-recipient email and notification delivery.

mod dispatch_model;
mod dispatch_service;
mod dispatch_templates;
mod dispatch_traits;


pub use dispatch_model::{
    CalendarInvite, CalendarMethod, DispatchReport, DispatchScope, DispatchSettings,
    DispatchVariant, EmailAttachment, MailCredentials, NewNotification, NotificationRecord,
    OutboundEmail, PushMessage, RealtimeEvent, Recipient,
};
pub use dispatch_service::DispatchService;
pub use dispatch_traits::{
    DispatchServiceTrait, MailTransportTrait, NotificationRepositoryTrait, PushGatewayTrait,
    RealtimePublisherTrait, UnsubscribeRepositoryTrait,
};
