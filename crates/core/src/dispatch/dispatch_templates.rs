//! Message content for broadcast emails and notifications.

use chrono::{DateTime, Utc};

use super::dispatch_model::{
    CalendarInvite, CalendarMethod, DispatchSettings, DispatchVariant, EmailAttachment,
    OutboundEmail, Recipient,
};
use crate::broadcasts::Broadcast;
use crate::roles::RoleKind;
use crate::users::User;

const ICS_FILENAME: &str = "invite.ics";

fn when(broadcast: &Broadcast) -> String {
    format!(
        "{} to {} UTC",
        fmt_time(broadcast.start_at),
        broadcast.end_at.format("%H:%M")
    )
}

fn fmt_time(at: DateTime<Utc>) -> String {
    at.format("%A, %B %-d %Y %H:%M").to_string()
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub(crate) fn subject(broadcast: &Broadcast, variant: DispatchVariant) -> String {
    let label = broadcast.kind.label();
    match variant {
        DispatchVariant::Launch => format!("You're invited to the {}: {}", label, broadcast.title),
        DispatchVariant::InviteeAdded => {
            format!("You've been added to the {}: {}", label, broadcast.title)
        }
        DispatchVariant::Update => format!("{} updated: {}", label, broadcast.title),
        DispatchVariant::Cancel => format!("{} cancelled: {}", label, broadcast.title),
    }
}

fn join_link<'a>(broadcast: &'a Broadcast, recipient: &'a Recipient) -> Option<&'a str> {
    if recipient.role == RoleKind::Host {
        if let Some(url) = broadcast.presenter_url.as_deref() {
            return Some(url);
        }
    }
    recipient
        .conference_url
        .as_deref()
        .or(broadcast.join_url.as_deref())
}

fn body_lines(broadcast: &Broadcast, variant: DispatchVariant, recipient: &Recipient) -> Vec<String> {
    let label = broadcast.kind.label().to_lowercase();
    let greeting = match &recipient.name {
        Some(name) => format!("Hi {},", name),
        None => "Hi,".to_string(),
    };
    let role = match recipient.role {
        RoleKind::Host => "a host",
        RoleKind::Participant => "a participant",
        RoleKind::Invitee => "an invitee",
        RoleKind::Rsvp => "an attendee",
    };

    let mut lines = vec![greeting, String::new()];
    match variant {
        DispatchVariant::Launch | DispatchVariant::InviteeAdded => lines.push(format!(
            "You have been added as {} of the {} \"{}\".",
            role, label, broadcast.title
        )),
        DispatchVariant::Update => lines.push(format!(
            "The {} \"{}\" has been updated.",
            label, broadcast.title
        )),
        DispatchVariant::Cancel => lines.push(format!(
            "The {} \"{}\" has been cancelled.",
            label, broadcast.title
        )),
    }
    lines.push(format!("When: {}", when(broadcast)));
    if let Some(description) = &broadcast.description {
        lines.push(String::new());
        lines.push(description.clone());
    }
    if variant != DispatchVariant::Cancel {
        if let Some(link) = join_link(broadcast, recipient) {
            lines.push(String::new());
            lines.push(format!("Join: {}", link));
        }
        if !broadcast.files.is_empty() {
            lines.push(String::new());
            lines.push("Files:".to_string());
            for file in &broadcast.files {
                lines.push(format!("- {} ({})", file.name, file.url));
            }
        }
    }
    lines
}

fn html_from_lines(lines: &[String]) -> String {
    let body: Vec<String> = lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                "<br/>".to_string()
            } else {
                format!("<p>{}</p>", html_escape(line))
            }
        })
        .collect();
    format!("<html><body>{}</body></html>", body.join(""))
}

fn calendar(
    broadcast: &Broadcast,
    variant: DispatchVariant,
    attendee_email: &str,
    settings: &DispatchSettings,
    organizer: Option<&User>,
) -> CalendarInvite {
    CalendarInvite {
        method: if variant == DispatchVariant::Cancel {
            CalendarMethod::Cancel
        } else {
            CalendarMethod::Request
        },
        uid: format!("{}@eventcast", broadcast.id),
        sequence: broadcast.updated_at.timestamp(),
        summary: broadcast.title.clone(),
        description: broadcast.description.clone(),
        start_at: broadcast.start_at,
        end_at: broadcast.end_at,
        location: broadcast.join_url.clone(),
        organizer_email: organizer
            .map(|u| u.email.clone())
            .unwrap_or_else(|| settings.from_address.clone()),
        organizer_name: organizer.map(User::display_name),
        attendee_email: attendee_email.to_string(),
        stamp: Utc::now(),
    }
}

fn with_invite(mut email: OutboundEmail, invite: CalendarInvite) -> OutboundEmail {
    email.attachments.push(EmailAttachment {
        filename: ICS_FILENAME.to_string(),
        content_type: invite.content_type(),
        content: invite.to_ics().into_bytes(),
    });
    email.calendar = Some(invite);
    email
}

/// Builds the email for one recipient of a dispatch batch.
pub(crate) fn compose_email(
    broadcast: &Broadcast,
    variant: DispatchVariant,
    recipient: &Recipient,
    settings: &DispatchSettings,
    organizer: Option<&User>,
) -> OutboundEmail {
    let lines = body_lines(broadcast, variant, recipient);
    let email = OutboundEmail {
        subject: subject(broadcast, variant),
        from: settings.from_address.clone(),
        to: recipient.email.clone(),
        cc: broadcast.cc_emails.clone(),
        text_body: lines.join("\n"),
        html_body: Some(html_from_lines(&lines)),
        attachments: Vec::new(),
        calendar: None,
        credentials: settings.credentials.clone(),
    };
    let invite = calendar(broadcast, variant, &recipient.email, settings, organizer);
    with_invite(email, invite)
}

/// Confirmation to the creator that their broadcast went live.
pub(crate) fn compose_creator_email(
    broadcast: &Broadcast,
    creator: &User,
    settings: &DispatchSettings,
) -> OutboundEmail {
    let label = broadcast.kind.label();
    let mut lines = vec![
        format!("Hi {},", creator.display_name()),
        String::new(),
        format!("Your {} \"{}\" is live.", label.to_lowercase(), broadcast.title),
        format!("When: {}", when(broadcast)),
    ];
    if let Some(url) = &broadcast.admin_url {
        lines.push(format!("Manage: {}", url));
    }
    if let Some(url) = &broadcast.presenter_url {
        lines.push(format!("Present: {}", url));
    }
    OutboundEmail {
        subject: format!("Your {} is live: {}", label, broadcast.title),
        from: settings.from_address.clone(),
        to: creator.email.clone(),
        cc: Vec::new(),
        text_body: lines.join("\n"),
        html_body: Some(html_from_lines(&lines)),
        attachments: Vec::new(),
        calendar: None,
        credentials: settings.credentials.clone(),
    }
}

/// Title and body of an in-app notification.
pub(crate) fn notification_text(broadcast: &Broadcast, variant: DispatchVariant) -> (String, String) {
    let label = broadcast.kind.label();
    let body = match variant {
        DispatchVariant::Launch => format!("You're invited to \"{}\" on {}", broadcast.title, when(broadcast)),
        DispatchVariant::InviteeAdded => {
            format!("You've been added to \"{}\" on {}", broadcast.title, when(broadcast))
        }
        DispatchVariant::Update => format!("\"{}\" now takes place {}", broadcast.title, when(broadcast)),
        DispatchVariant::Cancel => format!("\"{}\" has been cancelled", broadcast.title),
    };
    let title = match variant {
        DispatchVariant::Launch | DispatchVariant::InviteeAdded => format!("New {}", label),
        DispatchVariant::Update => format!("{} updated", label),
        DispatchVariant::Cancel => format!("{} cancelled", label),
    };
    (title, body)
}
