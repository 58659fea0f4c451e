//! In-memory collaborators shared by the service tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::audience::{AudienceMember, AudienceRequest};
use crate::broadcasts::{
    Broadcast, BroadcastKind, BroadcastRepositoryTrait, BroadcastService, NewBroadcast,
};
use crate::conference::{
    ConferenceDetails, ConferencePayload, ConferenceProviderTrait, ConferenceSyncService,
    Registrant,
};
use crate::dispatch::{
    DispatchService, DispatchSettings, MailTransportTrait, NewNotification,
    NotificationRecord, NotificationRepositoryTrait, OutboundEmail, PushGatewayTrait,
    PushMessage, RealtimeEvent, RealtimePublisherTrait, UnsubscribeRepositoryTrait,
};
use crate::engagement::{Answer, Attendance, EngagementRepositoryTrait, EngagementService, Question};
use crate::errors::{DatabaseError, Error, ProviderFailure, Result};
use crate::events::MockDomainEventSink;
use crate::roles::{
    EmailStatus, InviteeStatus, NewRoleRecord, RoleKind, RoleRecord, RoleRepositoryTrait,
};
use crate::stats::{BroadcastStats, StatsRepositoryTrait, StatsService};
use crate::users::{Account, ContactStatus, DirectoryRepositoryTrait, NewUser, User};

fn not_found(what: &str, id: &str) -> Error {
    Error::Database(DatabaseError::NotFound(format!("{} {}", what, id)))
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    users: Vec<User>,
    contacts: Vec<(String, String, ContactStatus)>,
    device_tokens: Vec<(String, String)>,
    broadcasts: Vec<Broadcast>,
    roles: Vec<RoleRecord>,
    stats: HashMap<String, BroadcastStats>,
    attendance: Vec<Attendance>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    notifications: Vec<NotificationRecord>,
    unsubscribes: HashSet<(String, BroadcastKind)>,
}

/// One in-memory store implementing every repository trait.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, id: &str, primary: Option<&str>) {
        self.state.lock().unwrap().accounts.insert(
            id.to_string(),
            Account {
                id: id.to_string(),
                name: id.to_string(),
                primary_account_id: primary.map(str::to_string),
            },
        );
    }

    pub fn add_user(&self, id: &str, account_id: &str, email: &str) -> User {
        let user = User {
            id: id.to_string(),
            account_id: account_id.to_string(),
            email: email.to_string(),
            first_name: id.to_uppercase(),
            last_name: "Tester".to_string(),
            unread_notifications: 0,
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn add_contact(&self, owner: &str, contact: &str, status: ContactStatus) {
        self.state
            .lock()
            .unwrap()
            .contacts
            .push((owner.to_string(), contact.to_string(), status));
    }

    pub fn add_token(&self, user_id: &str, token: &str) {
        self.state
            .lock()
            .unwrap()
            .device_tokens
            .push((user_id.to_string(), token.to_string()));
    }

    pub fn broadcast_count(&self) -> usize {
        self.state.lock().unwrap().broadcasts.len()
    }

    pub fn role_count(&self) -> usize {
        self.state.lock().unwrap().roles.len()
    }

    pub fn stats_count(&self) -> usize {
        self.state.lock().unwrap().stats.len()
    }

    pub fn roles_of(&self, broadcast_id: &str) -> Vec<RoleRecord> {
        self.state
            .lock()
            .unwrap()
            .roles
            .iter()
            .filter(|r| r.broadcast_id == broadcast_id)
            .cloned()
            .collect()
    }

    pub fn unread(&self, user_id: &str) -> i64 {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.unread_notifications)
            .unwrap_or_default()
    }

    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn mark_all_sent(&self, broadcast_id: &str) {
        let mut state = self.state.lock().unwrap();
        for r in state
            .roles
            .iter_mut()
            .filter(|r| r.broadcast_id == broadcast_id)
        {
            r.is_mail_sent = true;
            r.email_status = EmailStatus::Sent;
        }
    }

    pub fn set_lease(&self, broadcast_id: &str, expires_at: Option<DateTime<Utc>>) {
        let mut state = self.state.lock().unwrap();
        if let Some(b) = state.broadcasts.iter_mut().find(|b| b.id == broadcast_id) {
            b.in_process = expires_at.is_some();
            b.lease_expires_at = expires_at;
        }
    }
}

#[async_trait]
impl DirectoryRepositoryTrait for InMemoryStore {
    fn get_account(&self, account_id: &str) -> Result<Account> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| not_found("Account", account_id))
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| not_found("User", user_id))
    }

    fn get_users_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    fn get_linked_contact_ids(
        &self,
        user_id: &str,
        candidate_ids: &[String],
        status: ContactStatus,
    ) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        Ok(candidate_ids
            .iter()
            .filter(|candidate| {
                state.contacts.iter().any(|(owner, contact, s)| {
                    *s == status
                        && ((owner == user_id && contact == *candidate)
                            || (contact == user_id && owner == *candidate))
                })
            })
            .cloned()
            .collect())
    }

    fn get_device_tokens(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .device_tokens
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn create_account(&self, account: Account) -> Result<Account> {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let user = User {
            id: new_user.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            account_id: new_user.account_id,
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            unread_notifications: 0,
        };
        self.state.lock().unwrap().users.push(user.clone());
        Ok(user)
    }

    async fn link_contact(
        &self,
        owner_id: &str,
        contact_id: &str,
        status: ContactStatus,
    ) -> Result<()> {
        self.add_contact(owner_id, contact_id, status);
        Ok(())
    }

    async fn add_device_token(&self, user_id: &str, token: &str) -> Result<()> {
        self.add_token(user_id, token);
        Ok(())
    }
}

fn materialize(record: NewRoleRecord) -> RoleRecord {
    RoleRecord {
        id: Uuid::new_v4().to_string(),
        broadcast_id: record.broadcast_id,
        role: record.role,
        holder: record.holder,
        origin: record.origin,
        sequence_id: record.sequence_id,
        is_mail_sent: false,
        email_status: EmailStatus::NotSent,
        conference_url: None,
        invitee_status: record.invitee_status,
        created_at: Utc::now(),
    }
}

fn check_unique(existing: &[RoleRecord], record: &RoleRecord) -> Result<()> {
    let clash = existing.iter().any(|r| {
        r.broadcast_id == record.broadcast_id
            && r.role == record.role
            && (r.holder.key() == record.holder.key()
                || (record.sequence_id.is_some() && r.sequence_id == record.sequence_id))
    });
    if clash {
        return Err(Error::Database(DatabaseError::UniqueViolation(format!(
            "role record {} in {}",
            record.role, record.broadcast_id
        ))));
    }
    Ok(())
}

#[async_trait]
impl BroadcastRepositoryTrait for InMemoryStore {
    fn get_by_id(&self, broadcast_id: &str) -> Result<Broadcast> {
        self.state
            .lock()
            .unwrap()
            .broadcasts
            .iter()
            .find(|b| b.id == broadcast_id)
            .cloned()
            .ok_or_else(|| not_found("Broadcast", broadcast_id))
    }

    fn list(&self, account_id: &str, kind: BroadcastKind) -> Result<Vec<Broadcast>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .broadcasts
            .iter()
            .filter(|b| b.account_id == account_id && b.kind == kind)
            .cloned()
            .collect())
    }

    async fn create(&self, broadcast: Broadcast, roles: Vec<NewRoleRecord>) -> Result<Broadcast> {
        let mut state = self.state.lock().unwrap();
        let mut staged: Vec<RoleRecord> = Vec::new();
        for record in roles {
            let record = materialize(record);
            check_unique(&staged, &record)?;
            staged.push(record);
        }
        state.roles.extend(staged);
        state
            .stats
            .insert(broadcast.id.clone(), BroadcastStats::empty(&broadcast.id));
        state.broadcasts.push(broadcast.clone());
        Ok(broadcast)
    }

    async fn update(&self, broadcast: Broadcast) -> Result<Broadcast> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .broadcasts
            .iter_mut()
            .find(|b| b.id == broadcast.id)
            .ok_or_else(|| not_found("Broadcast", &broadcast.id))?;
        let mut next = broadcast;
        next.in_process = stored.in_process;
        next.lease_expires_at = stored.lease_expires_at;
        next.creator_notified = stored.creator_notified;
        *stored = next.clone();
        Ok(next)
    }

    async fn delete(&self, broadcast_id: &str) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let before = state.broadcasts.len();
        state.broadcasts.retain(|b| b.id != broadcast_id);
        state.roles.retain(|r| r.broadcast_id != broadcast_id);
        state.stats.remove(broadcast_id);
        state.attendance.retain(|a| a.broadcast_id != broadcast_id);
        Ok(before - state.broadcasts.len())
    }

    async fn mark_cancelled(&self, broadcast_id: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        match state.broadcasts.iter_mut().find(|b| b.id == broadcast_id) {
            Some(b) if !b.is_draft && !b.is_cancelled => {
                b.is_cancelled = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn claim_dispatch_lease(
        &self,
        broadcast_id: &str,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let b = state
            .broadcasts
            .iter_mut()
            .find(|b| b.id == broadcast_id)
            .ok_or_else(|| not_found("Broadcast", broadcast_id))?;
        let free = !b.in_process || b.lease_expires_at.is_some_and(|at| at <= now);
        if free {
            b.in_process = true;
            b.lease_expires_at = Some(expires_at);
        }
        Ok(free)
    }

    async fn release_dispatch_lease(&self, broadcast_id: &str) -> Result<()> {
        self.set_lease(broadcast_id, None);
        Ok(())
    }

    async fn mark_creator_notified(&self, broadcast_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(b) = state.broadcasts.iter_mut().find(|b| b.id == broadcast_id) {
            b.creator_notified = true;
        }
        Ok(())
    }
}

impl InMemoryStore {
    fn with_role<T>(&self, role_id: &str, f: impl FnOnce(&mut RoleRecord) -> T) -> Result<T> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .roles
            .iter_mut()
            .find(|r| r.id == role_id)
            .ok_or_else(|| not_found("Role", role_id))?;
        Ok(f(record))
    }
}

#[async_trait]
impl RoleRepositoryTrait for InMemoryStore {
    fn get(&self, role_id: &str) -> Result<RoleRecord> {
        self.with_role(role_id, |r| r.clone())
    }

    fn list_for_broadcast(&self, broadcast_id: &str) -> Result<Vec<RoleRecord>> {
        Ok(self.roles_of(broadcast_id))
    }

    async fn apply_changes(
        &self,
        insert: Vec<NewRoleRecord>,
        delete_ids: Vec<String>,
    ) -> Result<Vec<RoleRecord>> {
        let mut state = self.state.lock().unwrap();
        let mut remaining: Vec<RoleRecord> = state
            .roles
            .iter()
            .filter(|r| !delete_ids.contains(&r.id))
            .cloned()
            .collect();
        let mut added = Vec::new();
        for record in insert {
            let record = materialize(record);
            check_unique(&remaining, &record)?;
            remaining.push(record.clone());
            added.push(record);
        }
        state.roles = remaining;
        Ok(added)
    }

    async fn mark_email_sent(&self, role_id: &str) -> Result<()> {
        self.with_role(role_id, |r| {
            r.is_mail_sent = true;
            r.email_status = EmailStatus::Sent;
        })
    }

    async fn reset_email_status(&self, role_ids: Vec<String>) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let mut touched = 0;
        for r in state.roles.iter_mut().filter(|r| role_ids.contains(&r.id)) {
            r.email_status = EmailStatus::NotSent;
            touched += 1;
        }
        Ok(touched)
    }

    async fn set_conference_url(&self, role_id: &str, url: Option<String>) -> Result<()> {
        self.with_role(role_id, |r| r.conference_url = url)
    }

    async fn set_invitee_status(&self, role_id: &str, status: InviteeStatus) -> Result<()> {
        self.with_role(role_id, |r| r.invitee_status = Some(status))
    }

    async fn reorder(
        &self,
        broadcast_id: &str,
        role: RoleKind,
        ordered_ids: Vec<String>,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for r in state
            .roles
            .iter_mut()
            .filter(|r| r.broadcast_id == broadcast_id && r.role == role)
        {
            r.sequence_id = None;
        }
        for (index, id) in ordered_ids.iter().enumerate() {
            if let Some(r) = state.roles.iter_mut().find(|r| &r.id == id) {
                r.sequence_id = Some(index as i32 + 1);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl StatsRepositoryTrait for InMemoryStore {
    fn get(&self, broadcast_id: &str) -> Result<BroadcastStats> {
        self.state
            .lock()
            .unwrap()
            .stats
            .get(broadcast_id)
            .cloned()
            .ok_or_else(|| not_found("Stats", broadcast_id))
    }

    async fn upsert(&self, stats: BroadcastStats) -> Result<BroadcastStats> {
        self.state
            .lock()
            .unwrap()
            .stats
            .insert(stats.broadcast_id.clone(), stats.clone());
        Ok(stats)
    }
}

#[async_trait]
impl EngagementRepositoryTrait for InMemoryStore {
    fn list_attendance(&self, broadcast_id: &str) -> Result<Vec<Attendance>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .attendance
            .iter()
            .filter(|a| a.broadcast_id == broadcast_id)
            .cloned()
            .collect())
    }

    fn find_attendance(&self, broadcast_id: &str, user_id: &str) -> Result<Option<Attendance>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .attendance
            .iter()
            .find(|a| a.broadcast_id == broadcast_id && a.user_id == user_id)
            .cloned())
    }

    fn get_question(&self, question_id: &str) -> Result<Question> {
        self.state
            .lock()
            .unwrap()
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .cloned()
            .ok_or_else(|| not_found("Question", question_id))
    }

    fn count_questions(&self, broadcast_id: &str) -> Result<i64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .questions
            .iter()
            .filter(|q| q.broadcast_id == broadcast_id)
            .count() as i64)
    }

    fn count_answers(&self, broadcast_id: &str) -> Result<i64> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .answers
            .iter()
            .filter(|a| a.broadcast_id == broadcast_id)
            .count() as i64)
    }

    async fn record_attendance(&self, broadcast_id: &str, user_id: &str) -> Result<Attendance> {
        if let Some(existing) = self.find_attendance(broadcast_id, user_id)? {
            return Ok(existing);
        }
        let attendance = Attendance {
            id: Uuid::new_v4().to_string(),
            broadcast_id: broadcast_id.to_string(),
            user_id: user_id.to_string(),
            joined_at: Utc::now(),
            rating: None,
        };
        self.state
            .lock()
            .unwrap()
            .attendance
            .push(attendance.clone());
        Ok(attendance)
    }

    async fn set_rating(&self, attendance_id: &str, rating: i32) -> Result<Attendance> {
        let mut state = self.state.lock().unwrap();
        let attendance = state
            .attendance
            .iter_mut()
            .find(|a| a.id == attendance_id)
            .ok_or_else(|| not_found("Attendance", attendance_id))?;
        attendance.rating = Some(rating);
        Ok(attendance.clone())
    }

    async fn insert_question(&self, question: Question) -> Result<Question> {
        self.state.lock().unwrap().questions.push(question.clone());
        Ok(question)
    }

    async fn insert_answer(&self, answer: Answer) -> Result<Answer> {
        self.state.lock().unwrap().answers.push(answer.clone());
        Ok(answer)
    }
}

#[async_trait]
impl NotificationRepositoryTrait for InMemoryStore {
    fn list_for_user(&self, user_id: &str) -> Result<Vec<NotificationRecord>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_and_increment(
        &self,
        notification: NewNotification,
    ) -> Result<(NotificationRecord, i64)> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == notification.user_id)
            .ok_or_else(|| not_found("User", &notification.user_id))?;
        user.unread_notifications += 1;
        let unread = user.unread_notifications;
        let record = NotificationRecord {
            id: Uuid::new_v4().to_string(),
            user_id: notification.user_id,
            broadcast_id: notification.broadcast_id,
            variant: notification.variant,
            title: notification.title,
            body: notification.body,
            is_read: false,
            created_at: Utc::now(),
        };
        state.notifications.push(record.clone());
        Ok((record, unread))
    }
}

#[async_trait]
impl UnsubscribeRepositoryTrait for InMemoryStore {
    fn is_unsubscribed(&self, email: &str, kind: BroadcastKind) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .unsubscribes
            .contains(&(email.to_lowercase(), kind)))
    }

    async fn unsubscribe(&self, email: &str, kind: BroadcastKind) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .unsubscribes
            .insert((email.to_lowercase(), kind));
        Ok(())
    }

    async fn resubscribe(&self, email: &str, kind: BroadcastKind) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .unsubscribes
            .remove(&(email.to_lowercase(), kind));
        Ok(())
    }
}

/// Conferencing provider double that records calls and fails on demand.
#[derive(Default)]
pub struct MockProvider {
    pub calls: Mutex<Vec<String>>,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_deregister: AtomicBool,
    pub fail_register_for: Mutex<HashSet<String>>,
    counter: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn fail_registration_of(&self, email: &str) {
        self.fail_register_for
            .lock()
            .unwrap()
            .insert(email.to_string());
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn failure(message: &str) -> Error {
        Error::Provider(ProviderFailure::new(
            json!({ "code": 3001, "message": message }),
        ))
    }
}

#[async_trait]
impl ConferenceProviderTrait for MockProvider {
    async fn create_conference(&self, payload: &ConferencePayload) -> Result<ConferenceDetails> {
        self.record(format!("create:{}", payload.topic));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::failure("Conference quota exceeded"));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ConferenceDetails {
            conference_id: format!("conf-{}", n),
            conference_address: format!("https://conf.test/j/{}", n),
            presenter_url: Some(format!("https://conf.test/p/{}", n)),
        })
    }

    async fn update_conference(
        &self,
        conference_id: &str,
        payload: &ConferencePayload,
    ) -> Result<ConferenceDetails> {
        self.record(format!("update:{}:{}", conference_id, payload.duration));
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Self::failure("Conference locked"));
        }
        Ok(ConferenceDetails {
            conference_id: conference_id.to_string(),
            conference_address: format!("https://conf.test/j/{}", conference_id),
            presenter_url: None,
        })
    }

    async fn fetch_admin_url(&self, conference_id: &str) -> Result<String> {
        self.record(format!("admin:{}", conference_id));
        Ok(format!("https://conf.test/admin/{}", conference_id))
    }

    async fn delete_conference(&self, conference_id: &str) -> Result<()> {
        self.record(format!("delete:{}", conference_id));
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::failure("Conference not found"));
        }
        Ok(())
    }

    async fn register_attendee(
        &self,
        conference_id: &str,
        registrant: &Registrant,
    ) -> Result<String> {
        self.record(format!("register:{}", registrant.email));
        if self
            .fail_register_for
            .lock()
            .unwrap()
            .contains(&registrant.email)
        {
            return Err(Self::failure("Registrant rejected"));
        }
        Ok(format!(
            "https://conf.test/j/{}?who={}",
            conference_id, registrant.email
        ))
    }

    async fn deregister_attendee(&self, _conference_id: &str, email: &str) -> Result<()> {
        self.record(format!("deregister:{}", email));
        if self.fail_deregister.load(Ordering::SeqCst) {
            return Err(Self::failure("Registrant missing"));
        }
        Ok(())
    }
}

/// Mail transport double.
#[derive(Default)]
pub struct MockMailer {
    pub sent: Mutex<Vec<OutboundEmail>>,
    pub fail_for: Mutex<HashSet<String>>,
}

impl MockMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect()
    }

    pub fn reject(&self, email: &str) {
        self.fail_for.lock().unwrap().insert(email.to_string());
    }
}

#[async_trait]
impl MailTransportTrait for MockMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<()> {
        if self.fail_for.lock().unwrap().contains(&email.to) {
            return Err(Error::Transport(format!("mailbox {} unavailable", email.to)));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockPush {
    pub messages: Mutex<Vec<PushMessage>>,
}

#[async_trait]
impl PushGatewayTrait for MockPush {
    async fn push(&self, message: &PushMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MockRealtime {
    pub events: Mutex<Vec<RealtimeEvent>>,
}

impl RealtimePublisherTrait for MockRealtime {
    fn publish(&self, event: RealtimeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Fully wired services over the in-memory store.
pub struct Harness {
    pub store: InMemoryStore,
    pub provider: Arc<MockProvider>,
    pub mailer: Arc<MockMailer>,
    pub push: Arc<MockPush>,
    pub realtime: Arc<MockRealtime>,
    pub sink: MockDomainEventSink,
    pub broadcasts: BroadcastService,
    pub conference: ConferenceSyncService,
    pub dispatch: DispatchService,
    pub stats: StatsService,
    pub engagement: EngagementService,
}

impl Harness {
    /// Seeds account `acc` (member of group `grp`) with creator `u1`.
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        store.add_account("grp", None);
        store.add_account("acc", Some("grp"));
        store.add_account("other", None);
        store.add_user("u1", "acc", "creator@example.com");

        let provider = MockProvider::new();
        let mailer = MockMailer::new();
        let push = Arc::new(MockPush::default());
        let realtime = Arc::new(MockRealtime::default());
        let sink = MockDomainEventSink::new();
        let arc_store = Arc::new(store.clone());

        let conference_for_service = ConferenceSyncService::new(
            provider.clone(),
            arc_store.clone(),
            arc_store.clone(),
        );
        let conference = ConferenceSyncService::new(
            provider.clone(),
            arc_store.clone(),
            arc_store.clone(),
        );
        let broadcasts = BroadcastService::new(
            arc_store.clone(),
            arc_store.clone(),
            arc_store.clone(),
            Arc::new(conference_for_service),
            Arc::new(sink.clone()),
        );
        let dispatch = DispatchService::new(
            arc_store.clone(),
            arc_store.clone(),
            arc_store.clone(),
            arc_store.clone(),
            arc_store.clone(),
            mailer.clone(),
            push.clone(),
            realtime.clone(),
            DispatchSettings {
                lease_duration: Duration::minutes(10),
                ..DispatchSettings::default()
            },
        );
        let stats = StatsService::new(
            arc_store.clone(),
            arc_store.clone(),
            arc_store.clone(),
            arc_store.clone(),
        );
        let engagement = EngagementService::new(
            arc_store.clone(),
            arc_store.clone(),
            arc_store,
            Arc::new(sink.clone()),
        );

        Self {
            store,
            provider,
            mailer,
            push,
            realtime,
            sink,
            broadcasts,
            conference,
            dispatch,
            stats,
            engagement,
        }
    }
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 11, 3, 16, 0, 0).unwrap()
}

pub fn new_broadcast(kind: BroadcastKind, audience: AudienceRequest, launch: bool) -> NewBroadcast {
    NewBroadcast {
        kind,
        title: "Product roadmap".to_string(),
        description: Some("What ships next quarter".to_string()),
        start_at: start(),
        end_at: start() + Duration::minutes(90),
        visibility: None,
        launch,
        cc_emails: Vec::new(),
        files: Vec::new(),
        audience,
    }
}

pub fn users(ids: &[&str]) -> Vec<AudienceMember> {
    ids.iter().map(|id| AudienceMember::user(*id)).collect()
}
