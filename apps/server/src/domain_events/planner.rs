//! Event planning functions for domain events.
//!
//! These functions analyze batches of domain events and determine the
//! background work each broadcast needs (pre-registration, email and
//! notification dispatch, stats recomputation).

use eventcast_core::dispatch::{DispatchScope, DispatchVariant};
use eventcast_core::events::DomainEvent;

/// One unit of background work for a broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BroadcastTask {
    PreRegister,
    SendEmails {
        variant: DispatchVariant,
        scope: DispatchScope,
    },
    Notify {
        variant: DispatchVariant,
        scope: DispatchScope,
    },
    RecomputeStats,
}

impl BroadcastTask {
    fn emails(variant: DispatchVariant, scope: DispatchScope) -> Self {
        BroadcastTask::SendEmails { variant, scope }
    }

    fn notify(variant: DispatchVariant, scope: DispatchScope) -> Self {
        BroadcastTask::Notify { variant, scope }
    }

    pub fn label(&self) -> String {
        match self {
            BroadcastTask::PreRegister => "pre-register".to_string(),
            BroadcastTask::SendEmails { variant, .. } => format!("emails:{}", variant),
            BroadcastTask::Notify { variant, .. } => format!("notify:{}", variant),
            BroadcastTask::RecomputeStats => "stats".to_string(),
        }
    }
}

/// Ordered tasks for one broadcast. Tasks run one after another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroadcastJob {
    pub broadcast_id: String,
    pub tasks: Vec<BroadcastTask>,
}

impl BroadcastJob {
    fn push(&mut self, task: BroadcastTask) {
        if !self.tasks.contains(&task) {
            self.tasks.push(task);
        }
    }
}

fn tasks_for(event: &DomainEvent) -> Vec<BroadcastTask> {
    match event {
        DomainEvent::BroadcastLaunched { .. } => vec![
            BroadcastTask::PreRegister,
            BroadcastTask::emails(DispatchVariant::Launch, DispatchScope::All),
            BroadcastTask::notify(DispatchVariant::Launch, DispatchScope::All),
        ],
        DomainEvent::BroadcastUpdated {
            added_role_ids,
            notify_existing,
            ..
        } => {
            let mut tasks = Vec::new();
            if !added_role_ids.is_empty() {
                let added = DispatchScope::Only(added_role_ids.clone());
                tasks.push(BroadcastTask::PreRegister);
                tasks.push(BroadcastTask::emails(
                    DispatchVariant::InviteeAdded,
                    added.clone(),
                ));
                tasks.push(BroadcastTask::notify(DispatchVariant::InviteeAdded, added));
            }
            if *notify_existing {
                let existing = DispatchScope::Except(added_role_ids.clone());
                tasks.push(BroadcastTask::emails(
                    DispatchVariant::Update,
                    existing.clone(),
                ));
                tasks.push(BroadcastTask::notify(DispatchVariant::Update, existing));
            }
            tasks
        }
        DomainEvent::BroadcastCancelled { .. } => vec![
            BroadcastTask::emails(DispatchVariant::Cancel, DispatchScope::All),
            BroadcastTask::notify(DispatchVariant::Cancel, DispatchScope::All),
        ],
        DomainEvent::InvitationsReset { role_ids, .. } => vec![BroadcastTask::emails(
            DispatchVariant::Launch,
            DispatchScope::Only(role_ids.clone()),
        )],
        DomainEvent::BroadcastCreated { .. }
        | DomainEvent::BroadcastDeleted { .. }
        | DomainEvent::MembershipChanged { .. }
        | DomainEvent::EngagementChanged { .. } => Vec::new(),
    }
}

/// Plans one job per broadcast touched by the batch, in first-seen order.
///
/// Tasks keep the order of the events that produced them and repeats are
/// dropped. Every job ends with a stats recomputation. Broadcasts deleted
/// within the batch get no job.
pub fn plan_broadcast_jobs(events: &[DomainEvent]) -> Vec<BroadcastJob> {
    let mut jobs: Vec<BroadcastJob> = Vec::new();
    let mut deleted: Vec<&str> = Vec::new();

    for event in events {
        let broadcast_id = event.broadcast_id();
        if broadcast_id.is_empty() {
            continue;
        }
        if matches!(event, DomainEvent::BroadcastDeleted { .. }) {
            deleted.push(broadcast_id);
            continue;
        }
        let index = match jobs.iter().position(|j| j.broadcast_id == broadcast_id) {
            Some(index) => index,
            None => {
                jobs.push(BroadcastJob {
                    broadcast_id: broadcast_id.to_string(),
                    tasks: Vec::new(),
                });
                jobs.len() - 1
            }
        };
        for task in tasks_for(event) {
            jobs[index].push(task);
        }
    }

    jobs.retain(|job| !deleted.contains(&job.broadcast_id.as_str()));
    for job in &mut jobs {
        job.push(BroadcastTask::RecomputeStats);
    }
    jobs
}

/// Broadcasts whose clients should refresh, in first-seen order.
pub fn plan_change_notices(events: &[DomainEvent]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for event in events {
        let id = event.broadcast_id();
        if !id.is_empty() && !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }
    ids
}
