//! Event queue worker for processing domain events.
//!
//! Receives events from an mpsc channel, debounces them with a 1s window,
//! then runs the planned broadcast jobs. Jobs for different broadcasts run
//! concurrently; the tasks of one job run in order.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use eventcast_core::{
    broadcasts::BroadcastRepositoryTrait,
    conference::ConferenceSyncTrait,
    constants::BROADCAST_CHANGED_EVENT,
    dispatch::DispatchServiceTrait,
    errors::{DatabaseError, Error, Result},
    events::DomainEvent,
    stats::StatsServiceTrait,
};
use serde_json::json;
use tokio::sync::mpsc;

use super::planner::{plan_broadcast_jobs, plan_change_notices, BroadcastJob, BroadcastTask};
use crate::events::{EventBus, ServerEvent};

/// Debounce window for collecting events before processing.
const DEBOUNCE_DURATION: Duration = Duration::from_millis(1000);

/// How often a failing task is attempted and how long to wait between tries.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(2),
        }
    }

    /// Exponential backoff: `base_delay * 2^(attempt - 1)`.
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Dependencies needed by the queue worker for processing events.
pub struct QueueWorkerDeps {
    pub broadcasts: Arc<dyn BroadcastRepositoryTrait>,
    pub conference: Arc<dyn ConferenceSyncTrait>,
    pub dispatch: Arc<dyn DispatchServiceTrait>,
    pub stats: Arc<dyn StatsServiceTrait>,
    pub event_bus: EventBus,
    pub retry: RetryPolicy,
}

/// Runs the event queue worker.
///
/// Uses an `is_processing` guard so a new batch is not started while the
/// previous one (provider calls, mail passes) is still running.
pub async fn event_queue_worker(
    mut rx: mpsc::UnboundedReceiver<DomainEvent>,
    deps: Arc<QueueWorkerDeps>,
) {
    tracing::info!("Domain event queue worker started");

    let mut pending_events: Vec<DomainEvent> = Vec::new();
    let is_processing = Arc::new(AtomicBool::new(false));

    loop {
        if !pending_events.is_empty() {
            tokio::select! {
                event = rx.recv() => {
                    match event {
                        Some(e) => pending_events.push(e),
                        None => {
                            // Channel closed, process remaining and exit
                            while is_processing.load(Ordering::SeqCst) {
                                tokio::time::sleep(Duration::from_millis(50)).await;
                            }
                            if !pending_events.is_empty() {
                                is_processing.store(true, Ordering::SeqCst);
                                process_event_batch(&pending_events, deps.clone()).await;
                                is_processing.store(false, Ordering::SeqCst);
                            }
                            tracing::info!("Domain event queue worker shutting down");
                            return;
                        }
                    }
                }
                _ = tokio::time::sleep(DEBOUNCE_DURATION) => {
                    if is_processing.load(Ordering::SeqCst) {
                        tracing::debug!("Debounce expired but previous batch still processing, continuing to collect events");
                        continue;
                    }

                    if !pending_events.is_empty() {
                        let batch = std::mem::take(&mut pending_events);
                        is_processing.store(true, Ordering::SeqCst);
                        process_event_batch(&batch, deps.clone()).await;
                        is_processing.store(false, Ordering::SeqCst);
                    }
                }
            }
        } else {
            match rx.recv().await {
                Some(e) => pending_events.push(e),
                None => {
                    tracing::info!("Domain event queue worker shutting down");
                    return;
                }
            }
        }
    }
}

/// Processes a batch of domain events.
async fn process_event_batch(events: &[DomainEvent], deps: Arc<QueueWorkerDeps>) {
    tracing::info!("Processing batch of {} domain event(s)", events.len());

    let jobs = plan_broadcast_jobs(events);
    futures::future::join_all(jobs.into_iter().map(|job| run_job(job, deps.clone()))).await;

    for broadcast_id in plan_change_notices(events) {
        deps.event_bus.publish(ServerEvent::with_payload(
            BROADCAST_CHANGED_EVENT,
            json!({ "broadcastId": broadcast_id }),
        ));
    }
}

fn is_gone(err: &Error) -> bool {
    matches!(
        err,
        Error::NotFound(_) | Error::Database(DatabaseError::NotFound(_))
    )
}

async fn run_job(job: BroadcastJob, deps: Arc<QueueWorkerDeps>) {
    for task in &job.tasks {
        let label = format!("{} for broadcast {}", task.label(), job.broadcast_id);
        let outcome = run_with_retry(&label, &deps.retry, || {
            run_task(&job.broadcast_id, task, &deps)
        })
        .await;
        match outcome {
            Ok(()) => {}
            Err(e) if is_gone(&e) => {
                tracing::info!(
                    "Broadcast {} no longer exists, dropping remaining tasks",
                    job.broadcast_id
                );
                return;
            }
            // Later tasks still run; their own state gates what they do.
            Err(_) => {}
        }
    }
}

async fn run_task(broadcast_id: &str, task: &BroadcastTask, deps: &QueueWorkerDeps) -> Result<()> {
    match task {
        BroadcastTask::PreRegister => {
            let broadcast = deps.broadcasts.get_by_id(broadcast_id)?;
            if !broadcast.is_launched() {
                tracing::debug!("Skipping pre-registration for broadcast {}", broadcast_id);
                return Ok(());
            }
            let report = deps.conference.pre_register(&broadcast).await?;
            tracing::info!(
                "Pre-registration for broadcast {}: {} registered, {} failed",
                broadcast_id,
                report.registered.len(),
                report.failed.len()
            );
        }
        BroadcastTask::SendEmails { variant, scope } => {
            let report = deps
                .dispatch
                .send_emails(broadcast_id, *variant, scope.clone())
                .await?;
            tracing::info!(
                "{} emails for broadcast {}: {} sent, {} skipped, {} failed",
                variant,
                broadcast_id,
                report.sent.len(),
                report.skipped.len(),
                report.failed.len()
            );
        }
        BroadcastTask::Notify { variant, scope } => {
            let report = deps
                .dispatch
                .notify(broadcast_id, *variant, scope.clone())
                .await?;
            tracing::info!(
                "{} notifications for broadcast {}: {} delivered, {} failed",
                variant,
                broadcast_id,
                report.sent.len(),
                report.failed.len()
            );
        }
        BroadcastTask::RecomputeStats => {
            deps.stats.recompute(broadcast_id).await?;
        }
    }
    Ok(())
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
pub async fn run_with_retry<F, Fut, T>(label: &str, policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "Task {} failed (attempt {}/{}), retrying in {:?}: {}",
                    label,
                    attempt,
                    policy.max_attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!("Task {} failed after {} attempt(s): {}", label, attempt, e);
                return Err(e);
            }
        }
    }
}
