// crates/server/src/jobs/publisher.rs
//! Fire-and-forget satisfaction event publisher.
//!
//! `publish` enqueues and returns immediately. Events are routed to one of
//! N bounded shard queues by a stable hash of the user id, and each shard is
//! drained by a single worker, so events of one user are applied in the
//! order they were published. Events of different users run concurrently.
//!
//! Every application runs on its own spawned task. The shard worker awaits
//! it, which keeps ordering and turns a panic into a logged failure instead
//! of a dead worker. Outcomes are logged and counted, never returned.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use career_log_core::{NewSatisfactionEvent, SatisfactionSnapshot};
use career_log_db::{Database, DbError, DbResult};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::metrics::{record_event_applied, record_publisher_drop};

/// Applies one event to persistent state.
#[async_trait]
pub trait EventApplier: Send + Sync + 'static {
    async fn apply(&self, event: &NewSatisfactionEvent) -> DbResult<SatisfactionSnapshot>;
}

#[async_trait]
impl EventApplier for Database {
    async fn apply(&self, event: &NewSatisfactionEvent) -> DbResult<SatisfactionSnapshot> {
        self.apply_satisfaction_event(event).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublisherConfig {
    /// Number of shards, one worker each.
    pub workers: usize,
    /// Queue capacity per shard.
    pub capacity: usize,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            capacity: 256,
        }
    }
}

enum Command {
    Apply(NewSatisfactionEvent),
    Flush(oneshot::Sender<()>),
}

pub struct EventPublisher {
    shards: Vec<mpsc::Sender<Command>>,
    dropped: AtomicU64,
}

impl EventPublisher {
    /// Start the shard workers. Must be called inside a Tokio runtime.
    pub fn spawn(applier: Arc<dyn EventApplier>, config: PublisherConfig) -> Self {
        let workers = config.workers.max(1);
        let capacity = config.capacity.max(1);

        let shards = (0..workers)
            .map(|shard| {
                let (tx, rx) = mpsc::channel(capacity);
                tokio::spawn(run_shard(shard, rx, applier.clone()));
                tx
            })
            .collect();

        info!(workers, capacity, "event publisher started");
        Self {
            shards,
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue an event for asynchronous application.
    ///
    /// Never blocks. A full or closed shard queue drops the event.
    pub fn publish(&self, event: NewSatisfactionEvent) {
        let shard = self.shard_for(&event.user_id);
        let user_id = event.user_id.clone();
        let kind = event.kind;

        if let Err(e) = self.shards[shard].try_send(Command::Apply(event)) {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "queue full",
                mpsc::error::TrySendError::Closed(_) => "queue closed",
            };
            self.dropped.fetch_add(1, Ordering::Relaxed);
            record_publisher_drop();
            error!(
                user_id = %user_id,
                event_kind = %kind,
                shard,
                reason,
                "satisfaction event dropped"
            );
        }
    }

    /// Wait until every event published before this call has been attempted.
    pub async fn flush(&self) {
        let mut pending = Vec::with_capacity(self.shards.len());
        for shard in &self.shards {
            let (tx, rx) = oneshot::channel();
            if shard.send(Command::Flush(tx)).await.is_ok() {
                pending.push(rx);
            }
        }
        for rx in pending {
            let _ = rx.await;
        }
    }

    /// Events dropped since startup.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn shard_for(&self, user_id: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        user_id.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }
}

async fn run_shard(
    shard: usize,
    mut rx: mpsc::Receiver<Command>,
    applier: Arc<dyn EventApplier>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Apply(event) => apply_one(shard, &applier, event).await,
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!(shard, "publisher shard stopped");
}

async fn apply_one(shard: usize, applier: &Arc<dyn EventApplier>, event: NewSatisfactionEvent) {
    let user_id = event.user_id.clone();
    let kind = event.kind;
    let source_id = event.source_id.clone();

    let task = {
        let applier = applier.clone();
        tokio::spawn(async move { applier.apply(&event).await })
    };

    let outcome = match task.await {
        Ok(Ok(snapshot)) => {
            debug!(
                user_id = %user_id,
                event_kind = %kind,
                score = snapshot.score(),
                "satisfaction event applied"
            );
            "applied"
        }
        Ok(Err(DbError::NotInitialized { .. })) => {
            error!(
                user_id = %user_id,
                event_kind = %kind,
                source_id = ?source_id,
                shard,
                "satisfaction event dropped: user is not initialized"
            );
            "not_initialized"
        }
        Ok(Err(e)) => {
            error!(
                user_id = %user_id,
                event_kind = %kind,
                source_id = ?source_id,
                shard,
                error = %e,
                "failed to apply satisfaction event"
            );
            "storage_error"
        }
        Err(e) => {
            error!(
                user_id = %user_id,
                event_kind = %kind,
                source_id = ?source_id,
                shard,
                error = %e,
                "satisfaction event task panicked"
            );
            "panicked"
        }
    };
    record_event_applied(kind.as_str(), outcome);
}

#[cfg(test)]
mod tests {
    use super::*;
    use career_log_core::Dimensions;
    use chrono::Utc;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Semaphore;
    use tracing_test::traced_test;

    /// Records applied events; panics for user "boom".
    #[derive(Default)]
    struct RecordingApplier {
        applied: Mutex<Vec<(String, Option<String>)>>,
    }

    #[async_trait]
    impl EventApplier for RecordingApplier {
        async fn apply(&self, event: &NewSatisfactionEvent) -> DbResult<SatisfactionSnapshot> {
            if event.user_id == "boom" {
                panic!("applier exploded");
            }
            // Uneven latency.
            let jitter = event.source_id.as_deref().map_or(0, |s| s.len() as u64 % 3);
            tokio::time::sleep(Duration::from_millis(jitter)).await;
            self.applied
                .lock()
                .unwrap()
                .push((event.user_id.clone(), event.source_id.clone()));
            Ok(SatisfactionSnapshot::empty(
                "USR_JOB_SAT_test".into(),
                event.user_id.clone(),
                Utc::now(),
            ))
        }
    }

    /// Blocks every application until a permit is released.
    struct GatedApplier {
        gate: Semaphore,
        applied: AtomicU64,
    }

    #[async_trait]
    impl EventApplier for GatedApplier {
        async fn apply(&self, event: &NewSatisfactionEvent) -> DbResult<SatisfactionSnapshot> {
            let permit = self.gate.acquire().await.unwrap();
            permit.forget();
            self.applied.fetch_add(1, Ordering::SeqCst);
            Ok(SatisfactionSnapshot::empty(
                "USR_JOB_SAT_test".into(),
                event.user_id.clone(),
                Utc::now(),
            ))
        }
    }

    fn delta(user: &str, source: impl Into<String>) -> NewSatisfactionEvent {
        NewSatisfactionEvent::chat_analysis(user, Dimensions::uniform(1.0), source)
    }

    #[tokio::test]
    async fn test_events_of_one_user_apply_in_publish_order() {
        let applier = Arc::new(RecordingApplier::default());
        let publisher = EventPublisher::spawn(
            applier.clone(),
            PublisherConfig {
                workers: 3,
                capacity: 64,
            },
        );

        for i in 0..20 {
            publisher.publish(delta("alice", format!("a{i}")));
            publisher.publish(delta("bob", format!("bb{i}")));
        }
        publisher.flush().await;

        let applied = applier.applied.lock().unwrap();
        assert_eq!(applied.len(), 40);
        for user in ["alice", "bob"] {
            let order: Vec<&str> = applied
                .iter()
                .filter(|(u, _)| u == user)
                .filter_map(|(_, s)| s.as_deref())
                .collect();
            let prefix = if user == "alice" { "a" } else { "bb" };
            let expected: Vec<String> = (0..20).map(|i| format!("{prefix}{i}")).collect();
            assert_eq!(order, expected);
        }
    }

    #[tokio::test]
    async fn test_panic_in_one_application_is_contained() {
        let applier = Arc::new(RecordingApplier::default());
        let publisher = EventPublisher::spawn(
            applier.clone(),
            PublisherConfig {
                workers: 1,
                capacity: 8,
            },
        );

        publisher.publish(delta("boom", "x"));
        publisher.publish(delta("carol", "after-panic"));
        publisher.flush().await;

        let applied = applier.applied.lock().unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].1.as_deref(), Some("after-panic"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_not_initialized_is_logged_not_returned() {
        let db = Database::new_in_memory().await.unwrap();
        let publisher = EventPublisher::spawn(Arc::new(db.clone()), PublisherConfig::default());

        publisher.publish(delta("ghost", "CH_SET_1"));
        publisher.flush().await;

        assert!(logs_contain("user is not initialized"));
        assert_eq!(db.count_satisfaction_events("ghost").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_init_then_delta_for_same_user_applies_both() {
        let db = Database::new_in_memory().await.unwrap();
        let publisher = EventPublisher::spawn(Arc::new(db.clone()), PublisherConfig::default());

        publisher.publish(NewSatisfactionEvent::init("dana", Dimensions::uniform(50.0)));
        publisher.publish(delta("dana", "CH_SET_1"));
        publisher.flush().await;

        let snapshot = db.get_satisfaction("dana").await.unwrap().unwrap();
        assert_eq!(snapshot.levels, Dimensions::uniform(51.0));
    }

    #[tokio::test]
    async fn test_full_queue_drops_events() {
        let applier = Arc::new(GatedApplier {
            gate: Semaphore::new(0),
            applied: AtomicU64::new(0),
        });
        let publisher = EventPublisher::spawn(
            applier.clone(),
            PublisherConfig {
                workers: 1,
                capacity: 1,
            },
        );

        for i in 0..5 {
            publisher.publish(delta("erin", format!("CH_SET_{i}")));
        }
        // At most one event in flight plus one queued.
        assert!(publisher.dropped() >= 3, "dropped {}", publisher.dropped());

        applier.gate.add_permits(5);
        publisher.flush().await;
        let applied = applier.applied.load(Ordering::SeqCst);
        assert_eq!(applied + publisher.dropped(), 5);
    }
}
