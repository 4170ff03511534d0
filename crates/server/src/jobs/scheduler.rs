// crates/server/src/jobs/scheduler.rs
//! Daily conversation analysis batch.
//!
//! Once a day (cron, in the configured time zone) and on manual request,
//! the scheduler collects the previous day's conversations, analyzes each
//! with the language model and publishes the resulting delta events. A
//! record that cannot be decoded or analyzed is logged and skipped. Only one run may be
//! in progress; a second trigger is rejected with `AlreadyRunning`.

use std::sync::Arc;
use std::time::Instant;

use career_log_core::ConversationAnalyzer;
use career_log_db::{Database, DbError};
use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use cron::Schedule;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::publisher::EventPublisher;
use super::state::BatchState;
use super::types::{AnalysisWindow, BatchReport, Trigger};
use crate::metrics::{record_analysis, record_batch};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("daily analysis is already running")]
    AlreadyRunning,

    #[error("failed to load conversations: {0}")]
    Storage(#[from] DbError),

    #[error("invalid cron expression '{expr}': {reason}")]
    InvalidSchedule { expr: String, reason: String },
}

/// Parse a five-field cron expression. The `cron` crate wants a seconds field.
pub fn parse_cron(expr: &str) -> Result<Schedule, cron::error::Error> {
    format!("0 {}", expr.trim()).parse::<Schedule>()
}

/// The window a run at `now` covers: from the boundary time on the previous
/// local calendar day up to (excluding) the boundary time on the current one.
pub fn analysis_window(now: DateTime<Utc>, tz: Tz, boundary: NaiveTime) -> AnalysisWindow {
    let today = now.with_timezone(&tz).date_naive();
    let yesterday = today.checked_sub_days(Days::new(1)).unwrap_or(today);
    AnalysisWindow {
        start: local_instant(tz, yesterday, boundary),
        end: local_instant(tz, today, boundary),
    }
}

/// Resolve a local wall-clock time to an instant. Ambiguous times (clocks
/// going back) take the earlier instant; skipped times (clocks going forward)
/// move one hour later.
fn local_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(naive + chrono::Duration::hours(1)))
            .earliest()
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub cron: String,
    pub timezone: Tz,
    pub window_boundary: NaiveTime,
}

pub struct DailyAnalysisScheduler {
    db: Database,
    analyzer: ConversationAnalyzer,
    publisher: Arc<EventPublisher>,
    state: Arc<BatchState>,
    schedule: Schedule,
    timezone: Tz,
    window_boundary: NaiveTime,
}

impl DailyAnalysisScheduler {
    pub fn new(
        db: Database,
        analyzer: ConversationAnalyzer,
        publisher: Arc<EventPublisher>,
        state: Arc<BatchState>,
        config: SchedulerConfig,
    ) -> Result<Self, SchedulerError> {
        let schedule = parse_cron(&config.cron).map_err(|e| SchedulerError::InvalidSchedule {
            expr: config.cron.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            db,
            analyzer,
            publisher,
            state,
            schedule,
            timezone: config.timezone,
            window_boundary: config.window_boundary,
        })
    }

    /// Next scheduled run strictly after `after`.
    pub fn next_run_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.timezone))
            .next()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Run the batch for the window ending today.
    pub async fn run_now(&self, trigger: Trigger) -> Result<BatchReport, SchedulerError> {
        self.run_at(Utc::now(), trigger).await
    }

    /// Run the batch as if the current time were `now`.
    pub async fn run_at(
        &self,
        now: DateTime<Utc>,
        trigger: Trigger,
    ) -> Result<BatchReport, SchedulerError> {
        let guard = self
            .state
            .try_start()
            .ok_or(SchedulerError::AlreadyRunning)?;

        let timer = Instant::now();
        let started_at = Utc::now();
        let window = analysis_window(now, self.timezone, self.window_boundary);
        info!(
            trigger = %trigger,
            window_start = %window.start,
            window_end = %window.end,
            provider = self.analyzer.provider_name(),
            "daily analysis started"
        );

        let conversations = self
            .db
            .list_conversations_in_window(window.start, window.end)
            .await?;
        let total = conversations.len() as u64;
        guard.set_total(total);

        let mut published = 0u64;
        let mut failed = 0u64;
        for entry in &conversations {
            let conversation = match entry {
                Ok(conversation) => conversation,
                Err(e) => {
                    warn!(error = %e, "skipping conversation: stored row is invalid");
                    failed += 1;
                    record_analysis("invalid_row");
                    guard.increment();
                    continue;
                }
            };
            match self.analyzer.analyze(conversation).await {
                Ok(event) => {
                    self.publisher.publish(event);
                    published += 1;
                    record_analysis("ok");
                }
                Err(e) => {
                    warn!(
                        conversation_id = %conversation.id,
                        user_id = %conversation.user_id,
                        error = %e,
                        "skipping conversation: analysis failed"
                    );
                    failed += 1;
                    record_analysis(e.outcome());
                }
            }
            guard.increment();
        }

        let report = BatchReport {
            trigger,
            window,
            conversations: total,
            published,
            failed,
            started_at,
            finished_at: Utc::now(),
        };
        record_batch(trigger.as_str(), timer.elapsed(), total);
        info!(
            trigger = %trigger,
            conversations = total,
            published,
            failed,
            duration_ms = timer.elapsed().as_millis() as u64,
            "daily analysis finished"
        );
        guard.finish(report.clone());
        Ok(report)
    }

    /// Run the batch on the cron schedule until the runtime shuts down.
    pub fn spawn_daily(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let Some(next) = self.next_run_after(now) else {
                    warn!("cron schedule has no upcoming run; daily analysis disabled");
                    return;
                };
                info!(next_run = %next, timezone = %self.timezone, "next daily analysis scheduled");
                let wait = (next - now).to_std().unwrap_or_default();
                tokio::time::sleep(wait).await;

                match self.run_now(Trigger::Scheduled).await {
                    Ok(_) => {}
                    Err(SchedulerError::AlreadyRunning) => {
                        warn!("scheduled daily analysis skipped: a run is already in progress")
                    }
                    Err(e) => error!(error = %e, "scheduled daily analysis failed"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::publisher::PublisherConfig;
    use async_trait::async_trait;
    use career_log_core::llm::{CompletionRequest, CompletionResponse, LlmError, LlmProvider};
    use career_log_core::{ChatMessage, Dimensions, MessageRole, NewSatisfactionEvent};
    use chrono_tz::{America, Asia};
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;
    use tracing_test::traced_test;

    const SCORES: &str = r#"{"workload": 4, "compensation": 0, "growth": -2,
        "workEnvironment": 0, "workRelationships": 0, "workValues": 0}"#;

    /// Replies with fixed scores, or prose for transcripts mentioning "garbled".
    /// Optionally holds every call until released.
    struct ScriptedProvider {
        hold: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            if let Some(hold) = &self.hold {
                hold.notified().await;
            }
            let content = if request.user_prompt.contains("garbled") {
                "I could not score this conversation.".to_string()
            } else {
                SCORES.to_string()
            };
            Ok(CompletionResponse {
                content,
                model: None,
                input_tokens: None,
                output_tokens: None,
                latency_ms: 1,
            })
        }

        async fn health_check(&self) -> Result<(), LlmError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn six_am() -> NaiveTime {
        NaiveTime::from_hms_opt(6, 0, 0).unwrap()
    }

    fn user_says(text: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::new(MessageRole::Assistant, "How did work go?"),
            ChatMessage::new(MessageRole::User, text),
        ]
    }

    fn scheduler(
        db: &Database,
        publisher: Arc<EventPublisher>,
        hold: Option<Arc<Notify>>,
    ) -> DailyAnalysisScheduler {
        DailyAnalysisScheduler::new(
            db.clone(),
            ConversationAnalyzer::new(Arc::new(ScriptedProvider { hold })),
            publisher,
            Arc::new(BatchState::new()),
            SchedulerConfig {
                cron: "0 7 * * *".into(),
                timezone: Asia::Seoul,
                window_boundary: six_am(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_parse_cron_five_fields() {
        assert!(parse_cron("0 7 * * *").is_ok());
        assert!(parse_cron("*/15 9-17 * * 1-5").is_ok());
        assert!(parse_cron("not a cron").is_err());
    }

    #[test]
    fn test_window_covers_previous_local_day() {
        // 2024-01-02 07:00 KST
        let window = analysis_window(utc(2024, 1, 1, 22, 0), Asia::Seoul, six_am());
        assert_eq!(window.start, utc(2023, 12, 31, 21, 0));
        assert_eq!(window.end, utc(2024, 1, 1, 21, 0));
    }

    #[test]
    fn test_window_uses_local_date_not_utc_date() {
        // 2024-01-02 00:30 KST is still 2024-01-01 in UTC.
        let window = analysis_window(utc(2024, 1, 1, 15, 30), Asia::Seoul, six_am());
        assert_eq!(window.end, utc(2024, 1, 1, 21, 0));
    }

    #[test]
    fn test_window_across_spring_forward() {
        // 02:30 does not exist in New York on 2024-03-10; it resolves to 03:30 EDT.
        let boundary = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let window = analysis_window(utc(2024, 3, 11, 12, 0), America::New_York, boundary);
        assert_eq!(window.start, utc(2024, 3, 10, 7, 30));
        assert_eq!(window.end, utc(2024, 3, 11, 6, 30));
    }

    #[test]
    fn test_window_across_fall_back_takes_earliest() {
        // 01:30 happens twice in New York on 2024-11-03; the EDT one is first.
        let boundary = NaiveTime::from_hms_opt(1, 30, 0).unwrap();
        let window = analysis_window(utc(2024, 11, 4, 12, 0), America::New_York, boundary);
        assert_eq!(window.start, utc(2024, 11, 3, 5, 30));
        assert_eq!(window.end, utc(2024, 11, 4, 6, 30));
    }

    #[tokio::test]
    async fn test_next_run_in_configured_timezone() {
        let db = Database::new_in_memory().await.unwrap();
        let publisher = Arc::new(EventPublisher::spawn(
            Arc::new(db.clone()),
            PublisherConfig::default(),
        ));
        let scheduler = scheduler(&db, publisher, None);

        // 07:00 KST is 22:00 UTC the previous day.
        let next = scheduler.next_run_after(utc(2024, 1, 1, 12, 0)).unwrap();
        assert_eq!(next, utc(2024, 1, 1, 22, 0));
        let next = scheduler.next_run_after(utc(2024, 1, 1, 22, 0)).unwrap();
        assert_eq!(next, utc(2024, 1, 2, 22, 0));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_batch_skips_failed_conversation_and_publishes_rest() {
        let db = Database::new_in_memory().await.unwrap();
        for user in ["u1", "u2", "u3"] {
            db.apply_satisfaction_event(&NewSatisfactionEvent::init(user, Dimensions::uniform(50.0)))
                .await
                .unwrap();
        }
        let in_window = utc(2024, 1, 1, 3, 0);
        db.insert_conversation("u1", "mon", user_says("Busy but fine."), in_window)
            .await
            .unwrap();
        let bad = db
            .insert_conversation("u2", "mon", user_says("garbled"), in_window)
            .await
            .unwrap();
        db.insert_conversation("u3", "mon", user_says("Learning a lot."), in_window)
            .await
            .unwrap();
        // Outside the window.
        db.insert_conversation("u1", "old", user_says("Last week."), utc(2023, 12, 25, 3, 0))
            .await
            .unwrap();

        // Single shard keeps writers to the shared in-memory database serialized.
        let publisher = Arc::new(EventPublisher::spawn(
            Arc::new(db.clone()),
            PublisherConfig {
                workers: 1,
                capacity: 16,
            },
        ));
        let scheduler = scheduler(&db, publisher.clone(), None);

        let report = scheduler
            .run_at(utc(2024, 1, 1, 22, 0), Trigger::Manual)
            .await
            .unwrap();
        assert_eq!(report.conversations, 3);
        assert_eq!(report.published, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.trigger, Trigger::Manual);

        publisher.flush().await;
        let u1 = db.get_satisfaction("u1").await.unwrap().unwrap();
        assert_eq!(u1.levels.workload, 54.0);
        assert_eq!(u1.levels.growth, 48.0);
        let u2 = db.get_satisfaction("u2").await.unwrap().unwrap();
        assert_eq!(u2.levels, Dimensions::uniform(50.0));
        assert_eq!(db.count_satisfaction_events("u3").await.unwrap(), 2);

        assert!(logs_contain("skipping conversation: analysis failed"));
        assert!(logs_contain(&bad.id));

        let progress = scheduler.state.snapshot();
        assert_eq!(progress.current, 3);
        assert_eq!(progress.last_report, Some(report));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_batch_skips_corrupt_row_and_analyzes_rest() {
        let db = Database::new_in_memory().await.unwrap();
        for user in ["u1", "u3"] {
            db.apply_satisfaction_event(&NewSatisfactionEvent::init(user, Dimensions::uniform(50.0)))
                .await
                .unwrap();
        }
        let in_window = utc(2024, 1, 1, 3, 0);
        db.insert_conversation("u1", "mon", user_says("Busy but fine."), in_window)
            .await
            .unwrap();
        let corrupt = db
            .insert_conversation("u2", "mon", user_says("Fine."), utc(2024, 1, 1, 4, 0))
            .await
            .unwrap();
        db.insert_conversation("u3", "mon", user_says("Learning a lot."), utc(2024, 1, 1, 5, 0))
            .await
            .unwrap();
        sqlx::query("UPDATE chat_sets SET chat_data = 'not json' WHERE id = ?1")
            .bind(&corrupt.id)
            .execute(db.pool())
            .await
            .unwrap();

        let publisher = Arc::new(EventPublisher::spawn(
            Arc::new(db.clone()),
            PublisherConfig {
                workers: 1,
                capacity: 16,
            },
        ));
        let scheduler = scheduler(&db, publisher.clone(), None);

        let report = scheduler
            .run_at(utc(2024, 1, 1, 22, 0), Trigger::Manual)
            .await
            .unwrap();
        assert_eq!(report.conversations, 3);
        assert_eq!(report.published, 2);
        assert_eq!(report.failed, 1);

        publisher.flush().await;
        assert_eq!(db.count_satisfaction_events("u1").await.unwrap(), 2);
        assert_eq!(db.count_satisfaction_events("u3").await.unwrap(), 2);
        assert!(logs_contain("stored row is invalid"));
        assert!(logs_contain(&corrupt.id));
        assert_eq!(scheduler.state.snapshot().current, 3);
    }

    #[tokio::test]
    async fn test_empty_window_reports_zero() {
        let db = Database::new_in_memory().await.unwrap();
        let publisher = Arc::new(EventPublisher::spawn(
            Arc::new(db.clone()),
            PublisherConfig::default(),
        ));
        let scheduler = scheduler(&db, publisher, None);

        let report = scheduler.run_now(Trigger::Manual).await.unwrap();
        assert_eq!(report.conversations, 0);
        assert_eq!(report.published, 0);
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_rejected() {
        let db = Database::new_in_memory().await.unwrap();
        db.insert_conversation("u1", "mon", user_says("Tired."), utc(2024, 1, 1, 3, 0))
            .await
            .unwrap();
        let publisher = Arc::new(EventPublisher::spawn(
            Arc::new(db.clone()),
            PublisherConfig::default(),
        ));
        let hold = Arc::new(Notify::new());
        let scheduler = Arc::new(scheduler(&db, publisher, Some(hold.clone())));

        let first = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.run_at(utc(2024, 1, 1, 22, 0), Trigger::Scheduled).await })
        };
        while scheduler.state.status() != crate::jobs::BatchStatus::Running {
            tokio::task::yield_now().await;
        }

        let second = scheduler.run_at(utc(2024, 1, 1, 22, 0), Trigger::Manual).await;
        assert!(matches!(second, Err(SchedulerError::AlreadyRunning)));

        hold.notify_one();
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.trigger, Trigger::Scheduled);
        assert_eq!(scheduler.state.status(), crate::jobs::BatchStatus::Idle);
    }
}
