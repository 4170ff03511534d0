/// Inline SQL migrations for the career-log database schema.
///
/// One statement per entry; the index of an entry is its version number.
/// Timestamps are unix seconds.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: current satisfaction snapshot, one row per user
    r#"
CREATE TABLE IF NOT EXISTS job_satisfactions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE,
    workload REAL NOT NULL DEFAULT 0 CHECK (workload BETWEEN 0 AND 100),
    compensation REAL NOT NULL DEFAULT 0 CHECK (compensation BETWEEN 0 AND 100),
    growth REAL NOT NULL DEFAULT 0 CHECK (growth BETWEEN 0 AND 100),
    work_environment REAL NOT NULL DEFAULT 0 CHECK (work_environment BETWEEN 0 AND 100),
    work_relationships REAL NOT NULL DEFAULT 0 CHECK (work_relationships BETWEEN 0 AND 100),
    work_values REAL NOT NULL DEFAULT 0 CHECK (work_values BETWEEN 0 AND 100),
    workload_importance REAL NOT NULL DEFAULT 0 CHECK (workload_importance BETWEEN 0 AND 100),
    compensation_importance REAL NOT NULL DEFAULT 0 CHECK (compensation_importance BETWEEN 0 AND 100),
    growth_importance REAL NOT NULL DEFAULT 0 CHECK (growth_importance BETWEEN 0 AND 100),
    work_environment_importance REAL NOT NULL DEFAULT 0 CHECK (work_environment_importance BETWEEN 0 AND 100),
    work_relationships_importance REAL NOT NULL DEFAULT 0 CHECK (work_relationships_importance BETWEEN 0 AND 100),
    work_values_importance REAL NOT NULL DEFAULT 0 CHECK (work_values_importance BETWEEN 0 AND 100),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
    // Migration 2: importance declarations
    r#"
CREATE TABLE IF NOT EXISTS job_satisfaction_importances (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL UNIQUE,
    workload REAL NOT NULL CHECK (workload BETWEEN 0 AND 100),
    compensation REAL NOT NULL CHECK (compensation BETWEEN 0 AND 100),
    growth REAL NOT NULL CHECK (growth BETWEEN 0 AND 100),
    work_environment REAL NOT NULL CHECK (work_environment BETWEEN 0 AND 100),
    work_relationships REAL NOT NULL CHECK (work_relationships BETWEEN 0 AND 100),
    work_values REAL NOT NULL CHECK (work_values BETWEEN 0 AND 100),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
"#,
    // Migration 3: append-only event log
    r#"
CREATE TABLE IF NOT EXISTS job_satisfaction_events (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL,
    event_type TEXT NOT NULL CHECK (event_type IN ('INIT_EVENT', 'CHAT_ANALYSIS_EVENT')),
    workload REAL NOT NULL CHECK (workload BETWEEN -100 AND 100),
    compensation REAL NOT NULL CHECK (compensation BETWEEN -100 AND 100),
    growth REAL NOT NULL CHECK (growth BETWEEN -100 AND 100),
    work_environment REAL NOT NULL CHECK (work_environment BETWEEN -100 AND 100),
    work_relationships REAL NOT NULL CHECK (work_relationships BETWEEN -100 AND 100),
    work_values REAL NOT NULL CHECK (work_values BETWEEN -100 AND 100),
    source_id TEXT,
    created_at INTEGER NOT NULL
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_job_satisfaction_events_user
    ON job_satisfaction_events(user_id, created_at DESC, seq DESC);
"#,
    // Migration 4: conversations (written by the chat side, read by daily analysis)
    r#"
CREATE TABLE IF NOT EXISTS chat_sets (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    chat_data TEXT NOT NULL DEFAULT '[]',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    deleted_at INTEGER
);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_chat_sets_created_at ON chat_sets(created_at);
"#,
    r#"
CREATE INDEX IF NOT EXISTS idx_chat_sets_user ON chat_sets(user_id, created_at DESC);
"#,
];
