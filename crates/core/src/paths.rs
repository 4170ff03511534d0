//! Centralized path functions for app storage locations.

use std::path::PathBuf;

/// App cache root: `~/Library/Caches/career-log/` (macOS) or `~/.cache/career-log/` (Linux).
pub fn app_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("career-log"))
}

/// SQLite database file: `<app_cache_dir>/career-log.db`.
pub fn db_path() -> Option<PathBuf> {
    app_cache_dir().map(|d| d.join("career-log.db"))
}
