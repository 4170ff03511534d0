// crates/db/src/queries/mod.rs
// Satisfaction, importance and conversation operations for the career-log database.

pub(crate) mod row_types;
pub(crate) mod conversations;
pub(crate) mod importance;
pub(crate) mod satisfaction;
