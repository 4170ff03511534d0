//! Prefixed, time-sortable record identifiers.

use ulid::Ulid;

pub const JOB_SATISFACTION_PREFIX: &str = "USR_JOB_SAT";
pub const IMPORTANCE_PREFIX: &str = "USR_JOB_SAT_IMP";
pub const SATISFACTION_EVENT_PREFIX: &str = "JOB_SAT_UPDATE_EVENT";
pub const CHAT_SET_PREFIX: &str = "CH_SET";
pub const MESSAGE_PREFIX: &str = "MSG";

/// Generate an identifier of the form `PREFIX_<ULID>`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Ulid::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_has_prefix() {
        let id = generate_id(SATISFACTION_EVENT_PREFIX);
        assert!(id.starts_with("JOB_SAT_UPDATE_EVENT_"));
        assert_eq!(id.len(), "JOB_SAT_UPDATE_EVENT_".len() + 26);
    }

    #[test]
    fn test_generate_id_unique() {
        let a = generate_id(CHAT_SET_PREFIX);
        let b = generate_id(CHAT_SET_PREFIX);
        assert_ne!(a, b);
    }
}
