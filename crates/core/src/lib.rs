// crates/core/src/lib.rs
pub mod analysis;
pub mod conversation;
pub mod error;
pub mod ids;
pub mod llm;
pub mod paths;
pub mod satisfaction;
pub mod score;
pub mod validate;

pub use analysis::{parse_analysis_response, AnalysisError, ConversationAnalyzer};
pub use conversation::{ChatMessage, ConversationRecord, MessageRole};
pub use error::ValidationError;
pub use satisfaction::{
    Dimension, Dimensions, EventKind, NewSatisfactionEvent, SatisfactionEvent,
    SatisfactionImportance, SatisfactionSnapshot,
};
pub use score::{clamp_level, logistic, weighted_score};
pub use validate::Validator;
