// crates/core/src/analysis.rs
//! Conversation analysis: turn a chat transcript into per-dimension
//! satisfaction deltas using a language model.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::conversation::ConversationRecord;
use crate::llm::{CompletionRequest, LlmError, LlmProvider};
use crate::satisfaction::{Dimensions, NewSatisfactionEvent};

/// Bound of a single analysis score, in both directions.
pub const MAX_ANALYSIS_DELTA: f64 = 10.0;

const ANALYSIS_MAX_TOKENS: u32 = 256;

/// Instruction sent as the system prompt for every analysis.
pub const ANALYSIS_PROMPT: &str = r#"You analyze a conversation between a counsellor (assistant) and a client (user) and rate the client's job satisfaction.
Using the conversation, score the client on the following six dimensions.

Dimensions:
1. workload: amount of work and sense of achievement at work
2. compensation: financial rewards from the company
3. growth: career and personal growth at the company
4. workEnvironment: work-life balance at the company
5. workRelationships: relationships with colleagues
6. workValues: value of the work and how it fits the client's direction in life

Scoring:
- Give each dimension a score between -10 and +10
- 0: not mentioned or neutral
- Positive: favorable experience (up to +10)
- Negative: unfavorable experience (down to -10)

Response format:
Reply with a JSON object of exactly this shape:
{
    "workload": 0,
    "compensation": 0,
    "growth": 0,
    "workEnvironment": 0,
    "workRelationships": 0,
    "workValues": 0
}

Notes:
- Do not score the counsellor's (assistant) messages; only the client's (user) messages count
- Dimensions that are not clearly mentioned score 0
- Scale the score with the strength of the emotion expressed

The conversation to analyze follows."#;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis unavailable: {0}")]
    Unavailable(#[from] LlmError),

    #[error("malformed analysis response: {0}")]
    MalformedResponse(String),

    #[error("conversation {0} has no messages")]
    EmptyConversation(String),
}

impl AnalysisError {
    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "unavailable",
            Self::MalformedResponse(_) => "malformed",
            Self::EmptyConversation(_) => "empty",
        }
    }
}

/// Scores a conversation transcript through an [`LlmProvider`].
#[derive(Clone)]
pub struct ConversationAnalyzer {
    provider: Arc<dyn LlmProvider>,
}

impl ConversationAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Analyze one conversation and build the resulting delta event.
    pub async fn analyze(
        &self,
        conversation: &ConversationRecord,
    ) -> Result<NewSatisfactionEvent, AnalysisError> {
        if conversation.messages.is_empty() {
            return Err(AnalysisError::EmptyConversation(conversation.id.clone()));
        }

        let request = CompletionRequest::new(conversation.transcript())
            .with_system_prompt(ANALYSIS_PROMPT)
            .with_max_tokens(ANALYSIS_MAX_TOKENS)
            .json();

        let response = self.provider.complete(request).await?;
        let deltas = parse_analysis_response(&response.content)?;

        tracing::debug!(
            conversation_id = %conversation.id,
            latency_ms = response.latency_ms,
            "conversation analyzed"
        );

        Ok(NewSatisfactionEvent::chat_analysis(
            conversation.user_id.clone(),
            deltas,
            conversation.id.clone(),
        ))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisScores {
    workload: f64,
    compensation: f64,
    growth: f64,
    work_environment: f64,
    work_relationships: f64,
    work_values: f64,
}

/// Parse the model's reply into six deltas clamped to [-10, 10].
///
/// Accepts a bare JSON object, or one wrapped in a markdown code fence or
/// surrounded by prose. All six fields must be present and numeric.
pub fn parse_analysis_response(content: &str) -> Result<Dimensions, AnalysisError> {
    let json = extract_json_object(content).ok_or_else(|| {
        AnalysisError::MalformedResponse(format!(
            "no JSON object in response: {}",
            content.chars().take(200).collect::<String>()
        ))
    })?;

    let scores: AnalysisScores = serde_json::from_str(json)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

    let deltas = Dimensions {
        workload: scores.workload,
        compensation: scores.compensation,
        growth: scores.growth,
        work_environment: scores.work_environment,
        work_relationships: scores.work_relationships,
        work_values: scores.work_values,
    };
    Ok(deltas.map(|v| v.clamp(-MAX_ANALYSIS_DELTA, MAX_ANALYSIS_DELTA)))
}

/// Slice out the first balanced `{...}` block of `text`.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
