// crates/core/src/satisfaction.rs
//! Job-satisfaction domain types: the six dimensions, snapshots, importance
//! declarations and update events.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::score::{clamp_level, weighted_score};

/// One of the six job-satisfaction dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Workload,
    Compensation,
    Growth,
    WorkEnvironment,
    WorkRelationships,
    WorkValues,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Workload,
        Dimension::Compensation,
        Dimension::Growth,
        Dimension::WorkEnvironment,
        Dimension::WorkRelationships,
        Dimension::WorkValues,
    ];

    /// Wire name, as used in JSON bodies and the analysis prompt.
    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Workload => "workload",
            Dimension::Compensation => "compensation",
            Dimension::Growth => "growth",
            Dimension::WorkEnvironment => "workEnvironment",
            Dimension::WorkRelationships => "workRelationships",
            Dimension::WorkValues => "workValues",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value for each of the six dimensions.
///
/// Used for satisfaction levels, importance weights and signed deltas alike;
/// the meaning depends on where it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub workload: f64,
    pub compensation: f64,
    pub growth: f64,
    pub work_environment: f64,
    pub work_relationships: f64,
    pub work_values: f64,
}

impl Dimensions {
    pub const ZERO: Dimensions = Dimensions::uniform(0.0);

    pub const fn uniform(value: f64) -> Self {
        Self {
            workload: value,
            compensation: value,
            growth: value,
            work_environment: value,
            work_relationships: value,
            work_values: value,
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Workload => self.workload,
            Dimension::Compensation => self.compensation,
            Dimension::Growth => self.growth,
            Dimension::WorkEnvironment => self.work_environment,
            Dimension::WorkRelationships => self.work_relationships,
            Dimension::WorkValues => self.work_values,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: f64) {
        match dimension {
            Dimension::Workload => self.workload = value,
            Dimension::Compensation => self.compensation = value,
            Dimension::Growth => self.growth = value,
            Dimension::WorkEnvironment => self.work_environment = value,
            Dimension::WorkRelationships => self.work_relationships = value,
            Dimension::WorkValues => self.work_values = value,
        }
    }

    /// Iterate `(dimension, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }

    /// Combine two sets dimension by dimension.
    pub fn zip_with(&self, other: &Dimensions, f: impl Fn(f64, f64) -> f64) -> Dimensions {
        let mut out = Dimensions::ZERO;
        for d in Dimension::ALL {
            out.set(d, f(self.get(d), other.get(d)));
        }
        out
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Dimensions {
        self.zip_with(&Dimensions::ZERO, |v, _| f(v))
    }
}

/// Kind of a satisfaction update event. Wire values are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "INIT_EVENT")]
    Init,
    #[serde(rename = "CHAT_ANALYSIS_EVENT")]
    ChatAnalysis,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Init => "INIT_EVENT",
            EventKind::ChatAnalysis => "CHAT_ANALYSIS_EVENT",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INIT_EVENT" => Ok(EventKind::Init),
            "CHAT_ANALYSIS_EVENT" => Ok(EventKind::ChatAnalysis),
            other => Err(ValidationError::UnknownEventKind(other.to_string())),
        }
    }
}

/// The current, authoritative satisfaction record for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionSnapshot {
    pub id: String,
    pub user_id: String,
    pub levels: Dimensions,
    pub importance: Dimensions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SatisfactionSnapshot {
    /// A zero-valued snapshot, the starting point of an initialization event.
    pub fn empty(id: String, user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            levels: Dimensions::ZERO,
            importance: Dimensions::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add `deltas` to every level, clamping each result to [0, 100].
    pub fn apply_deltas(&mut self, deltas: &Dimensions) {
        self.levels = self
            .levels
            .zip_with(deltas, |level, delta| clamp_level(level + delta));
    }

    /// Composite score of this snapshot.
    pub fn score(&self) -> f64 {
        weighted_score(&self.levels, &self.importance)
    }
}

/// Per-dimension importance declared once by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionImportance {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub weights: Dimensions,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event waiting to be applied by the update engine.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSatisfactionEvent {
    pub user_id: String,
    pub kind: EventKind,
    pub deltas: Dimensions,
    pub source_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewSatisfactionEvent {
    /// Initialization event carrying the user's starting levels as deltas from zero.
    pub fn init(user_id: impl Into<String>, levels: Dimensions) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::Init,
            deltas: levels,
            source_id: None,
            created_at: Utc::now(),
        }
    }

    /// Delta event derived from analyzing one conversation.
    pub fn chat_analysis(
        user_id: impl Into<String>,
        deltas: Dimensions,
        conversation_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind: EventKind::ChatAnalysis,
            deltas,
            source_id: Some(conversation_id.into()),
            created_at: Utc::now(),
        }
    }
}

/// A persisted, immutable satisfaction event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionEvent {
    pub id: String,
    /// Insertion order; breaks ties between events created in the same second.
    pub seq: i64,
    pub user_id: String,
    #[serde(rename = "eventType")]
    pub kind: EventKind,
    #[serde(flatten)]
    pub deltas: Dimensions,
    pub source_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
