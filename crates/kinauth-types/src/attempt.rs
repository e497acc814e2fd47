//! Outcome records for login attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Result of a well-formed login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Every candidate matched its reference.
    Accepted,
    /// The candidate at `position` did not match; later positions were not
    /// compared.
    Rejected { position: usize },
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// Score of one positional comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionScore {
    pub position: usize,
    /// Normalized DTW score, `None` when the final-pose pre-filter pruned
    /// the pair.
    pub score: Option<f64>,
    pub matched: bool,
}

/// Full record of one login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub verdict: Verdict,
    /// Comparisons actually performed, in index order.
    pub scores: Vec<PositionScore>,
}
