use thiserror::Error;

use crate::joint::JointId;

/// Why a raw skeleton frame could not be normalized.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("joint {0} missing from tracked frame")]
    MissingJoint(JointId),

    #[error("degenerate shoulder geometry: shoulder distance {distance}")]
    DegenerateShoulders { distance: f32 },

    #[error("non-finite coordinate for joint {0}")]
    NonFinite(JointId),
}

/// Error type spanning capture, normalization, matching, and sequencing.
///
/// A genuine gesture mismatch is not an error; it is reported as
/// [`Verdict::Rejected`][crate::Verdict::Rejected].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("no fully tracked subject within the recording window")]
    TrackingUnavailable,

    #[error("normalization failed: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("gesture invariant violated: {joint} has {found} samples, expected {expected}")]
    LengthMismatch {
        joint: JointId,
        expected: usize,
        found: usize,
    },

    #[error("gesture set size mismatch: expected {expected}, found {found}")]
    SetSizeMismatch { expected: usize, found: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no reference gestures enrolled")]
    NotEnrolled,

    #[error("a recording window is already open")]
    RecordingBusy,

    #[error("no recording window is open")]
    NoActiveRecording,

    #[error("operation cancelled")]
    Cancelled,
}

impl AuthError {
    /// `true` for faults that abort only the current attempt and can be
    /// retried by the user.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::TrackingUnavailable | AuthError::Normalization(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_joint() {
        let err = AuthError::LengthMismatch {
            joint: JointId::HandLeft,
            expected: 30,
            found: 29,
        };
        let text = err.to_string();
        assert!(text.contains("hand_left"));
        assert!(text.contains("29"));
    }

    #[test]
    fn normalization_error_converts() {
        let err: AuthError = NormalizationError::DegenerateShoulders { distance: 0.0 }.into();
        assert!(err.to_string().contains("degenerate shoulder"));
        assert!(err.is_retryable());
    }

    #[test]
    fn invariant_violations_are_not_retryable() {
        let err = AuthError::LengthMismatch {
            joint: JointId::HandLeft,
            expected: 1,
            found: 2,
        };
        assert!(!err.is_retryable());
        assert!(!AuthError::Cancelled.is_retryable());
    }
}
