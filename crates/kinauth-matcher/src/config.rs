//! Tunables for [`DtwMatcher`][crate::dtw::DtwMatcher].

use kinauth_types::AuthError;
use serde::{Deserialize, Serialize};

/// DTW matching thresholds.
///
/// Every field has a named default so a partially specified `[dtw]` table
/// deserializes cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DtwConfig {
    /// Maximum number of horizontal (or vertical) moves allowed between two
    /// diagonal moves of the warping path.
    #[serde(default = "default_max_slope")]
    pub max_slope: usize,

    /// Final poses farther apart than this (combined joint distance, in
    /// shoulder widths) are not scored at all.
    #[serde(default = "default_position_threshold")]
    pub position_threshold: f64,

    /// Normalized DTW scores strictly below this are a match.
    #[serde(default = "default_recognition_threshold")]
    pub recognition_threshold: f64,
}

fn default_max_slope() -> usize {
    2
}
fn default_position_threshold() -> f64 {
    1.2
}
fn default_recognition_threshold() -> f64 {
    1.0
}

impl Default for DtwConfig {
    fn default() -> Self {
        Self {
            max_slope: default_max_slope(),
            position_threshold: default_position_threshold(),
            recognition_threshold: default_recognition_threshold(),
        }
    }
}

impl DtwConfig {
    /// # Errors
    ///
    /// [`AuthError::InvalidConfig`] if `max_slope` is zero or a threshold is
    /// not a positive finite number.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.max_slope == 0 {
            return Err(AuthError::InvalidConfig(
                "dtw.max_slope must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("dtw.position_threshold", self.position_threshold),
            ("dtw.recognition_threshold", self.recognition_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AuthError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = DtwConfig::default();
        assert_eq!(cfg.max_slope, 2);
        assert!((cfg.position_threshold - 1.2).abs() < f64::EPSILON);
        assert!((cfg.recognition_threshold - 1.0).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_table_fills_defaults() {
        let cfg: DtwConfig = toml::from_str("max_slope = 4").unwrap();
        assert_eq!(cfg.max_slope, 4);
        assert!((cfg.recognition_threshold - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_slope_is_rejected() {
        let cfg = DtwConfig {
            max_slope: 0,
            ..DtwConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(AuthError::InvalidConfig(_))));
    }

    #[test]
    fn non_positive_threshold_is_rejected() {
        let cfg = DtwConfig {
            recognition_threshold: 0.0,
            ..DtwConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = DtwConfig {
            position_threshold: f64::NAN,
            ..DtwConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
