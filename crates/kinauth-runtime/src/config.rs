//! [`AuthConfig`] – tunables for enrollment and login.

use std::time::Duration;

use kinauth_matcher::DtwConfig;
use kinauth_types::{AuthError, MAX_GESTURES};
use serde::{Deserialize, Serialize};

pub const MIN_RECORDING_SECONDS: u64 = 1;
pub const MAX_RECORDING_SECONDS: u64 = 10;

/// Authentication settings. Deserializes from TOML; missing keys take their
/// documented defaults.
///
/// ```toml
/// num_gestures = 3
/// recording_seconds = 4
///
/// [dtw]
/// recognition_threshold = 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Gestures per enrollment, `1..=10`.
    #[serde(default = "default_num_gestures")]
    pub num_gestures: usize,

    /// Length of each recording window, `1..=10` seconds.
    #[serde(default = "default_recording_seconds")]
    pub recording_seconds: u64,

    /// How long to wait for a fully tracked subject before a window.
    #[serde(default = "default_tracking_timeout_secs")]
    pub tracking_timeout_secs: u64,

    /// Pause after showing the retry message.
    #[serde(default = "default_failure_notice_ms")]
    pub failure_notice_ms: u64,

    #[serde(default)]
    pub dtw: DtwConfig,
}

fn default_num_gestures() -> usize {
    1
}
fn default_recording_seconds() -> u64 {
    5
}
fn default_tracking_timeout_secs() -> u64 {
    10
}
fn default_failure_notice_ms() -> u64 {
    2000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            num_gestures: default_num_gestures(),
            recording_seconds: default_recording_seconds(),
            tracking_timeout_secs: default_tracking_timeout_secs(),
            failure_notice_ms: default_failure_notice_ms(),
            dtw: DtwConfig::default(),
        }
    }
}

impl AuthConfig {
    /// # Errors
    ///
    /// [`AuthError::InvalidConfig`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), AuthError> {
        if !(1..=MAX_GESTURES).contains(&self.num_gestures) {
            return Err(AuthError::InvalidConfig(format!(
                "num_gestures must be between 1 and {MAX_GESTURES}, got {}",
                self.num_gestures
            )));
        }
        if !(MIN_RECORDING_SECONDS..=MAX_RECORDING_SECONDS).contains(&self.recording_seconds) {
            return Err(AuthError::InvalidConfig(format!(
                "recording_seconds must be between {MIN_RECORDING_SECONDS} and \
                 {MAX_RECORDING_SECONDS}, got {}",
                self.recording_seconds
            )));
        }
        if self.tracking_timeout_secs == 0 {
            return Err(AuthError::InvalidConfig(
                "tracking_timeout_secs must be at least 1".to_string(),
            ));
        }
        self.dtw.validate()
    }

    pub fn recording_window(&self) -> Duration {
        Duration::from_secs(self.recording_seconds)
    }

    pub fn tracking_timeout(&self) -> Duration {
        Duration::from_secs(self.tracking_timeout_secs)
    }

    pub fn failure_notice(&self) -> Duration {
        Duration::from_millis(self.failure_notice_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = AuthConfig::default();
        assert_eq!(cfg.num_gestures, 1);
        assert_eq!(cfg.recording_window(), Duration::from_secs(5));
        assert_eq!(cfg.failure_notice(), Duration::from_secs(2));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: AuthConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, AuthConfig::default());
    }

    #[test]
    fn nested_dtw_table_is_read() {
        let cfg: AuthConfig = toml::from_str(
            "num_gestures = 3\n[dtw]\nrecognition_threshold = 0.8\n",
        )
        .unwrap();
        assert_eq!(cfg.num_gestures, 3);
        assert!((cfg.dtw.recognition_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(cfg.dtw.max_slope, 2);
    }

    #[test]
    fn gesture_count_bounds() {
        for n in [0, MAX_GESTURES + 1] {
            let cfg = AuthConfig {
                num_gestures: n,
                ..AuthConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(AuthError::InvalidConfig(_))));
        }
        let cfg = AuthConfig {
            num_gestures: MAX_GESTURES,
            ..AuthConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn recording_seconds_bounds() {
        for s in [0, 11] {
            let cfg = AuthConfig {
                recording_seconds: s,
                ..AuthConfig::default()
            };
            assert!(cfg.validate().is_err());
        }
    }

    #[test]
    fn invalid_dtw_table_is_reported() {
        let cfg = AuthConfig {
            dtw: DtwConfig {
                max_slope: 0,
                ..DtwConfig::default()
            },
            ..AuthConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
