//! [`GestureRecorder`] – accumulates normalized frames for one recording
//! window.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start()──▶ Recording ──stop()──▶ Idle   (returns the Gesture)
//!                      │
//!                      └─ accept() fails ──▶ Poisoned ──stop()──▶ Idle (returns the error)
//! ```
//!
//! Bodies that are not fully tracked are dropped silently; that is a filter,
//! not an error. A frame that cannot be normalized poisons the whole window
//! so that no partially recorded gesture is ever returned.
//!
//! # Example
//!
//! ```rust
//! use kinauth_perception::recorder::GestureRecorder;
//! use kinauth_types::{AuthError, Body, TrackingState};
//!
//! let mut recorder = GestureRecorder::new();
//! recorder.start();
//!
//! // Not tracked: ignored.
//! let ghost = Body::new(1, TrackingState::PositionOnly);
//! assert_eq!(recorder.accept(&ghost), Ok(false));
//!
//! // Nothing was accepted, so the window produced no gesture.
//! assert_eq!(recorder.stop(), Err(AuthError::TrackingUnavailable));
//! ```

use kinauth_types::{AuthError, Body, Gesture, NormalizationError, SkeletonFrame};
use tracing::{debug, warn};

use crate::normalizer::normalize;

#[derive(Debug, Default)]
enum RecorderState {
    #[default]
    Idle,
    Recording(Gesture),
    Poisoned(NormalizationError),
}

/// Owns exactly one in-progress [`Gesture`] while a recording window is
/// open.
#[derive(Debug, Default)]
pub struct GestureRecorder {
    state: RecorderState,
}

impl GestureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a window with a fresh, empty gesture. Any previous in-progress
    /// or poisoned state is discarded.
    pub fn start(&mut self) {
        self.state = RecorderState::Recording(Gesture::new());
    }

    /// `true` while a window is open (including a poisoned one).
    pub fn is_recording(&self) -> bool {
        !matches!(self.state, RecorderState::Idle)
    }

    /// Number of frames appended in the current window.
    pub fn frames_recorded(&self) -> usize {
        match &self.state {
            RecorderState::Recording(g) => g.len(),
            _ => 0,
        }
    }

    /// Offer one body to the recorder.
    ///
    /// Returns `Ok(true)` when the body was normalized and appended, and
    /// `Ok(false)` when it was dropped (not tracked, no window open, or the
    /// window is already poisoned).
    ///
    /// # Errors
    ///
    /// Returns the [`NormalizationError`] that poisoned the window.
    pub fn accept(&mut self, body: &Body) -> Result<bool, NormalizationError> {
        let RecorderState::Recording(gesture) = &mut self.state else {
            return Ok(false);
        };
        if !body.is_tracked() {
            debug!(tracking_id = body.tracking_id, state = ?body.tracking_state, "dropping untracked body");
            return Ok(false);
        }

        match normalize(&body.raw_frame()) {
            Ok(frame) => {
                gesture.push_frame(&frame);
                Ok(true)
            }
            Err(e) => {
                warn!(tracking_id = body.tracking_id, error = %e, "normalization failed; recording window poisoned");
                self.state = RecorderState::Poisoned(e.clone());
                Err(e)
            }
        }
    }

    /// Offer a whole sensor tick; only its first fully tracked body is used.
    pub fn accept_skeleton(&mut self, frame: &SkeletonFrame) -> Result<bool, NormalizationError> {
        match frame.first_tracked() {
            Some(body) => self.accept(body),
            None => Ok(false),
        }
    }

    /// Close the window and hand back an independent copy of the gesture.
    /// The recorder returns to idle in every case.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NoActiveRecording`] – no window was open.
    /// - [`AuthError::Normalization`] – the window was poisoned.
    /// - [`AuthError::TrackingUnavailable`] – no frame was accepted.
    pub fn stop(&mut self) -> Result<Gesture, AuthError> {
        match std::mem::take(&mut self.state) {
            RecorderState::Idle => Err(AuthError::NoActiveRecording),
            RecorderState::Poisoned(e) => Err(AuthError::Normalization(e)),
            RecorderState::Recording(g) if g.is_empty() => Err(AuthError::TrackingUnavailable),
            RecorderState::Recording(g) => {
                debug!(frames = g.len(), "recording window closed");
                Ok(g)
            }
        }
    }

    /// Discard the window without producing a gesture.
    pub fn abort(&mut self) {
        if self.is_recording() {
            debug!(frames = self.frames_recorded(), "recording window aborted");
        }
        self.state = RecorderState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinauth_types::{JointId, Point3, SensorJoint, TrackingState};

    fn body(state: TrackingState, hand_y: f32) -> Body {
        let mut b = Body::new(42, state)
            .with_joint(SensorJoint::Head, Point3::new(0.0, 1.7, 2.0))
            .with_joint(SensorJoint::ShoulderLeft, Point3::new(-0.2, 1.4, 2.0))
            .with_joint(SensorJoint::ShoulderRight, Point3::new(0.2, 1.4, 2.0));
        for joint in [
            SensorJoint::HandLeft,
            SensorJoint::WristLeft,
            SensorJoint::ElbowLeft,
            SensorJoint::WristRight,
            SensorJoint::ElbowRight,
        ] {
            b = b.with_joint(joint, Point3::new(0.1, 1.0, 2.0));
        }
        b.with_joint(SensorJoint::HandRight, Point3::new(0.3, hand_y, 2.0))
    }

    fn degenerate_body() -> Body {
        let mut b = body(TrackingState::Tracked, 1.0);
        b.joints.retain(|(j, _)| *j != SensorJoint::ShoulderRight);
        b.with_joint(SensorJoint::ShoulderRight, Point3::new(-0.2, 1.4, 2.0))
    }

    #[test]
    fn records_tracked_frames_in_order() {
        let mut rec = GestureRecorder::new();
        rec.start();
        assert_eq!(rec.accept(&body(TrackingState::Tracked, 1.0)), Ok(true));
        assert_eq!(rec.accept(&body(TrackingState::Tracked, 1.4)), Ok(true));
        assert_eq!(rec.frames_recorded(), 2);

        let g = rec.stop().unwrap();
        assert_eq!(g.len(), 2);
        let ys: Vec<f32> = g.series(JointId::HandRight).iter().map(|p| p.y).collect();
        assert!(ys[0] < ys[1]);
        assert!(g.validate().is_ok());
        assert!(!rec.is_recording());
    }

    #[test]
    fn untracked_bodies_are_silently_dropped() {
        let mut rec = GestureRecorder::new();
        rec.start();
        assert_eq!(rec.accept(&body(TrackingState::PositionOnly, 1.0)), Ok(false));
        assert_eq!(rec.accept(&body(TrackingState::NotTracked, 1.0)), Ok(false));
        assert_eq!(rec.accept(&body(TrackingState::Tracked, 1.0)), Ok(true));
        assert_eq!(rec.stop().unwrap().len(), 1);
    }

    #[test]
    fn frames_outside_a_window_are_ignored() {
        let mut rec = GestureRecorder::new();
        assert_eq!(rec.accept(&body(TrackingState::Tracked, 1.0)), Ok(false));
        assert_eq!(rec.stop(), Err(AuthError::NoActiveRecording));
    }

    #[test]
    fn empty_window_reports_tracking_unavailable() {
        let mut rec = GestureRecorder::new();
        rec.start();
        assert_eq!(rec.stop(), Err(AuthError::TrackingUnavailable));
    }

    #[test]
    fn degenerate_frame_poisons_the_window() {
        let mut rec = GestureRecorder::new();
        rec.start();
        rec.accept(&body(TrackingState::Tracked, 1.0)).unwrap();
        assert!(rec.accept(&degenerate_body()).is_err());
        // Later good frames do not resurrect the window.
        assert_eq!(rec.accept(&body(TrackingState::Tracked, 1.0)), Ok(false));
        assert!(matches!(
            rec.stop(),
            Err(AuthError::Normalization(NormalizationError::DegenerateShoulders { .. }))
        ));
        assert!(!rec.is_recording());
    }

    #[test]
    fn start_clears_poisoned_state() {
        let mut rec = GestureRecorder::new();
        rec.start();
        let _ = rec.accept(&degenerate_body());
        rec.start();
        rec.accept(&body(TrackingState::Tracked, 1.0)).unwrap();
        assert_eq!(rec.stop().unwrap().len(), 1);
    }

    #[test]
    fn stopped_gesture_is_independent_of_next_window() {
        let mut rec = GestureRecorder::new();
        rec.start();
        rec.accept(&body(TrackingState::Tracked, 1.0)).unwrap();
        let first = rec.stop().unwrap();

        rec.start();
        rec.accept(&body(TrackingState::Tracked, 1.2)).unwrap();
        rec.accept(&body(TrackingState::Tracked, 1.3)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(rec.frames_recorded(), 2);
    }

    #[test]
    fn accept_skeleton_uses_first_tracked_body() {
        let mut rec = GestureRecorder::new();
        rec.start();
        let tick = SkeletonFrame::new(
            1,
            vec![body(TrackingState::PositionOnly, 0.0), body(TrackingState::Tracked, 1.8)],
        );
        assert_eq!(rec.accept_skeleton(&tick), Ok(true));
        assert_eq!(rec.accept_skeleton(&SkeletonFrame::default()), Ok(false));
        let g = rec.stop().unwrap();
        assert!((g.position(JointId::HandRight, 0).y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn abort_discards_partial_gesture() {
        let mut rec = GestureRecorder::new();
        rec.start();
        rec.accept(&body(TrackingState::Tracked, 1.0)).unwrap();
        rec.abort();
        assert!(!rec.is_recording());
        assert_eq!(rec.stop(), Err(AuthError::NoActiveRecording));
    }
}
