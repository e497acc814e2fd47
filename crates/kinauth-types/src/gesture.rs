//! Recorded gestures and the positional reference/candidate set.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::frame::Frame;
use crate::joint::{JOINT_COUNT, JointId};
use crate::point::Point3;

/// Largest number of gestures a single identity may enroll.
pub const MAX_GESTURES: usize = 10;

/// A normalized multi-joint time series: one position sequence per tracked
/// joint.
///
/// Every series has the same length. [`Gesture::push_frame`] is the only
/// mutation and always appends to all eight series at once; gestures built
/// from external data go through [`Gesture::from_series`], which rejects
/// unequal lengths.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Gesture {
    series: [Vec<Point3>; JOINT_COUNT],
}

impl Gesture {
    /// An empty gesture with no samples.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a gesture from per-joint series.
    ///
    /// # Errors
    ///
    /// [`AuthError::LengthMismatch`] if the series differ in length.
    pub fn from_series(series: [Vec<Point3>; JOINT_COUNT]) -> Result<Self, AuthError> {
        let gesture = Self { series };
        gesture.validate()?;
        Ok(gesture)
    }

    /// Build a gesture from a sequence of complete frames.
    pub fn from_frames<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> Self {
        let mut gesture = Self::new();
        for frame in frames {
            gesture.push_frame(frame);
        }
        gesture
    }

    /// Append one normalized frame to every joint series.
    pub fn push_frame(&mut self, frame: &Frame) {
        for (joint, position) in frame.iter() {
            self.series[joint.index()].push(position);
        }
    }

    /// Number of recorded time steps.
    pub fn len(&self) -> usize {
        self.series[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The time series recorded for `joint`.
    pub fn series(&self, joint: JointId) -> &[Point3] {
        &self.series[joint.index()]
    }

    /// Position of `joint` at time step `step`.
    ///
    /// # Panics
    ///
    /// Panics if `step >= self.len()`.
    pub fn position(&self, joint: JointId, step: usize) -> Point3 {
        self.series[joint.index()][step]
    }

    /// Check the equal-length invariant.
    ///
    /// # Errors
    ///
    /// [`AuthError::LengthMismatch`] naming the first offending joint.
    pub fn validate(&self) -> Result<(), AuthError> {
        let expected = self.series[0].len();
        for joint in JointId::ALL {
            let found = self.series[joint.index()].len();
            if found != expected {
                return Err(AuthError::LengthMismatch {
                    joint,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// Enrolled references plus the candidates of the most recent login
/// attempt. Position `i` of the candidates is only ever compared with
/// position `i` of the references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureSet {
    references: Vec<Gesture>,
    candidates: Vec<Gesture>,
}

impl GestureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the enrolled references. Clears any stale candidates.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidConfig`] if the count is outside
    ///   `1..=MAX_GESTURES`.
    /// - [`AuthError::LengthMismatch`] if a gesture violates its invariant.
    pub fn set_references(&mut self, references: Vec<Gesture>) -> Result<(), AuthError> {
        if references.is_empty() || references.len() > MAX_GESTURES {
            return Err(AuthError::InvalidConfig(format!(
                "reference count must be within 1..={MAX_GESTURES}, got {}",
                references.len()
            )));
        }
        for gesture in &references {
            gesture.validate()?;
        }
        self.references = references;
        self.candidates.clear();
        Ok(())
    }

    /// Store the candidates of a login attempt.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotEnrolled`] if there are no references.
    /// - [`AuthError::SetSizeMismatch`] if the count differs from the number
    ///   of references.
    /// - [`AuthError::LengthMismatch`] if a gesture violates its invariant.
    pub fn set_candidates(&mut self, candidates: Vec<Gesture>) -> Result<(), AuthError> {
        if self.references.is_empty() {
            return Err(AuthError::NotEnrolled);
        }
        if candidates.len() != self.references.len() {
            return Err(AuthError::SetSizeMismatch {
                expected: self.references.len(),
                found: candidates.len(),
            });
        }
        for gesture in &candidates {
            gesture.validate()?;
        }
        self.candidates = candidates;
        Ok(())
    }

    pub fn references(&self) -> &[Gesture] {
        &self.references
    }

    pub fn candidates(&self) -> &[Gesture] {
        &self.candidates
    }

    pub fn is_enrolled(&self) -> bool {
        !self.references.is_empty()
    }

    /// `(position, candidate, reference)` triples in index order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, &Gesture, &Gesture)> {
        self.candidates
            .iter()
            .zip(self.references.iter())
            .enumerate()
            .map(|(i, (c, r))| (i, c, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(v: f32) -> Frame {
        Frame::from_fn(|j| Point3::new(v, j.index() as f32, 0.0))
    }

    fn gesture(len: usize) -> Gesture {
        let frames: Vec<Frame> = (0..len).map(|i| frame(i as f32)).collect();
        Gesture::from_frames(&frames)
    }

    #[test]
    fn push_frame_appends_to_every_joint() {
        let mut g = Gesture::new();
        g.push_frame(&frame(1.0));
        g.push_frame(&frame(2.0));
        assert_eq!(g.len(), 2);
        for joint in JointId::ALL {
            assert_eq!(g.series(joint).len(), 2);
        }
        assert!(g.validate().is_ok());
    }

    #[test]
    fn from_series_rejects_unequal_lengths() {
        let mut series: [Vec<Point3>; JOINT_COUNT] = Default::default();
        for s in series.iter_mut() {
            s.push(Point3::zero());
        }
        series[JointId::ElbowRight.index()].push(Point3::zero());

        let err = Gesture::from_series(series).unwrap_err();
        assert!(matches!(
            err,
            AuthError::LengthMismatch {
                joint: JointId::ElbowRight,
                expected: 1,
                found: 2
            }
        ));
    }

    #[test]
    fn clone_is_independent() {
        let mut original = gesture(2);
        let frozen = original.clone();
        original.push_frame(&frame(9.0));
        assert_eq!(frozen.len(), 2);
        assert_eq!(original.len(), 3);
    }

    #[test]
    fn deserialized_gesture_with_bad_lengths_fails_validation() {
        let mut series: [Vec<Point3>; JOINT_COUNT] = Default::default();
        series[0].push(Point3::zero());
        let json = serde_json::json!({ "series": series }).to_string();
        let g: Gesture = serde_json::from_str(&json).unwrap();
        assert!(matches!(g.validate(), Err(AuthError::LengthMismatch { .. })));
    }

    #[test]
    fn gesture_set_enforces_bounds() {
        let mut set = GestureSet::new();
        assert!(matches!(
            set.set_references(vec![]),
            Err(AuthError::InvalidConfig(_))
        ));
        assert!(matches!(
            set.set_references(vec![gesture(1); MAX_GESTURES + 1]),
            Err(AuthError::InvalidConfig(_))
        ));
        assert!(matches!(
            set.set_candidates(vec![gesture(1)]),
            Err(AuthError::NotEnrolled)
        ));

        set.set_references(vec![gesture(2), gesture(3)]).unwrap();
        assert!(set.is_enrolled());
        assert!(matches!(
            set.set_candidates(vec![gesture(2)]),
            Err(AuthError::SetSizeMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn pairs_are_positional() {
        let mut set = GestureSet::new();
        set.set_references(vec![gesture(1), gesture(2)]).unwrap();
        set.set_candidates(vec![gesture(3), gesture(4)]).unwrap();
        let lens: Vec<(usize, usize, usize)> =
            set.pairs().map(|(i, c, r)| (i, c.len(), r.len())).collect();
        assert_eq!(lens, vec![(0, 3, 1), (1, 4, 2)]);
    }

    #[test]
    fn re_enrolling_clears_candidates() {
        let mut set = GestureSet::new();
        set.set_references(vec![gesture(1)]).unwrap();
        set.set_candidates(vec![gesture(1)]).unwrap();
        set.set_references(vec![gesture(2)]).unwrap();
        assert!(set.candidates().is_empty());
    }
}
