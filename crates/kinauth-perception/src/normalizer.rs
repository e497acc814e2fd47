//! Spatial normalizer.
//!
//! Re-expresses one frame of tracked joints in a body-relative reference
//! frame so that gestures recorded at different distances from the sensor,
//! or by people of different build, remain comparable:
//!
//! ```text
//! center            = midpoint(shoulder_left, shoulder_right)
//! shoulder_distance = |shoulder_left - shoulder_right|
//! p'                = (p - center) / shoulder_distance
//! ```
//!
//! The output is invariant to translation and uniform scaling of the input.
//!
//! # Example
//!
//! ```rust
//! use kinauth_perception::normalizer::normalize;
//! use kinauth_types::{JointId, Point3, RawFrame};
//!
//! let mut raw = RawFrame::default();
//! for joint in JointId::ALL {
//!     raw.set(joint, Point3::new(0.0, 1.0, 2.0));
//! }
//! raw.set(JointId::ShoulderLeft, Point3::new(-0.2, 1.4, 2.0));
//! raw.set(JointId::ShoulderRight, Point3::new(0.2, 1.4, 2.0));
//!
//! let frame = normalize(&raw).unwrap();
//! assert!((frame.get(JointId::ShoulderRight).x - 0.5).abs() < 1e-6);
//! ```

use kinauth_types::{Frame, JointId, NormalizationError, Point3, RawFrame};

/// Center and scale every tracked joint relative to the shoulders.
///
/// # Errors
///
/// - [`NormalizationError::MissingJoint`] – a shoulder or any other tracked
///   joint is absent.
/// - [`NormalizationError::NonFinite`] – an input coordinate is NaN or
///   infinite.
/// - [`NormalizationError::DegenerateShoulders`] – the shoulders coincide,
///   so the scale is undefined.
pub fn normalize(raw: &RawFrame) -> Result<Frame, NormalizationError> {
    let left = require(raw, JointId::ShoulderLeft)?;
    let right = require(raw, JointId::ShoulderRight)?;

    let mut absolute = [Point3::zero(); kinauth_types::JOINT_COUNT];
    for joint in JointId::ALL {
        absolute[joint.index()] = require(raw, joint)?;
    }

    let shoulder_distance = left.distance(right);
    if !shoulder_distance.is_finite() || shoulder_distance <= 0.0 {
        return Err(NormalizationError::DegenerateShoulders {
            distance: shoulder_distance,
        });
    }

    let center = left.midpoint(right);
    let frame = Frame::from_fn(|joint| (absolute[joint.index()] - center) / shoulder_distance);

    // Huge-but-finite inputs can still overflow during the division.
    if let Some((joint, _)) = frame.iter().find(|(_, p)| !p.is_finite()) {
        return Err(NormalizationError::NonFinite(joint));
    }
    Ok(frame)
}

fn require(raw: &RawFrame, joint: JointId) -> Result<Point3, NormalizationError> {
    let p = raw.get(joint).ok_or(NormalizationError::MissingJoint(joint))?;
    if !p.is_finite() {
        return Err(NormalizationError::NonFinite(joint));
    }
    Ok(p)
}
