//! Joint identifiers.
//!
//! A skeleton sensor reports up to twenty points per body ([`SensorJoint`]),
//! but authentication only ever looks at the eight upper-limb points named
//! by [`JointId`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of joints that take part in gesture matching.
pub const JOINT_COUNT: usize = 8;

/// The eight tracked points used for gesture authentication.
///
/// The declaration order is the storage order used by
/// [`Frame`][crate::Frame] and [`Gesture`][crate::Gesture].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JointId {
    HandLeft,
    WristLeft,
    ElbowLeft,
    HandRight,
    WristRight,
    ElbowRight,
    ShoulderLeft,
    ShoulderRight,
}

impl JointId {
    /// Every tracked joint in storage order.
    pub const ALL: [JointId; JOINT_COUNT] = [
        JointId::HandLeft,
        JointId::WristLeft,
        JointId::ElbowLeft,
        JointId::HandRight,
        JointId::WristRight,
        JointId::ElbowRight,
        JointId::ShoulderLeft,
        JointId::ShoulderRight,
    ];

    /// Position of this joint inside a fixed `[_; JOINT_COUNT]` array.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Map a sensor joint to its tracked counterpart.
    ///
    /// Returns `None` for joints that are not used for matching (head,
    /// spine, hips, legs, ...).
    pub fn from_sensor(joint: SensorJoint) -> Option<Self> {
        match joint {
            SensorJoint::HandLeft => Some(JointId::HandLeft),
            SensorJoint::WristLeft => Some(JointId::WristLeft),
            SensorJoint::ElbowLeft => Some(JointId::ElbowLeft),
            SensorJoint::HandRight => Some(JointId::HandRight),
            SensorJoint::WristRight => Some(JointId::WristRight),
            SensorJoint::ElbowRight => Some(JointId::ElbowRight),
            SensorJoint::ShoulderLeft => Some(JointId::ShoulderLeft),
            SensorJoint::ShoulderRight => Some(JointId::ShoulderRight),
            _ => None,
        }
    }

    /// The sensor joint this tracked joint is read from.
    pub fn sensor_joint(self) -> SensorJoint {
        match self {
            JointId::HandLeft => SensorJoint::HandLeft,
            JointId::WristLeft => SensorJoint::WristLeft,
            JointId::ElbowLeft => SensorJoint::ElbowLeft,
            JointId::HandRight => SensorJoint::HandRight,
            JointId::WristRight => SensorJoint::WristRight,
            JointId::ElbowRight => SensorJoint::ElbowRight,
            JointId::ShoulderLeft => SensorJoint::ShoulderLeft,
            JointId::ShoulderRight => SensorJoint::ShoulderRight,
        }
    }
}

impl fmt::Display for JointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JointId::HandLeft => "hand_left",
            JointId::WristLeft => "wrist_left",
            JointId::ElbowLeft => "elbow_left",
            JointId::HandRight => "hand_right",
            JointId::WristRight => "wrist_right",
            JointId::ElbowRight => "elbow_right",
            JointId::ShoulderLeft => "shoulder_left",
            JointId::ShoulderRight => "shoulder_right",
        };
        f.write_str(name)
    }
}

/// Full twenty-point skeleton as reported by a depth sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorJoint {
    HipCenter,
    Spine,
    ShoulderCenter,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_follow_declaration_order() {
        for (i, joint) in JointId::ALL.iter().enumerate() {
            assert_eq!(joint.index(), i);
        }
    }

    #[test]
    fn sensor_mapping_roundtrips_for_tracked_joints() {
        for joint in JointId::ALL {
            assert_eq!(JointId::from_sensor(joint.sensor_joint()), Some(joint));
        }
    }

    #[test]
    fn untracked_sensor_joints_are_discarded() {
        assert_eq!(JointId::from_sensor(SensorJoint::Head), None);
        assert_eq!(JointId::from_sensor(SensorJoint::HipCenter), None);
        assert_eq!(JointId::from_sensor(SensorJoint::FootRight), None);
    }

    #[test]
    fn display_uses_snake_case() {
        assert_eq!(JointId::ShoulderRight.to_string(), "shoulder_right");
    }
}
