//! Per-tick skeleton data: what the sensor delivers ([`SkeletonFrame`],
//! [`Body`]) and what the matcher consumes ([`RawFrame`], [`Frame`]).

use serde::{Deserialize, Serialize};

use crate::joint::{JOINT_COUNT, JointId, SensorJoint};
use crate::point::Point3;

/// How confidently the sensor is following a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingState {
    /// Every joint is being tracked.
    Tracked,
    /// Only a coarse body position is known; joints are unreliable.
    PositionOnly,
    /// The subject slot is empty or lost.
    NotTracked,
}

/// One subject as seen by the sensor during a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Sensor-assigned identifier, stable while the subject stays in view.
    pub tracking_id: u64,
    pub tracking_state: TrackingState,
    /// Absolute sensor-space joint positions (metres). May contain joints
    /// that are irrelevant for authentication.
    pub joints: Vec<(SensorJoint, Point3)>,
}

impl Body {
    pub fn new(tracking_id: u64, tracking_state: TrackingState) -> Self {
        Self {
            tracking_id,
            tracking_state,
            joints: Vec::new(),
        }
    }

    /// Builder-style helper to append a reported joint.
    pub fn with_joint(mut self, joint: SensorJoint, position: Point3) -> Self {
        self.joints.push((joint, position));
        self
    }

    pub fn is_tracked(&self) -> bool {
        self.tracking_state == TrackingState::Tracked
    }

    /// Keep the eight tracked joints and discard everything else.
    ///
    /// When the sensor reports a joint twice the last report wins.
    pub fn raw_frame(&self) -> RawFrame {
        let mut raw = RawFrame::default();
        for (joint, position) in &self.joints {
            if let Some(id) = JointId::from_sensor(*joint) {
                raw.set(id, *position);
            }
        }
        raw
    }
}

/// Everything the sensor reported during one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkeletonFrame {
    /// Monotonic tick counter assigned by the sensor driver.
    pub sequence: u64,
    pub bodies: Vec<Body>,
}

impl SkeletonFrame {
    pub fn new(sequence: u64, bodies: Vec<Body>) -> Self {
        Self { sequence, bodies }
    }

    /// The first fully tracked subject, if any. Authentication assumes a
    /// single user in front of the sensor.
    pub fn first_tracked(&self) -> Option<&Body> {
        self.bodies.iter().find(|b| b.is_tracked())
    }
}

/// Tracked joints in absolute sensor space, possibly incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawFrame {
    joints: [Option<Point3>; JOINT_COUNT],
}

impl RawFrame {
    pub fn get(&self, joint: JointId) -> Option<Point3> {
        self.joints[joint.index()]
    }

    pub fn set(&mut self, joint: JointId, position: Point3) {
        self.joints[joint.index()] = Some(position);
    }

    /// Builder-style variant of [`RawFrame::set`].
    pub fn with(mut self, joint: JointId, position: Point3) -> Self {
        self.set(joint, position);
        self
    }

    /// First joint (in storage order) that was not reported.
    pub fn first_missing(&self) -> Option<JointId> {
        JointId::ALL.into_iter().find(|j| self.get(*j).is_none())
    }
}

/// A complete set of the eight tracked joints at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    joints: [Point3; JOINT_COUNT],
}

impl Frame {
    pub fn from_fn(mut f: impl FnMut(JointId) -> Point3) -> Self {
        Self {
            joints: JointId::ALL.map(&mut f),
        }
    }

    pub fn get(&self, joint: JointId) -> Point3 {
        self.joints[joint.index()]
    }

    /// Iterate `(joint, position)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (JointId, Point3)> + '_ {
        JointId::ALL.into_iter().map(move |j| (j, self.get(j)))
    }
}
