//! `kinauth-types` – shared data model for gesture authentication.
//!
//! # Modules
//!
//! - [`joint`] – [`JointId`], the eight tracked upper-limb joints, and
//!   [`SensorJoint`], the full skeleton a sensor may report.
//! - [`point`] – [`Point3`] vector math.
//! - [`frame`] – per-tick sensor data ([`SkeletonFrame`], [`Body`]) and the
//!   complete / incomplete joint maps ([`Frame`], [`RawFrame`]).
//! - [`gesture`] – [`Gesture`] time series and the positional
//!   [`GestureSet`].
//! - [`attempt`] – [`Verdict`] and [`AttemptReport`].
//! - [`error`] – [`AuthError`] and [`NormalizationError`].

pub mod attempt;
pub mod error;
pub mod frame;
pub mod gesture;
pub mod joint;
pub mod point;

pub use attempt::{AttemptReport, PositionScore, Verdict};
pub use error::{AuthError, NormalizationError};
pub use frame::{Body, Frame, RawFrame, SkeletonFrame, TrackingState};
pub use gesture::{Gesture, GestureSet, MAX_GESTURES};
pub use joint::{JOINT_COUNT, JointId, SensorJoint};
pub use point::Point3;
