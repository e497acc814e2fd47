//! `kinauth-hal` – the boundary between motion sensors and the rest of the
//! stack.
//!
//! # Modules
//!
//! - [`sensor`] – [`FrameSink`][sensor::FrameSink], the callback seam every
//!   sensor driver pushes [`SkeletonFrame`][kinauth_types::SkeletonFrame]s
//!   into, and [`SensorStatus`][sensor::SensorStatus].
//! - [`sim`] – [`SimPerformer`][sim::SimPerformer], a scripted synthetic
//!   user that streams skeleton frames at a fixed rate so the full stack can
//!   run in tests and demos without hardware.

pub mod sensor;
pub mod sim;

pub use sensor::{FrameSink, SensorStatus};
pub use sim::{ArmPose, MotionScript, SimPerformer};
