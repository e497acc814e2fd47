//! `kinauth-perception` – turns raw skeleton frames into gestures.
//!
//! # Modules
//!
//! - [`normalizer`] – [`normalize`][normalizer::normalize]: recentres a
//!   frame on the shoulder midpoint and scales it by shoulder width, making
//!   it invariant to where the user stands and how large they are.
//! - [`recorder`] – [`GestureRecorder`][recorder::GestureRecorder]: owns
//!   one in-progress [`Gesture`][kinauth_types::Gesture] for the duration of
//!   a recording window and appends one normalized frame per tracked tick.

pub mod normalizer;
pub mod recorder;

pub use normalizer::normalize;
pub use recorder::GestureRecorder;
