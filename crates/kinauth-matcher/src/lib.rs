//! `kinauth-matcher` – decides whether two gestures are the same motion.
//!
//! # Modules
//!
//! - [`config`] – [`DtwConfig`][config::DtwConfig]: slope limit and the two
//!   thresholds, deserializable from a `[dtw]` TOML table.
//! - [`dtw`] – [`DtwMatcher`][dtw::DtwMatcher]: slope-constrained Dynamic
//!   Time Warping over the eight joint series, with a cheap final-pose
//!   pre-filter in front of it.

pub mod config;
pub mod dtw;

pub use config::DtwConfig;
pub use dtw::{DtwMatcher, MatchOutcome, dtw_distance, snapshot_distance};
