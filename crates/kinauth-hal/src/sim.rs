//! Simulated performer for tests and demos without a physical sensor.
//!
//! A [`MotionScript`] is a precomputed sequence of arm poses for one
//! synthetic subject standing in front of the sensor. [`SimPerformer`] plays
//! a list of scripts into a [`FrameSink`] at a fixed frame rate, the way a
//! driver callback thread would.
//!
//! The performer cooperates with the recording window: before the first
//! window it holds the first script's rest pose, each time a new window
//! opens it starts the next script from its first frame, and once a script
//! has run out it holds that script's final pose. When the list is exhausted
//! the last script is repeated.
//!
//! # Example
//!
//! ```rust
//! use kinauth_hal::sim::MotionScript;
//! use kinauth_types::{JointId, TrackingState};
//!
//! let script = MotionScript::raise_right_hand(30);
//! assert_eq!(script.len(), 30);
//!
//! let first = script.body_at(0).raw_frame();
//! let last = script.body_at(29).raw_frame();
//! let hand_start = first.get(JointId::HandRight).unwrap();
//! let hand_end = last.get(JointId::HandRight).unwrap();
//! assert!(hand_end.y > hand_start.y);
//! assert_eq!(script.body_at(0).tracking_state, TrackingState::Tracked);
//! ```

use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use kinauth_types::{Body, Point3, SensorJoint, SkeletonFrame, TrackingState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::sensor::{FrameSink, SensorStatus};

// ────────────────────────────────────────────────────────────────────────────
// Body geometry
// ────────────────────────────────────────────────────────────────────────────

/// Sensor-space positions of the synthetic subject's shoulders (metres).
const SHOULDER_LEFT: Point3 = Point3::new(-0.2, 1.4, 2.0);
const SHOULDER_RIGHT: Point3 = Point3::new(0.2, 1.4, 2.0);

const UPPER_ARM: f32 = 0.30;
const FOREARM: f32 = 0.25;
const HAND: f32 = 0.08;

const TRACKING_ID: u64 = 7;

/// Elevation of both arms in the frontal plane, in radians.
///
/// `0` is hanging straight down, `π / 2` is horizontal and pointing away
/// from the body, `π` is straight up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPose {
    pub left: f32,
    pub right: f32,
}

impl ArmPose {
    pub const REST: ArmPose = ArmPose { left: 0.0, right: 0.0 };

    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            left: self.left + (other.left - self.left) * t,
            right: self.right + (other.right - self.right) * t,
        }
    }
}

/// Shoulder, elbow, wrist and hand for one straight arm.
fn arm(shoulder: Point3, elevation: f32, outward: f32) -> [Point3; 4] {
    let dir = Point3::new(outward * elevation.sin(), -elevation.cos(), 0.0);
    let elbow = shoulder + dir * UPPER_ARM;
    let wrist = elbow + dir * FOREARM;
    let hand = wrist + dir * HAND;
    [shoulder, elbow, wrist, hand]
}

// ────────────────────────────────────────────────────────────────────────────
// MotionScript
// ────────────────────────────────────────────────────────────────────────────

/// A finite, frame-by-frame motion of one synthetic subject.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionScript {
    name: String,
    poses: Vec<ArmPose>,
    tracking_state: TrackingState,
    offset: Point3,
    scale: f32,
}

impl MotionScript {
    /// Piecewise-linear motion through `keys`, sampled at `frames` evenly
    /// spaced steps. The first and last frames are exactly the first and
    /// last keys. At least one frame is always produced.
    pub fn keyframes(name: impl Into<String>, keys: &[ArmPose], frames: usize) -> Self {
        let keys: &[ArmPose] = if keys.is_empty() { &[ArmPose::REST] } else { keys };
        let frames = frames.max(1);
        let segments = keys.len() - 1;

        let poses = (0..frames)
            .map(|k| {
                if segments == 0 || frames == 1 {
                    return keys[0];
                }
                let u = k as f32 / (frames - 1) as f32 * segments as f32;
                let seg = (u.floor() as usize).min(segments - 1);
                keys[seg].lerp(keys[seg + 1], u - seg as f32)
            })
            .collect();

        Self {
            name: name.into(),
            poses,
            tracking_state: TrackingState::Tracked,
            offset: Point3::zero(),
            scale: 1.0,
        }
    }

    /// Right arm swings from hanging down to straight up.
    pub fn raise_right_hand(frames: usize) -> Self {
        Self::keyframes("raise right hand", &[ArmPose::REST, ArmPose::new(0.0, PI)], frames)
    }

    /// Left arm swings from hanging down to straight up.
    pub fn raise_left_hand(frames: usize) -> Self {
        Self::keyframes("raise left hand", &[ArmPose::REST, ArmPose::new(PI, 0.0)], frames)
    }

    /// Both arms swing out to horizontal.
    pub fn spread_arms(frames: usize) -> Self {
        Self::keyframes(
            "spread arms",
            &[ArmPose::REST, ArmPose::new(PI / 2.0, PI / 2.0)],
            frames,
        )
    }

    /// Standing still with both arms down.
    pub fn idle(frames: usize) -> Self {
        Self::keyframes("idle", &[ArmPose::REST], frames)
    }

    /// A subject the sensor only sees as a coarse position.
    pub fn untracked(frames: usize) -> Self {
        Self {
            name: "untracked".to_string(),
            tracking_state: TrackingState::PositionOnly,
            ..Self::idle(frames)
        }
    }

    /// The same motion performed by someone standing `offset` metres away
    /// from the default spot.
    pub fn with_offset(mut self, offset: Point3) -> Self {
        self.offset = offset;
        self
    }

    /// The same motion performed by a proportionally larger or smaller
    /// subject. Scaling is about the sensor origin.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// The body at `step`; steps past the end hold the final pose.
    pub fn body_at(&self, step: usize) -> Body {
        let pose = self.poses[step.min(self.poses.len() - 1)];
        self.body(pose)
    }

    fn body(&self, pose: ArmPose) -> Body {
        let place = |p: Point3| self.offset + p * self.scale;

        let [sl, el, wl, hl] = arm(SHOULDER_LEFT, pose.left, -1.0);
        let [sr, er, wr, hr] = arm(SHOULDER_RIGHT, pose.right, 1.0);
        let center = sl.midpoint(sr);

        Body::new(TRACKING_ID, self.tracking_state)
            .with_joint(SensorJoint::HipCenter, place(center - Point3::new(0.0, 0.5, 0.0)))
            .with_joint(SensorJoint::Spine, place(center - Point3::new(0.0, 0.25, 0.0)))
            .with_joint(SensorJoint::ShoulderCenter, place(center))
            .with_joint(SensorJoint::Head, place(center + Point3::new(0.0, 0.25, 0.0)))
            .with_joint(SensorJoint::ShoulderLeft, place(sl))
            .with_joint(SensorJoint::ElbowLeft, place(el))
            .with_joint(SensorJoint::WristLeft, place(wl))
            .with_joint(SensorJoint::HandLeft, place(hl))
            .with_joint(SensorJoint::ShoulderRight, place(sr))
            .with_joint(SensorJoint::ElbowRight, place(er))
            .with_joint(SensorJoint::WristRight, place(wr))
            .with_joint(SensorJoint::HandRight, place(hr))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimPerformer
// ────────────────────────────────────────────────────────────────────────────

/// Frame period for a sensor running at `fps` frames per second.
pub fn frame_interval(fps: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / u64::from(fps.max(1)))
}

/// A tokio task that streams [`MotionScript`]s into a [`FrameSink`].
///
/// `window` announces recording windows: `Some(n)` while the `n`-th window
/// is open, `None` otherwise. Every new `n` starts the next script.
///
/// The task is aborted when the performer is dropped; call
/// [`shutdown`][Self::shutdown] to stop it cleanly.
pub struct SimPerformer {
    stop: watch::Sender<bool>,
    handle: Option<JoinHandle<u64>>,
}

impl SimPerformer {
    pub fn spawn(
        sink: Arc<dyn FrameSink>,
        window: watch::Receiver<Option<u64>>,
        scripts: Vec<MotionScript>,
        interval: Duration,
    ) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        let scripts = if scripts.is_empty() {
            vec![MotionScript::idle(1)]
        } else {
            scripts
        };
        info!(scripts = scripts.len(), interval_ms = interval.as_millis() as u64, "simulated performer started");
        let handle = tokio::spawn(perform(sink, window, scripts, interval, stop_rx));
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop streaming and return how many frames were delivered.
    pub async fn shutdown(mut self) -> u64 {
        let _ = self.stop.send(true);
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(0),
            None => 0,
        }
    }
}

impl Drop for SimPerformer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Which script is playing and how far into it.
#[derive(Debug, Default)]
struct Playback {
    last_window: Option<u64>,
    playing: Option<usize>,
    step: usize,
}

impl Playback {
    /// Returns the index of the script that starts, if `current` is a new
    /// window.
    fn on_window(&mut self, current: Option<u64>, scripts: usize) -> Option<usize> {
        let opened = current.is_some() && current != self.last_window;
        self.last_window = current;
        if !opened {
            return None;
        }
        let next = self.playing.map_or(0, |i| i + 1);
        self.playing = Some(next);
        self.step = 0;
        Some(next.min(scripts - 1))
    }

    fn script(&self, scripts: usize) -> usize {
        self.playing.unwrap_or(0).min(scripts - 1)
    }

    fn advance(&mut self) {
        if self.playing.is_some() {
            self.step += 1;
        }
    }
}

async fn perform(
    sink: Arc<dyn FrameSink>,
    mut window: watch::Receiver<Option<u64>>,
    scripts: Vec<MotionScript>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) -> u64 {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut playback = Playback::default();
    let mut sequence = 0u64;

    // A window may already be open by the time the task first runs.
    let initial = *window.borrow_and_update();
    if let Some(index) = playback.on_window(initial, scripts.len()) {
        debug!(window = ?initial, script = scripts[index].name(), "recording window already open; starting script");
    }

    sink.on_status(SensorStatus::Streaming);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let body = scripts[playback.script(scripts.len())].body_at(playback.step);
                sink.on_frame(SkeletonFrame::new(sequence, vec![body]));
                sequence += 1;
                playback.advance();
            }
            changed = window.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *window.borrow_and_update();
                if let Some(index) = playback.on_window(current, scripts.len()) {
                    debug!(
                        window = ?current,
                        script = scripts[index].name(),
                        "recording window opened; starting script"
                    );
                }
            }
            _ = stop.changed() => break,
        }
    }

    sink.on_status(SensorStatus::Disconnected);
    info!(frames = sequence, "simulated performer stopped");
    sequence
}
