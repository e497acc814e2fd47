//! [`CaptureHub`] – the single meeting point of the sensor thread and the
//! sequencer.
//!
//! The sensor driver calls [`FrameSink::on_frame`] from its own thread. The
//! hub picks the first fully tracked body of each frame, publishes whether
//! one was present, and appends it to the open recording window if there is
//! one. The recorder lock is held only for that append.
//!
//! Windows are opened and closed by the sequencer. Only one can be open at a
//! time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use kinauth_hal::{FrameSink, SensorStatus};
use kinauth_perception::GestureRecorder;
use kinauth_types::{AuthError, Gesture, SkeletonFrame};
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct CaptureHub {
    recorder: Mutex<GestureRecorder>,
    tracking: watch::Sender<bool>,
    /// `Some(n)` while the `n`-th window is open.
    window: watch::Sender<Option<u64>>,
    windows_opened: AtomicU64,
    frames_seen: AtomicU64,
}

impl Default for CaptureHub {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureHub {
    pub fn new() -> Self {
        let (tracking, _) = watch::channel(false);
        let (window, _) = watch::channel(None);
        Self {
            recorder: Mutex::new(GestureRecorder::new()),
            tracking,
            window,
            windows_opened: AtomicU64::new(0),
            frames_seen: AtomicU64::new(0),
        }
    }

    fn recorder(&self) -> MutexGuard<'_, GestureRecorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the most recent frame contained a fully tracked subject.
    pub fn tracking_available(&self) -> bool {
        *self.tracking.borrow()
    }

    pub fn subscribe_tracking(&self) -> watch::Receiver<bool> {
        self.tracking.subscribe()
    }

    /// Window announcements, suitable for
    /// [`SimPerformer::spawn`][kinauth_hal::SimPerformer::spawn].
    pub fn subscribe_window(&self) -> watch::Receiver<Option<u64>> {
        self.window.subscribe()
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen.load(Ordering::Relaxed)
    }

    pub fn frames_in_window(&self) -> usize {
        self.recorder().frames_recorded()
    }

    /// Start a new recording window and return its number.
    ///
    /// # Errors
    ///
    /// [`AuthError::RecordingBusy`] if a window is already open.
    pub fn open_window(&self) -> Result<u64, AuthError> {
        let mut recorder = self.recorder();
        if recorder.is_recording() {
            return Err(AuthError::RecordingBusy);
        }
        recorder.start();
        let id = self.windows_opened.fetch_add(1, Ordering::AcqRel) + 1;
        self.window.send_replace(Some(id));
        debug!(window = id, "recording window opened");
        Ok(id)
    }

    /// Close the open window and return what it captured.
    ///
    /// # Errors
    ///
    /// See [`GestureRecorder::stop`].
    pub fn close_window(&self) -> Result<Gesture, AuthError> {
        let result = self.recorder().stop();
        self.window.send_replace(None);
        result
    }

    /// Discard the open window, if any.
    pub fn abort_window(&self) {
        self.recorder().abort();
        self.window.send_replace(None);
    }

    fn set_tracking(&self, available: bool) {
        self.tracking.send_if_modified(|current| {
            if *current == available {
                return false;
            }
            *current = available;
            info!(available, "tracking changed");
            true
        });
    }
}

impl FrameSink for CaptureHub {
    fn on_frame(&self, frame: SkeletonFrame) {
        self.frames_seen.fetch_add(1, Ordering::Relaxed);
        self.set_tracking(frame.first_tracked().is_some());

        if let Err(e) = self.recorder().accept_skeleton(&frame) {
            debug!(sequence = frame.sequence, error = %e, "frame rejected");
        }
    }

    fn on_status(&self, status: SensorStatus) {
        match status {
            SensorStatus::Streaming => info!(%status, "sensor"),
            SensorStatus::Stalled | SensorStatus::Disconnected => {
                warn!(%status, "sensor");
                self.set_tracking(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinauth_hal::MotionScript;

    fn tick(seq: u64, script: &MotionScript, step: usize) -> SkeletonFrame {
        SkeletonFrame::new(seq, vec![script.body_at(step)])
    }

    #[test]
    fn publishes_tracking_availability() {
        let hub = CaptureHub::new();
        assert!(!hub.tracking_available());

        hub.on_frame(tick(0, &MotionScript::idle(1), 0));
        assert!(hub.tracking_available());

        hub.on_frame(tick(1, &MotionScript::untracked(1), 0));
        assert!(!hub.tracking_available());

        hub.on_frame(tick(2, &MotionScript::idle(1), 0));
        hub.on_status(SensorStatus::Disconnected);
        assert!(!hub.tracking_available());
        assert_eq!(hub.frames_seen(), 3);
    }

    #[test]
    fn only_frames_inside_a_window_are_recorded() {
        let hub = CaptureHub::new();
        let script = MotionScript::raise_right_hand(5);

        hub.on_frame(tick(0, &script, 0));
        hub.open_window().unwrap();
        for step in 0..5 {
            hub.on_frame(tick(step as u64 + 1, &script, step));
        }
        assert_eq!(hub.frames_in_window(), 5);

        let gesture = hub.close_window().unwrap();
        assert_eq!(gesture.len(), 5);

        hub.on_frame(tick(10, &script, 4));
        assert_eq!(hub.frames_in_window(), 0);
    }

    #[test]
    fn second_window_is_busy() {
        let hub = CaptureHub::new();
        assert_eq!(hub.open_window(), Ok(1));
        assert_eq!(hub.open_window(), Err(AuthError::RecordingBusy));
        hub.abort_window();
        assert_eq!(hub.open_window(), Ok(2));
    }

    #[test]
    fn window_numbers_are_announced() {
        let hub = CaptureHub::new();
        let rx = hub.subscribe_window();
        hub.open_window().unwrap();
        assert_eq!(*rx.borrow(), Some(1));
        hub.abort_window();
        assert_eq!(*rx.borrow(), None);
    }

    #[test]
    fn untracked_window_reports_tracking_unavailable() {
        let hub = CaptureHub::new();
        hub.open_window().unwrap();
        for seq in 0..10 {
            hub.on_frame(tick(seq, &MotionScript::untracked(1), 0));
        }
        assert_eq!(hub.close_window(), Err(AuthError::TrackingUnavailable));
    }

    #[test]
    fn closing_without_a_window_fails() {
        let hub = CaptureHub::new();
        assert_eq!(hub.close_window(), Err(AuthError::NoActiveRecording));
    }
}
