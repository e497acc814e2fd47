//! Generic sensor seam.
//!
//! A driver owns the device and its callback thread; whatever consumes
//! skeleton data implements [`FrameSink`] and is handed to the driver at
//! startup.

use std::fmt;

use kinauth_types::SkeletonFrame;

/// Coarse connection state a driver reports alongside its frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorStatus {
    /// The device is attached and producing frames.
    Streaming,
    /// The device is attached but has stopped producing frames.
    Stalled,
    /// The device was unplugged or the driver shut down.
    Disconnected,
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SensorStatus::Streaming => "streaming",
            SensorStatus::Stalled => "stalled",
            SensorStatus::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Receives skeleton frames from a sensor driver.
///
/// Drivers call [`on_frame`][Self::on_frame] from their own thread at the
/// sensor rate (about 30 Hz), so implementations must return quickly and
/// never block on long-held locks.
pub trait FrameSink: Send + Sync {
    /// Deliver one sensor tick. Frames arrive in sensor order.
    fn on_frame(&self, frame: SkeletonFrame);

    /// Connection state changes. Ignored unless overridden.
    fn on_status(&self, _status: SensorStatus) {}
}
