//! `kinauth-runtime` – the authentication engine.
//!
//! Wires capture, normalization and matching into enrollment and login
//! attempts that run as cancellable tokio tasks.
//!
//! # Modules
//!
//! - [`sequencer`] – [`AuthenticationSequencer`][sequencer::AuthenticationSequencer]:
//!   records gesture sequences and decides logins with a fail-fast AND over
//!   positions.
//! - [`capture`] – [`CaptureHub`][capture::CaptureHub]: the
//!   [`FrameSink`][kinauth_hal::FrameSink] a sensor driver feeds; owns the
//!   recorder and enforces one open window at a time.
//! - [`status`] – [`AuthStatusBoard`][status::AuthStatusBoard]: lock-free
//!   status for UIs plus a `watch` channel of
//!   [`SequencerPhase`][status::SequencerPhase] progress.
//! - [`context`] – [`AuthContext`][context::AuthContext]: the shared state
//!   an application builds at startup and shuts down at exit.
//! - [`cancel`] – [`CancelToken`][cancel::CancelToken]: hierarchical
//!   cancellation on `tokio::sync::watch`.
//! - [`config`] – [`AuthConfig`][config::AuthConfig]: gesture count, window
//!   length, timeouts, and the `[dtw]` table.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: console
//!   logging with an optional OTLP span exporter.

pub mod cancel;
pub mod capture;
pub mod config;
pub mod context;
pub mod sequencer;
pub mod status;
pub mod telemetry;

pub use cancel::CancelToken;
pub use capture::CaptureHub;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use sequencer::{AttemptHandle, AuthenticationSequencer};
pub use status::{AuthStatus, AuthStatusBoard, RETRY_MESSAGE, SequencerPhase};
pub use telemetry::{TracerProviderGuard, init_tracing};
