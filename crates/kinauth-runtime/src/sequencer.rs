//! [`AuthenticationSequencer`] – enrollment and login orchestration.
//!
//! # Enrollment
//!
//! For each position `0..num_gestures`: wait until the sensor tracks a
//! subject, open a recording window for `recording_seconds`, close it and
//! keep the gesture. When every position has been recorded the whole
//! reference set is replaced at once; a failed enrollment leaves the
//! previous set in place.
//!
//! # Login
//!
//! ```text
//! previous attempt failed? ──yes──▶ RetryNotice, pause failure_notice
//!          │
//!          ▼
//! record candidate 0..N  (WaitingForTracking → Recording, per position)
//!          │
//!          ▼
//! compare position 0, 1, … ── first mismatch ──▶ Rejected { position }
//!          │
//!          ▼
//!       Accepted
//! ```
//!
//! All candidates are recorded before any comparison runs. Comparison is
//! positional and stops at the first mismatch.
//!
//! # Faults and cancellation
//!
//! Tracking and normalization faults abort the attempt with an error and
//! publish [`SequencerPhase::Aborted`]; they do not count as a failed
//! attempt. Cancelling discards the open window and returns
//! [`AuthError::Cancelled`]. Neither writes a verdict.
//!
//! # Example
//!
//! ```rust,no_run
//! use kinauth_hal::{MotionScript, SimPerformer, sim::frame_interval};
//! use kinauth_runtime::{AuthConfig, AuthContext, AuthenticationSequencer};
//!
//! # async fn demo() -> Result<(), kinauth_types::AuthError> {
//! let ctx = AuthContext::new(AuthConfig::default())?;
//! let _performer = SimPerformer::spawn(
//!     ctx.frame_sink(),
//!     ctx.hub().subscribe_window(),
//!     vec![MotionScript::raise_right_hand(30), MotionScript::raise_right_hand(28)],
//!     frame_interval(30),
//! );
//!
//! let sequencer = AuthenticationSequencer::new(ctx);
//! sequencer.enroll().await?;
//! let verdict = sequencer.login().await?;
//! assert!(verdict.is_accepted());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use kinauth_types::{AttemptReport, AuthError, Gesture, PositionScore, Verdict};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::context::AuthContext;
use crate::status::{RETRY_MESSAGE, SequencerPhase};

// ─────────────────────────────────────────────────────────────────────────────
// AttemptHandle
// ─────────────────────────────────────────────────────────────────────────────

/// A running enrollment or login task.
#[derive(Debug)]
pub struct AttemptHandle<T> {
    id: Uuid,
    cancel: CancelToken,
    task: JoinHandle<Result<T, AuthError>>,
}

impl<T> AttemptHandle<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Ask the task to stop. It finishes with [`AuthError::Cancelled`]
    /// unless it had already produced a result.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task's result.
    pub async fn join(self) -> Result<T, AuthError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(AuthError::Cancelled),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AuthenticationSequencer
// ─────────────────────────────────────────────────────────────────────────────

/// Runs enrollment and login against an [`AuthContext`].
///
/// Cheap to clone; clones share the context and the one-attempt-at-a-time
/// lock. Starting an attempt while another is running fails with
/// [`AuthError::RecordingBusy`].
#[derive(Debug, Clone)]
pub struct AuthenticationSequencer {
    ctx: Arc<AuthContext>,
    busy: Arc<Mutex<()>>,
}

impl AuthenticationSequencer {
    pub fn new(ctx: Arc<AuthContext>) -> Self {
        Self {
            ctx,
            busy: Arc::new(Mutex::new(())),
        }
    }

    pub fn context(&self) -> &Arc<AuthContext> {
        &self.ctx
    }

    /// Record and install a new reference set. Returns how many gestures
    /// were enrolled.
    pub async fn enroll(&self) -> Result<usize, AuthError> {
        self.run_enroll(Uuid::new_v4(), self.ctx.attempt_token()).await
    }

    /// Record candidates and compare them against the references.
    pub async fn login(&self) -> Result<Verdict, AuthError> {
        Ok(self.login_with_report().await?.verdict)
    }

    /// Like [`login`][Self::login], with timing and per-position scores.
    pub async fn login_with_report(&self) -> Result<AttemptReport, AuthError> {
        self.run_login(Uuid::new_v4(), self.ctx.attempt_token()).await
    }

    /// Run [`enroll`][Self::enroll] as a background task.
    pub fn spawn_enroll(&self) -> AttemptHandle<usize> {
        let (id, cancel) = (Uuid::new_v4(), self.ctx.attempt_token());
        let this = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move { this.run_enroll(id, token).await });
        AttemptHandle { id, cancel, task }
    }

    /// Run [`login`][Self::login] as a background task.
    pub fn spawn_login(&self) -> AttemptHandle<Verdict> {
        let (id, cancel) = (Uuid::new_v4(), self.ctx.attempt_token());
        let this = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            this.run_login(id, token).await.map(|report| report.verdict)
        });
        AttemptHandle { id, cancel, task }
    }

    // ── Enrollment ───────────────────────────────────────────────────────────

    #[instrument(name = "enroll", skip(self, cancel), fields(gestures = self.ctx.config().num_gestures))]
    async fn run_enroll(&self, attempt: Uuid, cancel: CancelToken) -> Result<usize, AuthError> {
        let _busy = self.busy.try_lock().map_err(|_| AuthError::RecordingBusy)?;
        let total = self.ctx.config().num_gestures;
        info!(total, "enrollment started");

        let mut references = Vec::with_capacity(total);
        for index in 0..total {
            match self.record(index, total, &cancel).await {
                Ok(gesture) => references.push(gesture),
                Err(e) => {
                    self.report_abort(&e);
                    return Err(e);
                }
            }
        }

        let count = self.ctx.install_references(references)?;
        info!(count, "enrollment complete");
        Ok(count)
    }

    // ── Login ────────────────────────────────────────────────────────────────

    #[instrument(name = "login", skip(self, cancel))]
    async fn run_login(&self, attempt: Uuid, cancel: CancelToken) -> Result<AttemptReport, AuthError> {
        let _busy = self.busy.try_lock().map_err(|_| AuthError::RecordingBusy)?;
        let references = self.ctx.gestures().references().to_vec();
        if references.is_empty() {
            return Err(AuthError::NotEnrolled);
        }

        let board = self.ctx.status();
        let started_at = Utc::now();
        let ticket = board.begin_login();

        match self.perform_login(&references, &cancel).await {
            Ok((verdict, scores)) => {
                if board.finish(ticket, verdict) {
                    info!(?verdict, compared = scores.len(), "login finished");
                }
                Ok(AttemptReport {
                    id: attempt,
                    started_at,
                    finished_at: Utc::now(),
                    verdict,
                    scores,
                })
            }
            Err(e) => {
                board.abandon(ticket, &e);
                self.log_abort(&e);
                Err(e)
            }
        }
    }

    async fn perform_login(
        &self,
        references: &[Gesture],
        cancel: &CancelToken,
    ) -> Result<(Verdict, Vec<PositionScore>), AuthError> {
        let board = self.ctx.status();
        let total = references.len();

        if board.previous_attempt_failed() {
            board.publish(SequencerPhase::RetryNotice);
            info!("{RETRY_MESSAGE}");
            self.pause(self.ctx.config().failure_notice(), cancel).await?;
        }

        let mut candidates = Vec::with_capacity(total);
        for index in 0..total {
            candidates.push(self.record(index, total, cancel).await?);
        }
        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled);
        }
        let set = self.ctx.store_candidates(candidates)?;

        let mut scores = Vec::with_capacity(total);
        for (index, candidate, reference) in set.pairs() {
            board.publish(SequencerPhase::Comparing { index, total });
            let outcome = self.ctx.matcher().compare(candidate, reference)?;
            scores.push(PositionScore {
                position: index,
                score: outcome.score,
                matched: outcome.matched,
            });
            if !outcome.matched {
                info!(index, score = ?outcome.score, pruned = outcome.pruned, "gesture mismatch");
                return Ok((Verdict::Rejected { position: index }, scores));
            }
        }
        Ok((Verdict::Accepted, scores))
    }

    // ── Shared steps ─────────────────────────────────────────────────────────

    /// Wait for tracking, then capture one fixed-length window.
    async fn record(&self, index: usize, total: usize, cancel: &CancelToken) -> Result<Gesture, AuthError> {
        let board = self.ctx.status();
        let hub = self.ctx.hub();

        board.publish(SequencerPhase::WaitingForTracking { index });
        self.wait_for_tracking(cancel).await?;

        let window = hub.open_window()?;
        board.publish(SequencerPhase::Recording { index, total });
        info!(index, window, seconds = self.ctx.config().recording_seconds, "recording");

        if let Err(e) = self.pause(self.ctx.config().recording_window(), cancel).await {
            hub.abort_window();
            return Err(e);
        }

        let gesture = hub.close_window()?;
        info!(index, frames = gesture.len(), "gesture captured");
        Ok(gesture)
    }

    async fn wait_for_tracking(&self, cancel: &CancelToken) -> Result<(), AuthError> {
        let mut tracking = self.ctx.hub().subscribe_tracking();
        let timeout = self.ctx.config().tracking_timeout();
        let ready = async move { tracking.wait_for(|available| *available).await.map(|_| ()) };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AuthError::Cancelled),
            waited = tokio::time::timeout(timeout, ready) => match waited {
                Ok(Ok(())) => Ok(()),
                _ => Err(AuthError::TrackingUnavailable),
            },
        }
    }

    async fn pause(&self, duration: Duration, cancel: &CancelToken) -> Result<(), AuthError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AuthError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn report_abort(&self, e: &AuthError) {
        self.ctx.status().publish(SequencerPhase::Aborted {
            reason: e.to_string(),
        });
        self.log_abort(e);
    }

    fn log_abort(&self, e: &AuthError) {
        if e.is_retryable() {
            warn!(error = %e, "attempt aborted; user may retry");
        } else {
            warn!(error = %e, "attempt aborted");
        }
    }
}
