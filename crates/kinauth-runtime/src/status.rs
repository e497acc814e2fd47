//! [`AuthStatusBoard`] – shared, lock-free authentication state.
//!
//! The board is what a UI polls. It holds three independent pieces of
//! state:
//!
//! - the current [`AuthStatus`] (an [`AtomicU8`]),
//! - the sticky "previous attempt failed" flag (an [`AtomicBool`]),
//! - the progress of the running attempt as a [`SequencerPhase`] on a
//!   [`watch`] channel, for consumers that prefer to subscribe.
//!
//! Every login attempt receives a ticket from
//! [`begin_login`][AuthStatusBoard::begin_login]. Only the holder of the
//! currently open ticket can write the final verdict, and only once: the
//! ticket is retired with a compare-and-swap.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use kinauth_types::{AuthError, Verdict};
use tokio::sync::watch;
use tracing::debug;

/// Shown to the user before re-recording after a rejected attempt.
pub const RETRY_MESSAGE: &str = "The gestures are incorrect. Please try again.";

/// Coarse authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthStatus {
    NotAuthenticated = 0,
    Authenticated = 1,
    PreviousAttemptFailed = 2,
}

impl AuthStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => AuthStatus::Authenticated,
            2 => AuthStatus::PreviousAttemptFailed,
            _ => AuthStatus::NotAuthenticated,
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthStatus::NotAuthenticated => "not authenticated",
            AuthStatus::Authenticated => "authenticated",
            AuthStatus::PreviousAttemptFailed => "previous attempt failed",
        };
        f.write_str(s)
    }
}

/// Progress of the enrollment or login currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerPhase {
    Idle,
    /// The previous login was rejected; the user is being told to retry.
    RetryNotice,
    WaitingForTracking { index: usize },
    Recording { index: usize, total: usize },
    Comparing { index: usize, total: usize },
    Enrolled { count: usize },
    Authenticated,
    Rejected { index: usize },
    Aborted { reason: String },
}

impl SequencerPhase {
    /// `true` once an attempt has reached a phase it will not leave on its
    /// own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SequencerPhase::Enrolled { .. }
                | SequencerPhase::Authenticated
                | SequencerPhase::Rejected { .. }
                | SequencerPhase::Aborted { .. }
        )
    }
}

impl fmt::Display for SequencerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerPhase::Idle => write!(f, "idle"),
            SequencerPhase::RetryNotice => write!(f, "{RETRY_MESSAGE}"),
            SequencerPhase::WaitingForTracking { index } => {
                write!(f, "gesture {}: step in front of the sensor", index + 1)
            }
            SequencerPhase::Recording { index, total } => {
                write!(f, "recording gesture {} of {total}", index + 1)
            }
            SequencerPhase::Comparing { index, total } => {
                write!(f, "comparing gesture {} of {total}", index + 1)
            }
            SequencerPhase::Enrolled { count } => write!(f, "{count} gesture(s) enrolled"),
            SequencerPhase::Authenticated => write!(f, "authenticated"),
            SequencerPhase::Rejected { index } => {
                write!(f, "gesture {} did not match", index + 1)
            }
            SequencerPhase::Aborted { reason } => write!(f, "aborted: {reason}"),
        }
    }
}

/// Opaque handle for one open login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptTicket(u64);

/// Shared authentication state with lock-free reads.
#[derive(Debug)]
pub struct AuthStatusBoard {
    status: AtomicU8,
    previous_failed: AtomicBool,
    /// Ticket of the login allowed to write a verdict; `0` when none.
    open_ticket: AtomicU64,
    next_ticket: AtomicU64,
    verdicts_written: AtomicU64,
    phase: watch::Sender<SequencerPhase>,
}

impl Default for AuthStatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthStatusBoard {
    pub fn new() -> Self {
        let (phase, _rx) = watch::channel(SequencerPhase::Idle);
        Self {
            status: AtomicU8::new(AuthStatus::NotAuthenticated as u8),
            previous_failed: AtomicBool::new(false),
            open_ticket: AtomicU64::new(0),
            next_ticket: AtomicU64::new(1),
            verdicts_written: AtomicU64::new(0),
            phase,
        }
    }

    pub fn status(&self) -> AuthStatus {
        AuthStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == AuthStatus::Authenticated
    }

    pub fn previous_attempt_failed(&self) -> bool {
        self.previous_failed.load(Ordering::Acquire)
    }

    /// Number of verdicts ever written.
    pub fn verdicts_written(&self) -> u64 {
        self.verdicts_written.load(Ordering::Acquire)
    }

    /// Snapshot of the current phase.
    pub fn phase(&self) -> SequencerPhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SequencerPhase> {
        self.phase.subscribe()
    }

    pub fn publish(&self, phase: SequencerPhase) {
        debug!(%phase, "phase");
        self.phase.send_replace(phase);
    }

    /// Open a login attempt. A new attempt revokes any earlier
    /// authentication and supersedes any earlier open ticket.
    pub fn begin_login(&self) -> AttemptTicket {
        let ticket = self.next_ticket.fetch_add(1, Ordering::AcqRel);
        self.open_ticket.store(ticket, Ordering::Release);
        let _ = self.status.compare_exchange(
            AuthStatus::Authenticated as u8,
            AuthStatus::NotAuthenticated as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        AttemptTicket(ticket)
    }

    fn retire(&self, ticket: AttemptTicket) -> bool {
        self.open_ticket
            .compare_exchange(ticket.0, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Write the verdict of `ticket`'s attempt. Returns `false`, and writes
    /// nothing, if the ticket was already retired or superseded.
    pub fn finish(&self, ticket: AttemptTicket, verdict: Verdict) -> bool {
        if !self.retire(ticket) {
            return false;
        }
        match verdict {
            Verdict::Accepted => {
                self.previous_failed.store(false, Ordering::Release);
                self.status.store(AuthStatus::Authenticated as u8, Ordering::Release);
                self.publish(SequencerPhase::Authenticated);
            }
            Verdict::Rejected { position } => {
                self.previous_failed.store(true, Ordering::Release);
                self.status
                    .store(AuthStatus::PreviousAttemptFailed as u8, Ordering::Release);
                self.publish(SequencerPhase::Rejected { index: position });
            }
        }
        self.verdicts_written.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Retire `ticket` without a verdict. Status and the sticky failure flag
    /// are left untouched.
    pub fn abandon(&self, ticket: AttemptTicket, reason: &AuthError) -> bool {
        if !self.retire(ticket) {
            return false;
        }
        self.publish(SequencerPhase::Aborted {
            reason: reason.to_string(),
        });
        true
    }

    /// A new reference set was installed: previous outcomes no longer mean
    /// anything.
    pub fn record_enrollment(&self, count: usize) {
        self.open_ticket.store(0, Ordering::Release);
        self.previous_failed.store(false, Ordering::Release);
        self.status
            .store(AuthStatus::NotAuthenticated as u8, Ordering::Release);
        self.publish(SequencerPhase::Enrolled { count });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn starts_idle_and_unauthenticated() {
        let board = AuthStatusBoard::new();
        assert_eq!(board.status(), AuthStatus::NotAuthenticated);
        assert!(!board.previous_attempt_failed());
        assert_eq!(board.phase(), SequencerPhase::Idle);
    }

    #[test]
    fn accepted_verdict_authenticates() {
        let board = AuthStatusBoard::new();
        let ticket = board.begin_login();
        assert!(board.finish(ticket, Verdict::Accepted));
        assert!(board.is_authenticated());
        assert_eq!(board.phase(), SequencerPhase::Authenticated);
    }

    #[test]
    fn verdict_is_written_exactly_once() {
        let board = AuthStatusBoard::new();
        let ticket = board.begin_login();
        assert!(board.finish(ticket, Verdict::Rejected { position: 2 }));
        assert!(!board.finish(ticket, Verdict::Accepted));
        assert!(!board.abandon(ticket, &AuthError::Cancelled));
        assert_eq!(board.status(), AuthStatus::PreviousAttemptFailed);
        assert_eq!(board.verdicts_written(), 1);
    }

    #[test]
    fn superseded_ticket_cannot_write() {
        let board = AuthStatusBoard::new();
        let old = board.begin_login();
        let new = board.begin_login();
        assert!(!board.finish(old, Verdict::Accepted));
        assert!(board.finish(new, Verdict::Rejected { position: 0 }));
    }

    #[test]
    fn rejection_is_sticky_until_acceptance() {
        let board = AuthStatusBoard::new();
        board.finish(board.begin_login(), Verdict::Rejected { position: 0 });
        assert!(board.previous_attempt_failed());

        let ticket = board.begin_login();
        assert!(board.previous_attempt_failed());
        board.finish(ticket, Verdict::Accepted);
        assert!(!board.previous_attempt_failed());
    }

    #[test]
    fn abandon_leaves_status_alone() {
        let board = AuthStatusBoard::new();
        board.finish(board.begin_login(), Verdict::Rejected { position: 1 });

        let ticket = board.begin_login();
        assert!(board.abandon(ticket, &AuthError::TrackingUnavailable));
        assert_eq!(board.status(), AuthStatus::PreviousAttemptFailed);
        assert!(matches!(board.phase(), SequencerPhase::Aborted { .. }));
        assert_eq!(board.verdicts_written(), 1);
    }

    #[test]
    fn new_login_revokes_authentication() {
        let board = AuthStatusBoard::new();
        board.finish(board.begin_login(), Verdict::Accepted);
        board.begin_login();
        assert_eq!(board.status(), AuthStatus::NotAuthenticated);
    }

    #[test]
    fn enrollment_resets_outcomes() {
        let board = AuthStatusBoard::new();
        board.finish(board.begin_login(), Verdict::Rejected { position: 0 });
        board.record_enrollment(3);
        assert_eq!(board.status(), AuthStatus::NotAuthenticated);
        assert!(!board.previous_attempt_failed());
        assert_eq!(board.phase(), SequencerPhase::Enrolled { count: 3 });
    }

    #[test]
    fn concurrent_finishers_write_once() {
        let board = Arc::new(AuthStatusBoard::new());
        let ticket = board.begin_login();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let board = Arc::clone(&board);
                std::thread::spawn(move || board.finish(ticket, Verdict::Accepted))
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(board.verdicts_written(), 1);
    }

    #[test]
    fn phase_display_is_one_based() {
        let phase = SequencerPhase::Recording { index: 0, total: 3 };
        assert_eq!(phase.to_string(), "recording gesture 1 of 3");
        assert_eq!(SequencerPhase::RetryNotice.to_string(), RETRY_MESSAGE);
    }
}
