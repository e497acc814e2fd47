//! [`AuthContext`] – everything an authentication session shares.
//!
//! Built once by the application at startup and passed to every
//! [`AuthenticationSequencer`][crate::sequencer::AuthenticationSequencer]
//! explicitly. Calling [`shutdown`][AuthContext::shutdown] cancels every
//! attempt started from it.

use std::sync::{Arc, PoisonError, RwLock};

use kinauth_hal::FrameSink;
use kinauth_matcher::DtwMatcher;
use kinauth_types::{AuthError, Gesture, GestureSet};
use tracing::info;

use crate::cancel::CancelToken;
use crate::capture::CaptureHub;
use crate::config::AuthConfig;
use crate::status::AuthStatusBoard;

#[derive(Debug)]
pub struct AuthContext {
    config: AuthConfig,
    hub: Arc<CaptureHub>,
    matcher: DtwMatcher,
    gestures: RwLock<GestureSet>,
    status: AuthStatusBoard,
    shutdown: CancelToken,
}

impl AuthContext {
    /// # Errors
    ///
    /// [`AuthError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: AuthConfig) -> Result<Arc<Self>, AuthError> {
        config.validate()?;
        let matcher = DtwMatcher::new(config.dtw)?;
        Ok(Arc::new(Self {
            config,
            hub: Arc::new(CaptureHub::new()),
            matcher,
            gestures: RwLock::new(GestureSet::new()),
            status: AuthStatusBoard::new(),
            shutdown: CancelToken::new(),
        }))
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn hub(&self) -> &Arc<CaptureHub> {
        &self.hub
    }

    /// The hub as the sink to hand to a sensor driver.
    pub fn frame_sink(&self) -> Arc<dyn FrameSink> {
        self.hub.clone()
    }

    pub fn matcher(&self) -> &DtwMatcher {
        &self.matcher
    }

    pub fn status(&self) -> &AuthStatusBoard {
        &self.status
    }

    /// A snapshot of the enrolled references and the latest candidates.
    pub fn gestures(&self) -> GestureSet {
        self.gestures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn enrolled_count(&self) -> usize {
        self.gestures
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .references()
            .len()
    }

    /// Replace the whole reference set. On error the previous set is kept.
    pub(crate) fn install_references(&self, references: Vec<Gesture>) -> Result<usize, AuthError> {
        let count = references.len();
        self.gestures
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_references(references)?;
        self.status.record_enrollment(count);
        Ok(count)
    }

    /// Store an attempt's candidates and return the set they were paired
    /// with.
    pub(crate) fn store_candidates(&self, candidates: Vec<Gesture>) -> Result<GestureSet, AuthError> {
        let mut gestures = self.gestures.write().unwrap_or_else(PoisonError::into_inner);
        gestures.set_candidates(candidates)?;
        Ok(gestures.clone())
    }

    /// Token for a new attempt; cancelled by [`shutdown`][Self::shutdown].
    pub fn attempt_token(&self) -> CancelToken {
        self.shutdown.child()
    }

    /// Cancel every running and future attempt.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            info!("authentication context shutting down");
        }
        self.shutdown.cancel();
        self.hub.abort_window();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinauth_types::{Frame, Point3};

    fn gesture(len: usize) -> Gesture {
        let frames: Vec<Frame> = (0..len)
            .map(|i| Frame::from_fn(|_| Point3::new(i as f32, 0.0, 0.0)))
            .collect();
        Gesture::from_frames(&frames)
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = AuthConfig {
            num_gestures: 0,
            ..AuthConfig::default()
        };
        assert!(matches!(AuthContext::new(cfg), Err(AuthError::InvalidConfig(_))));
    }

    #[test]
    fn failed_install_keeps_previous_references() {
        let ctx = AuthContext::new(AuthConfig::default()).unwrap();
        ctx.install_references(vec![gesture(3), gesture(4)]).unwrap();
        assert_eq!(ctx.enrolled_count(), 2);

        let too_many = (0..11).map(|_| gesture(2)).collect();
        assert!(ctx.install_references(too_many).is_err());
        assert_eq!(ctx.enrolled_count(), 2);
        assert_eq!(ctx.gestures().references()[1].len(), 4);
    }

    #[test]
    fn candidates_require_matching_size() {
        let ctx = AuthContext::new(AuthConfig::default()).unwrap();
        assert_eq!(
            ctx.store_candidates(vec![gesture(2)]),
            Err(AuthError::NotEnrolled)
        );
        ctx.install_references(vec![gesture(3)]).unwrap();
        assert!(ctx.store_candidates(vec![gesture(2)]).is_ok());
        assert_eq!(ctx.gestures().candidates().len(), 1);
    }

    #[test]
    fn stored_candidates_pair_with_references_by_position() {
        let ctx = AuthContext::new(AuthConfig::default()).unwrap();
        ctx.install_references(vec![gesture(3), gesture(4)]).unwrap();

        let set = ctx.store_candidates(vec![gesture(5), gesture(6)]).unwrap();
        let pairs: Vec<(usize, usize, usize)> =
            set.pairs().map(|(i, c, r)| (i, c.len(), r.len())).collect();
        assert_eq!(pairs, vec![(0, 5, 3), (1, 6, 4)]);
    }

    #[test]
    fn shutdown_cancels_attempt_tokens() {
        let ctx = AuthContext::new(AuthConfig::default()).unwrap();
        let token = ctx.attempt_token();
        ctx.shutdown();
        assert!(token.is_cancelled());
        assert!(ctx.is_shut_down());
        assert!(ctx.attempt_token().is_cancelled());
    }
}
