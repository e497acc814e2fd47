//! Slope-constrained Dynamic Time Warping.
//!
//! # Step cost
//!
//! The cost of aligning candidate step `i` with reference step `j` combines
//! all eight joints into one scalar:
//!
//! ```text
//! d(i, j) = sqrt( Σ_joint |candidate[joint][i] - reference[joint][j]|² )
//! ```
//!
//! # Table
//!
//! The table has `(m + 1) × (n + 1)` cells (`m` candidate steps, `n`
//! reference steps). Every cell is `+∞` except the terminal `[m][n] = 0`.
//! It is filled backward from `(m-1, n-1)` to `(0, 0)`; each cell adds
//! `d(i, j)` to the cheapest of three moves:
//!
//! - right    `(i, j+1)`
//! - down     `(i+1, j)`
//! - diagonal `(i+1, j+1)`
//!
//! Right and down moves are counted separately between diagonals and both
//! counters reset on a diagonal move. A path may not take more than
//! `max_slope` right moves, nor more than `max_slope` down moves, before
//! its next diagonal. The counters are carried as part of the DP state, so
//! the table holds the exact constrained optimum rather than a greedy
//! approximation, and relaxing `max_slope` can never raise the result.
//!
//! The score is `min_i tab[i][0]`: the alignment may begin anywhere in the
//! candidate but must cover the reference from its first step, and both
//! sequences end together. The measure is therefore directional and in
//! general `dtw(a, b) != dtw(b, a)`.
//!
//! Only two table rows are kept live, so memory is
//! `O(n · (max_slope + 1)²)` while time is `O(m · n · (max_slope + 1)²)`.

use kinauth_types::{AuthError, Gesture, JointId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DtwConfig;

/// Combined eight-joint distance between `a[step_a]` and `b[step_b]`.
///
/// # Panics
///
/// Panics if either step is out of range.
pub fn snapshot_distance(a: &Gesture, step_a: usize, b: &Gesture, step_b: usize) -> f64 {
    JointId::ALL
        .iter()
        .map(|&joint| {
            let p = a.position(joint, step_a);
            let q = b.position(joint, step_b);
            let dx = f64::from(p.x) - f64::from(q.x);
            let dy = f64::from(p.y) - f64::from(q.y);
            let dz = f64::from(p.z) - f64::from(q.z);
            dx * dx + dy * dy + dz * dz
        })
        .sum::<f64>()
        .sqrt()
}

/// Raw (un-normalized) DTW cost of aligning `candidate` to `reference`.
///
/// Returns `+∞` when either gesture is empty or no path satisfies the
/// slope constraint.
pub fn dtw_distance(candidate: &Gesture, reference: &Gesture, max_slope: usize) -> f64 {
    let (m, n) = (candidate.len(), reference.len());
    if m == 0 || n == 0 {
        return f64::INFINITY;
    }

    // Per cell: one cost per (right-count, down-count) pair.
    let s = max_slope + 1;
    let idx = |j: usize, h: usize, v: usize| (j * s + h) * s + v;

    let mut next = vec![f64::INFINITY; (n + 1) * s * s];
    let mut next_best = vec![f64::INFINITY; n + 1];
    let mut cur = next.clone();
    let mut cur_best = next_best.clone();

    next[idx(n, 0, 0)] = 0.0;
    next_best[n] = 0.0;

    let mut best_match = f64::INFINITY;

    for i in (0..m).rev() {
        cur.fill(f64::INFINITY);
        cur_best.fill(f64::INFINITY);

        for j in (0..n).rev() {
            let step = snapshot_distance(candidate, i, reference, j);
            let mut cell_best = f64::INFINITY;

            for h in 0..s {
                for v in 0..s {
                    let mut via = f64::INFINITY;
                    if h == 0 && v == 0 {
                        via = next_best[j + 1];
                    }
                    if h > 0 {
                        via = via.min(cur[idx(j + 1, h - 1, v)]);
                    }
                    if v > 0 {
                        via = via.min(next[idx(j, h, v - 1)]);
                    }
                    let total = step + via;
                    cur[idx(j, h, v)] = total;
                    cell_best = cell_best.min(total);
                }
            }
            cur_best[j] = cell_best;
        }

        best_match = best_match.min(cur_best[0]);
        std::mem::swap(&mut cur, &mut next);
        std::mem::swap(&mut cur_best, &mut next_best);
    }

    best_match
}

/// Result of comparing one candidate against one reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// DTW cost divided by the reference length. `None` when the final-pose
    /// pre-filter pruned the pair.
    pub score: Option<f64>,
    /// `true` when the final-pose pre-filter skipped DTW.
    pub pruned: bool,
    pub matched: bool,
}

/// Gesture comparison with a recognition decision.
///
/// # Example
///
/// ```rust
/// use kinauth_matcher::{DtwConfig, DtwMatcher};
/// use kinauth_types::{Frame, Gesture, Point3};
///
/// let frames: Vec<Frame> = (0..10)
///     .map(|i| Frame::from_fn(|_| Point3::new(i as f32 * 0.1, 0.0, 0.0)))
///     .collect();
/// let g = Gesture::from_frames(&frames);
///
/// let matcher = DtwMatcher::new(DtwConfig::default()).unwrap();
/// let outcome = matcher.compare(&g, &g.clone()).unwrap();
/// assert!(outcome.matched);
/// assert_eq!(outcome.score, Some(0.0));
/// ```
#[derive(Debug, Clone)]
pub struct DtwMatcher {
    config: DtwConfig,
}

impl DtwMatcher {
    /// # Errors
    ///
    /// [`AuthError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: DtwConfig) -> Result<Self, AuthError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DtwConfig {
        &self.config
    }

    /// Normalized DTW score of `candidate` against `reference`.
    ///
    /// The final poses are compared first; if they are at least
    /// `position_threshold` apart no DTW is run and `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// - [`AuthError::LengthMismatch`] – either gesture violates the
    ///   equal-length invariant.
    /// - [`AuthError::TrackingUnavailable`] – either gesture is empty.
    pub fn score(&self, candidate: &Gesture, reference: &Gesture) -> Result<Option<f64>, AuthError> {
        candidate.validate()?;
        reference.validate()?;
        if candidate.is_empty() || reference.is_empty() {
            return Err(AuthError::TrackingUnavailable);
        }

        let (m, n) = (candidate.len(), reference.len());
        let final_gap = snapshot_distance(candidate, m - 1, reference, n - 1);
        if final_gap >= self.config.position_threshold {
            debug!(final_gap, threshold = self.config.position_threshold, "final poses too far apart; skipping DTW");
            return Ok(None);
        }

        let raw = dtw_distance(candidate, reference, self.config.max_slope);
        Ok(Some(raw / n as f64))
    }

    /// Score and decide.
    ///
    /// # Errors
    ///
    /// Same as [`DtwMatcher::score`].
    pub fn compare(&self, candidate: &Gesture, reference: &Gesture) -> Result<MatchOutcome, AuthError> {
        let score = self.score(candidate, reference)?;
        let matched = score.is_some_and(|s| s < self.config.recognition_threshold);
        debug!(
            candidate_len = candidate.len(),
            reference_len = reference.len(),
            ?score,
            matched,
            "gesture comparison"
        );
        Ok(MatchOutcome {
            score,
            pruned: score.is_none(),
            matched,
        })
    }
}
