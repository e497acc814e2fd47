//! The simulated user the CLI performs with.
//!
//! Enrollment cycles through three moves. A replay performs the same moves
//! a little faster, from a different spot, and at a different body size; an
//! impostor performs the moves in the wrong order.

use kinauth_hal::MotionScript;
use kinauth_types::Point3;

const MOVES: [fn(usize) -> MotionScript; 3] = [
    MotionScript::raise_right_hand,
    MotionScript::raise_left_hand,
    MotionScript::spread_arms,
];

/// How the simulated user performs a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performance {
    /// Repeats the enrolled sequence.
    Replay,
    /// Performs each position with the next position's move.
    Impostor,
    /// Never steps into full tracking.
    Absent,
}

/// Frames in one move: the motion finishes before the window closes.
pub fn frames_per_move(sensor_fps: u32, recording_seconds: u64) -> usize {
    let window = sensor_fps as usize * recording_seconds as usize;
    (window * 4 / 5).max(2)
}

pub fn enrollment(count: usize, frames: usize) -> Vec<MotionScript> {
    (0..count).map(|i| MOVES[i % MOVES.len()](frames)).collect()
}

pub fn login(performance: Performance, count: usize, frames: usize) -> Vec<MotionScript> {
    match performance {
        Performance::Replay => (0..count)
            .map(|i| {
                MOVES[i % MOVES.len()](frames * 93 / 100)
                    .with_offset(Point3::new(0.35, -0.1, 0.6))
                    .with_scale(1.08)
            })
            .collect(),
        Performance::Impostor => (0..count)
            .map(|i| MOVES[(i + 1) % MOVES.len()](frames))
            .collect(),
        Performance::Absent => vec![MotionScript::untracked(frames)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_fit_inside_the_window() {
        assert_eq!(frames_per_move(30, 5), 120);
        assert_eq!(frames_per_move(1, 1), 2);
    }

    #[test]
    fn enrollment_cycles_moves() {
        let scripts = enrollment(4, 10);
        let names: Vec<&str> = scripts.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["raise right hand", "raise left hand", "spread arms", "raise right hand"]
        );
    }

    #[test]
    fn replay_is_shorter_but_same_moves() {
        let enrolled = enrollment(2, 100);
        let replay = login(Performance::Replay, 2, 100);
        for (e, r) in enrolled.iter().zip(&replay) {
            assert_eq!(e.name(), r.name());
            assert_eq!(r.len(), 93);
        }
    }

    #[test]
    fn impostor_shifts_every_move() {
        let enrolled = enrollment(3, 10);
        let impostor = login(Performance::Impostor, 3, 10);
        assert!(enrolled.iter().zip(&impostor).all(|(e, i)| e.name() != i.name()));
    }
}
