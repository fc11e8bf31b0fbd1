//! Capture chance and the ball throw itself.

use crate::rng::TurnRng;
use crate::snapshot::CombatantSnapshot;

/// Every throw lands somewhere in this band regardless of ball or HP.
const MIN_CHANCE: f64 = 0.1;
const MAX_CHANCE: f64 = 0.9;

/// How close a failed throw came to sticking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Caught,
    Escaped { almost: bool },
}

/// Capture probability from the target's HP and the ball's multiplier.
///
/// The HP factor follows the classic curve: full health gives 1/3 of the
/// base rate, near zero health approaches the full rate. The result is
/// clamped to [0.1, 0.9] so no throw is ever guaranteed either way.
pub fn chance(current_hp: u16, max_hp: u16, ball_multiplier: f64) -> f64 {
    let max = f64::from(max_hp.max(1));
    let cur = f64::from(current_hp.min(max_hp));
    let hp_factor = (3.0 * max - 2.0 * cur) * 255.0 / (3.0 * max);
    (hp_factor * ball_multiplier / 255.0).clamp(MIN_CHANCE, MAX_CHANCE)
}

/// Throw a ball at `target`. A failed throw that was within half the success
/// band reports `almost`, which the presentation layer turns into the ball
/// shaking before the escape.
pub fn attempt(
    target: &CombatantSnapshot,
    ball_multiplier: f64,
    rng: &mut TurnRng,
) -> CaptureOutcome {
    let p = chance(target.current_hp, target.max_hp, ball_multiplier);
    if rng.roll_chance(p, "capture") {
        CaptureOutcome::Caught
    } else {
        let almost = rng.roll_chance(p * 0.5, "capture near miss");
        CaptureOutcome::Escaped { almost }
    }
}
