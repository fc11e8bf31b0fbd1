//! Injectable randomness for battle resolution.
//!
//! Every random decision in the engine consumes values from a [`TurnRng`]
//! tape. Production callers use [`TurnRng::new_random`], which refills itself
//! as needed; tests use [`TurnRng::new_for_test`] with a scripted tape so a
//! whole battle turn resolves deterministically. Each consumption is labeled
//! with a reason, which makes an exhausted scripted tape easy to diagnose.

/// A tape of percentile rolls (1..=100) consumed left to right.
#[derive(Debug, Clone)]
pub struct TurnRng {
    tape: Vec<u8>,
    cursor: usize,
    scripted: bool,
}

const REFILL_CHUNK: usize = 64;

impl TurnRng {
    pub fn new_random() -> Self {
        let mut rng = Self {
            tape: Vec::new(),
            cursor: 0,
            scripted: false,
        };
        rng.refill();
        rng
    }

    /// A scripted tape for tests. Values must be in 1..=100; running out of
    /// tape panics with the reason of the roll that needed it.
    pub fn new_for_test(tape: Vec<u8>) -> Self {
        debug_assert!(tape.iter().all(|v| (1..=100).contains(v)));
        Self {
            tape,
            cursor: 0,
            scripted: true,
        }
    }

    fn refill(&mut self) {
        use rand::Rng;
        let mut rng = rand::rng();
        self.tape
            .extend((0..REFILL_CHUNK).map(|_| rng.random_range(1..=100)));
    }

    fn next(&mut self, reason: &str) -> u8 {
        if self.cursor >= self.tape.len() {
            if self.scripted {
                panic!("TurnRng tape exhausted while rolling for: {}", reason);
            }
            self.refill();
        }
        let value = self.tape[self.cursor];
        self.cursor += 1;
        value
    }

    /// Roll against a probability in [0.0, 1.0]; true means success.
    pub fn roll_chance(&mut self, probability: f64, reason: &str) -> bool {
        f64::from(self.next(reason) - 1) < probability * 100.0
    }

    /// The per-hit damage spread: uniform over [0.85, 1.0]. A scripted roll
    /// of 100 pins the factor to exactly 1.0, a roll of 1 to 0.85.
    pub fn damage_factor(&mut self, reason: &str) -> f64 {
        0.85 + 0.15 * f64::from(self.next(reason) - 1) / 99.0
    }

    /// Uniform index into a non-empty slice of `len` elements.
    pub fn pick_index(&mut self, len: usize, reason: &str) -> usize {
        debug_assert!(len > 0, "pick_index on empty slice for: {}", reason);
        usize::from(self.next(reason) - 1) % len
    }

    /// Uniform value in `lo..=hi`.
    pub fn range(&mut self, lo: u8, hi: u8, reason: &str) -> u8 {
        debug_assert!(lo <= hi);
        lo + (self.next(reason) - 1) % (hi - lo + 1)
    }

    /// Fair coin; rolls of 1..=50 come up true.
    pub fn coin(&mut self, reason: &str) -> bool {
        self.next(reason) <= 50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_rolls_come_back_in_order() {
        let mut rng = TurnRng::new_for_test(vec![100, 1, 50]);
        assert_eq!(rng.damage_factor("first"), 1.0);
        assert_eq!(rng.damage_factor("second"), 0.85);
        assert!(rng.coin("third"));
    }

    #[test]
    #[should_panic(expected = "capture roll")]
    fn exhausted_scripted_tape_names_the_roll() {
        let mut rng = TurnRng::new_for_test(vec![10]);
        rng.roll_chance(0.5, "first roll");
        rng.roll_chance(0.5, "capture roll");
    }

    #[test]
    fn chance_extremes() {
        let mut rng = TurnRng::new_for_test(vec![100, 1]);
        assert!(!rng.roll_chance(0.0, "never"));
        assert!(rng.roll_chance(1.0, "always"));
    }

    #[test]
    fn random_tape_refills_instead_of_panicking() {
        let mut rng = TurnRng::new_random();
        for _ in 0..(REFILL_CHUNK * 3) {
            let idx = rng.pick_index(4, "move pick");
            assert!(idx < 4);
        }
    }
}
