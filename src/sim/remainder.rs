//! Fractional motion accumulator
//!
//! Bodies live on integer pixels but move at fractional speeds. Each axis
//! keeps the leftover fraction from previous ticks and folds it into the next
//! integration, so a body moving at 0.3 px/tick advances 3 pixels every 10
//! ticks instead of never (or always) moving.

use serde::{Deserialize, Serialize};

/// Per-axis fractional remainder
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Remainder(f32);

impl Remainder {
    /// Fold `amount` into the remainder and return the whole-pixel step count
    ///
    /// Rounds half away from zero. After the call the stored remainder is
    /// strictly inside (-1, 1); the rounding error is carried, never dropped,
    /// so long-run displacement converges to the true velocity.
    pub fn integrate(&mut self, amount: f32) -> i32 {
        self.0 += amount;
        let steps = self.0.round();
        self.0 -= steps;
        steps as i32
    }

    /// Drop any carried fraction (used when gameplay zeroes a velocity and
    /// wants no residual creep on the next tick)
    pub fn reset(&mut self) {
        self.0 = 0.0;
    }

    /// The carried fraction, for diagnostics
    #[inline]
    pub fn fraction(&self) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integrate_carries_fraction() {
        let mut rem = Remainder::default();
        // 0.3 px/tick: pattern of 0 and 1 steps summing to 3 per 10 ticks
        let mut total = 0;
        for _ in 0..10 {
            total += rem.integrate(0.3);
        }
        assert_eq!(total, 3);
    }

    #[test]
    fn test_integrate_rounds_half_away_from_zero() {
        let mut rem = Remainder::default();
        assert_eq!(rem.integrate(0.5), 1);
        assert_eq!(rem.fraction(), -0.5);

        let mut rem = Remainder::default();
        assert_eq!(rem.integrate(-0.5), -1);
        assert_eq!(rem.fraction(), 0.5);
    }

    #[test]
    fn test_reset_drops_fraction() {
        let mut rem = Remainder::default();
        rem.integrate(0.4);
        rem.reset();
        assert_eq!(rem.integrate(0.0), 0);
        assert_eq!(rem.fraction(), 0.0);
    }

    proptest! {
        /// Constant-velocity integration never drifts more than a pixel from
        /// the exact displacement, for any tick count.
        #[test]
        fn prop_no_drift(vel in -8.0f32..8.0, ticks in 1usize..2000) {
            let mut rem = Remainder::default();
            let mut total: i64 = 0;
            for _ in 0..ticks {
                total += rem.integrate(vel) as i64;
            }
            let exact = vel as f64 * ticks as f64;
            prop_assert!((total as f64 - exact).abs() < 1.0);
        }

        /// The stored remainder stays strictly inside (-1, 1).
        #[test]
        fn prop_remainder_bounded(amounts in prop::collection::vec(-4.0f32..4.0, 1..200)) {
            let mut rem = Remainder::default();
            for a in amounts {
                rem.integrate(a);
                prop_assert!(rem.fraction() > -1.0 && rem.fraction() < 1.0);
            }
        }
    }
}
