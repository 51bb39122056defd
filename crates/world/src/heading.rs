use std::f32::consts::TAU;

use serde::Serialize;

/// Animation angle in radians, kept in `[0, 2π)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
pub struct Heading(f32);

impl Heading {
    pub fn radians(self) -> f32 {
        self.0
    }

    /// Advance by `step`; reaching or passing a full turn resets to exactly 0.
    ///
    /// The reset is a threshold compare, not a modulo: the remainder past 2π
    /// is discarded. Anything else outside `[0, 2π)`, including NaN from a
    /// bad step, also resets to 0.
    pub fn advance(&mut self, step: f32) {
        self.0 += step;
        if !(0.0..TAU).contains(&self.0) {
            self.0 = 0.0;
        }
    }
}
