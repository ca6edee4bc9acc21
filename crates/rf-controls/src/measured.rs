//! Measurement access for the interlocks.
//!
//! The interlocks only need a handful of readings from the plant. They are
//! pulled through [`ProcessMeasurements`], implemented by the simulation state,
//! so the rules can be exercised against hand-built readings in tests.

/// Level and concentration reading of one vessel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TankReading {
    /// Current liquid volume (m³).
    pub level_m3: f64,
    /// Capacity (m³).
    pub volume_m3: f64,
    /// Acid mass fraction (wt-%).
    pub concentration_wt: f64,
}

impl TankReading {
    pub fn is_empty(&self) -> bool {
        self.level_m3 <= 0.0
    }

    pub fn is_full(&self) -> bool {
        self.level_m3 >= self.volume_m3
    }
}

/// Trait for types that can provide the readings the interlocks act on.
pub trait ProcessMeasurements {
    /// Acid buffer tank T-01.
    fn feed_tank(&self) -> TankReading;

    /// Dilution tank M-01.
    fn mix_tank(&self) -> TankReading;
}
