//! Reactor safety valve (PSV) with first-order relief.
//!
//! Above set pressure the valve vents the excess CO2 inventory with time
//! constant `tau`:
//!
//! ```text
//! n_set  = p_set,g * V_head / (R * T)
//! vented = (n - n_set) * (1 - exp(-dt / tau))
//! ```
//!
//! The exponential form is exact for the linear relief law, so the vented
//! amount never exceeds the excess no matter how large `dt` is and the
//! pressure relaxes onto the set point from above without undershooting.

use crate::chemistry::co2_moles_at_gauge;
use crate::params::ReliefParams;

/// Outcome of one relief evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Relief {
    /// Whether the valve was lifted this tick
    pub open: bool,
    /// CO2 vented (mol)
    pub vented_mol: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SafetyValve {
    params: ReliefParams,
}

impl SafetyValve {
    pub fn new(params: ReliefParams) -> Self {
        Self { params }
    }

    pub fn set_pressure_bar_g(&self) -> f64 {
        self.params.set_pressure_bar_g
    }

    /// Fraction of the excess inventory released over `dt`.
    pub fn relief_fraction(&self, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }
        1.0 - (-dt / self.params.relief_time_constant_s).exp()
    }

    /// Evaluate the valve against the current headspace.
    pub fn relieve(
        &self,
        gauge_bar: f64,
        co2_mol: f64,
        temperature_k: f64,
        headspace_m3: f64,
        dt: f64,
    ) -> Relief {
        if gauge_bar <= self.params.set_pressure_bar_g {
            return Relief::default();
        }
        let n_set =
            co2_moles_at_gauge(self.params.set_pressure_pa_g(), temperature_k, headspace_m3);
        let excess = (co2_mol - n_set).max(0.0);
        Relief {
            open: true,
            vented_mol: excess * self.relief_fraction(dt),
        }
    }
}
