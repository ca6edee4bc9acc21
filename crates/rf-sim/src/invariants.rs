//! Post-step state checks.
//!
//! The engine clamps every transfer, so none of these should ever fire. When
//! one does, the state is not trustworthy and stepping must stop.

use crate::error::{SimError, SimResult};
use crate::state::{PhysicalState, SPEED_MAX, SPEED_MIN, Tank};

/// Slack on upper bounds for accumulated round-off.
const BOUND_SLACK: f64 = 1e-9;

fn violated(what: String, value: f64) -> SimError {
    SimError::InvariantViolated { what, value }
}

fn check_finite_non_negative(value: f64, what: impl FnOnce() -> String) -> SimResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(violated(what(), value));
    }
    Ok(())
}

fn check_tank(tank: &Tank) -> SimResult<()> {
    let tag = tank.id.tag();
    check_finite_non_negative(tank.level_m3, || format!("{tag} level_m3"))?;
    if tank.level_m3 > tank.volume_m3 {
        return Err(violated(
            format!("{tag} level_m3 above volume {}", tank.volume_m3),
            tank.level_m3,
        ));
    }
    check_finite_non_negative(tank.concentration_wt, || format!("{tag} concentration_wt"))?;
    if tank.concentration_wt > 100.0 + BOUND_SLACK {
        return Err(violated(
            format!("{tag} concentration_wt above 100"),
            tank.concentration_wt,
        ));
    }
    if !tank.temperature_k.is_finite() || tank.temperature_k <= 0.0 {
        return Err(violated(format!("{tag} temperature_k"), tank.temperature_k));
    }
    Ok(())
}

/// Check level bounds, non-negative masses, pressure floor and clock sanity.
pub fn check(state: &PhysicalState) -> SimResult<()> {
    for tank in state.tanks() {
        check_tank(tank)?;
    }

    let extra = &state.reactor_extra;
    check_finite_non_negative(extra.ca_mass_kg, || "ca_mass_kg".to_string())?;
    check_finite_non_negative(extra.co2_moles, || "co2_moles".to_string())?;
    if !extra.pressure_bar_abs.is_finite() || extra.pressure_bar_abs < 1.0 - BOUND_SLACK {
        return Err(violated(
            "pressure_bar_abs below atmospheric".to_string(),
            extra.pressure_bar_abs,
        ));
    }

    check_finite_non_negative(state.clock.time_s, || "time_s".to_string())?;
    let speed = state.clock.speed_factor;
    if !(SPEED_MIN..=SPEED_MAX).contains(&speed) {
        return Err(violated("speed_factor".to_string(), speed));
    }
    Ok(())
}
