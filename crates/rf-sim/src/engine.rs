//! Balance engine: advances the plant by one explicit step.
//!
//! Order per step (flows use pre-step levels so each tick stays
//! mass-conservative):
//!
//! 1. P-01 acid transfer T-01 -> M-01
//! 2. V-01 water dosing into M-01
//! 3. P-02 dilute acid M-01 -> R-01
//! 4. Reaction of the acid batch delivered in (3) with the CaCO3 charge
//! 5. Headspace pressure from the CO2 inventory
//! 6. PSV relief toward set pressure
//! 7. Clock advance
//!
//! Every transfer is capped at what the source holds and what the receiver can
//! take; a pump running dry is not an error.

use crate::chemistry::{adiabatic_temperature_rise, headspace_pressure_bar_abs, react_batch};
use crate::error::{SimError, SimResult};
use crate::invariants;
use crate::params::PlantParams;
use crate::relief::SafetyValve;
use crate::state::{Parcel, PhysicalState};
use rf_controls::Actuation;

/// What happened during one step. Intended for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    /// Volume moved by P-01 (m³)
    pub pump1_m3: f64,
    /// Acid moved by P-01 (kg H2SO4)
    pub pump1_solute_kg: f64,
    /// Water dosed through V-01 (m³)
    pub water_m3: f64,
    /// Volume moved by P-02 (m³)
    pub pump2_m3: f64,
    /// Acid moved by P-02 (kg H2SO4)
    pub pump2_solute_kg: f64,
    /// Moles of CaCO3/H2SO4 reacted
    pub reacted_mol: f64,
    /// H2SO4 consumed by reaction (kg)
    pub acid_consumed_kg: f64,
    pub co2_generated_mol: f64,
    pub co2_vented_mol: f64,
    pub heat_released_j: f64,
    /// PSV lifted during this step
    pub psv_open: bool,
}

/// New state plus the step report.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: PhysicalState,
    pub report: StepReport,
}

#[derive(Debug, Clone)]
pub struct BalanceEngine {
    params: PlantParams,
    psv: SafetyValve,
}

impl BalanceEngine {
    /// Create an engine for validated plant parameters.
    pub fn new(params: PlantParams) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            psv: SafetyValve::new(params.relief),
            params,
        })
    }

    pub fn params(&self) -> &PlantParams {
        &self.params
    }

    /// Initial charge for this plant.
    pub fn initial_state(&self) -> PhysicalState {
        PhysicalState::initial(&self.params)
    }

    /// Gas volume above the reactor liquid, floored at `min_headspace_m3`.
    pub fn headspace_m3(&self, state: &PhysicalState) -> f64 {
        state
            .reactor
            .free_m3()
            .max(self.params.relief.min_headspace_m3)
    }

    /// Advance `state` by `dt_sim` seconds with the given actuation.
    ///
    /// # Errors
    ///
    /// - `InvalidArg` if `dt_sim` is negative or not finite
    /// - `InvariantViolated` if the resulting state fails [`invariants::check`];
    ///   the caller must not continue from it
    pub fn step(
        &self,
        state: &PhysicalState,
        actuation: &Actuation,
        dt_sim: f64,
    ) -> SimResult<StepOutcome> {
        if !dt_sim.is_finite() || dt_sim < 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt_sim must be finite and non-negative",
            });
        }

        let rho = self.params.chemistry.density_kg_per_m3;
        let flows = &self.params.flows;
        let mut next = state.clone();
        let mut report = StepReport::default();

        // 1. P-01
        if actuation.pump1_on {
            let dv = (flows.pump1_m3_per_s() * dt_sim)
                .min(next.feed.level_m3)
                .min(next.mix.free_m3());
            let parcel = next.feed.withdraw(dv, rho);
            report.pump1_m3 = parcel.volume_m3;
            report.pump1_solute_kg = parcel.solute_kg;
            next.mix.receive(parcel, rho);
        }

        // 2. V-01
        if actuation.valve_on {
            let dv = (flows.water_m3_per_s() * dt_sim).min(next.mix.free_m3());
            next.mix.receive(Parcel::water(dv, flows.water_temperature_k), rho);
            report.water_m3 = dv;
        }

        // 3. P-02
        if actuation.pump2_on {
            let dv = (flows.pump2_m3_per_s() * dt_sim)
                .min(next.mix.level_m3)
                .min(next.reactor.free_m3());
            let parcel = next.mix.withdraw(dv, rho);
            report.pump2_m3 = parcel.volume_m3;
            report.pump2_solute_kg = parcel.solute_kg;
            next.reactor.receive(parcel, rho);
        }

        // 4. Reaction
        let reaction = react_batch(
            report.pump2_solute_kg,
            next.reactor_extra.ca_mass_kg,
            &self.params.chemistry,
        );
        if reaction.reacted_mol > 0.0 {
            next.reactor_extra.ca_mass_kg = reaction.caco3_remaining_kg;
            next.reactor.consume_solute(reaction.acid_consumed_kg, rho);
            next.reactor_extra.co2_moles += reaction.co2_generated_mol;
            next.reactor.temperature_k += adiabatic_temperature_rise(
                reaction.heat_released_j,
                next.reactor.level_m3 * rho,
                self.params.chemistry.heat_capacity_j_per_kg_k,
            );

            report.reacted_mol = reaction.reacted_mol;
            report.acid_consumed_kg = reaction.acid_consumed_kg;
            report.co2_generated_mol = reaction.co2_generated_mol;
            report.heat_released_j = reaction.heat_released_j;
        }

        // 5. Pressure
        let headspace = self.headspace_m3(&next);
        next.reactor_extra.pressure_bar_abs = headspace_pressure_bar_abs(
            next.reactor_extra.co2_moles,
            next.reactor.temperature_k,
            headspace,
        );

        // 6. PSV
        let relief = self.psv.relieve(
            next.pressure_bar_g(),
            next.reactor_extra.co2_moles,
            next.reactor.temperature_k,
            headspace,
            dt_sim,
        );
        if relief.open {
            next.reactor_extra.co2_moles =
                (next.reactor_extra.co2_moles - relief.vented_mol).max(0.0);
            next.reactor_extra.pressure_bar_abs = headspace_pressure_bar_abs(
                next.reactor_extra.co2_moles,
                next.reactor.temperature_k,
                headspace,
            );
            report.psv_open = true;
            report.co2_vented_mol = relief.vented_mol;
            tracing::debug!(
                set_bar_g = self.psv.set_pressure_bar_g(),
                vented_mol = relief.vented_mol,
                "PSV relieving"
            );
        }

        // 7. Clock
        next.clock.time_s += dt_sim;

        invariants::check(&next)?;

        Ok(StepOutcome {
            state: next,
            report,
        })
    }
}
