//! Model abstraction used by the runners.

use crate::engine::{BalanceEngine, StepReport};
use crate::error::SimResult;
use crate::state::PhysicalState;
use rf_controls::{Actuation, InterlockSettings, actuate};

/// Trait for discrete-time models advanced by an explicit step.
///
/// A TickModel must implement:
/// - State type (Clone, for snapshots)
/// - `advance`: produce the state `dt` seconds later
pub trait TickModel {
    /// State type (must be Clone).
    type State: Clone;

    /// Advance `x` by `dt` seconds.
    fn advance(&self, x: &Self::State, dt: f64) -> SimResult<Self::State>;
}

/// Result of one control + balance tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Actuation computed from the pre-tick state
    pub actuation: Actuation,
    pub state: PhysicalState,
    pub report: StepReport,
}

/// Interlocks and balance engine wired together: the unit the scheduler
/// drives once per tick.
#[derive(Debug, Clone)]
pub struct ProcessModel {
    pub engine: BalanceEngine,
    pub interlocks: InterlockSettings,
}

impl ProcessModel {
    pub fn new(engine: BalanceEngine, interlocks: InterlockSettings) -> Self {
        Self { engine, interlocks }
    }

    /// Actuation the interlocks would command for `state` right now.
    pub fn actuation(&self, state: &PhysicalState) -> Actuation {
        actuate(state, state.clock.running, &self.interlocks)
    }

    /// Evaluate the interlocks on `state`, then step the balance engine.
    pub fn tick(&self, state: &PhysicalState, dt_sim: f64) -> SimResult<TickOutcome> {
        let actuation = self.actuation(state);
        let outcome = self.engine.step(state, &actuation, dt_sim)?;
        Ok(TickOutcome {
            actuation,
            state: outcome.state,
            report: outcome.report,
        })
    }
}

impl TickModel for ProcessModel {
    type State = PhysicalState;

    fn advance(&self, x: &PhysicalState, dt: f64) -> SimResult<PhysicalState> {
        Ok(self.tick(x, dt)?.state)
    }
}
