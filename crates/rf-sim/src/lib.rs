//! Time-stepped process model for the acid / dilution / reactor train.
//!
//! Provides:
//! - Physical state of the three vessels, reactor extras and simulation clock
//! - Balance engine: transfers, dilution, CaCO3 + H2SO4 reaction, headspace
//!   pressure and safety-valve relief in one explicit step
//! - Invariant checks treated as fatal defects
//! - Fixed-step offline runner

pub mod chemistry;
pub mod engine;
pub mod error;
pub mod invariants;
pub mod model;
pub mod params;
pub mod relief;
pub mod sim;
pub mod state;

// Re-exports for public API
pub use engine::{BalanceEngine, StepOutcome, StepReport};
pub use error::{SimError, SimResult};
pub use model::{ProcessModel, TickModel, TickOutcome};
pub use params::{ChemistryParams, FlowParams, PlantParams, ReliefParams, VesselParams};
pub use sim::{SimOptions, SimRecord, run_sim};
pub use state::{
    Parcel, PhysicalState, ReactorExtra, SPEED_MAX, SPEED_MIN, SimulationClock, Tank, TankId,
};
