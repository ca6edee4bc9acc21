//! Equipment interlock logic for the acid / dilution / reactor train.
//!
//! This crate decides, from the current plant measurements, which pieces of
//! equipment are energised:
//!
//! - **P-01** acid transfer pump, T-01 -> M-01
//! - **V-01** dilution water valve into M-01
//! - **P-02** dilute acid pump, M-01 -> R-01
//! - **A-01** M-01 agitator
//!
//! The reactor PSV is mechanical and has no interlock; it relieves inside the
//! balance engine.
//!
//! # Design Principles
//!
//! - **Stateless**: actuation is recomputed from canonical plant state on every
//!   tick and never stored as independently mutable flags
//! - **Decoupled**: the plant state is read through [`ProcessMeasurements`], so
//!   this crate does not depend on the simulation model

pub mod error;
pub mod interlock;
pub mod measured;

pub use error::{ControlError, ControlResult};
pub use interlock::{Actuation, InterlockSettings, actuate};
pub use measured::{ProcessMeasurements, TankReading};
