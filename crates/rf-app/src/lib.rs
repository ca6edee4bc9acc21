//! Application layer for the process simulation.
//!
//! This crate owns the real-time side: a background scheduler that advances
//! the plant under a speed multiplier, and the service boundary that turns
//! snapshots and commands into the JSON contract used by front-ends.

pub mod error;
pub mod scheduler;
pub mod service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use scheduler::{
    EquipmentStatus, Scheduler, SchedulerOptions, SchedulerStatus, SimulationCore,
};
pub use service::{SimulationService, SpeedRequest, SpeedResponse, StateResponse, TankResponse};
