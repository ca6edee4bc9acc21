//! Service boundary: the JSON contract front-ends talk to.
//!
//! ```text
//! GET  /api/state -> StateResponse
//! POST /api/start
//! POST /api/pause
//! POST /api/reset
//! POST /api/speed    SpeedRequest -> SpeedResponse
//! ```
//!
//! Transport is left to the embedding application; this type only maps
//! requests onto scheduler commands and snapshots onto response bodies.

use crate::error::AppResult;
use crate::scheduler::{EquipmentStatus, Scheduler, SchedulerOptions, SchedulerStatus};
use rf_project::Project;
use rf_sim::{PhysicalState, Tank};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankResponse {
    pub level_m3: f64,
    pub volume_m3: f64,
    pub concentration_wt: f64,
}

impl From<&Tank> for TankResponse {
    fn from(tank: &Tank) -> Self {
        Self {
            level_m3: tank.level_m3,
            volume_m3: tank.volume_m3,
            concentration_wt: tank.concentration_wt,
        }
    }
}

/// Snapshot body. Tanks are always T-01, M-01, R-01 in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Simulated time (s)
    pub time: f64,
    pub running: bool,
    pub speed_factor: f64,
    /// Unreacted CaCO3 (kg)
    pub ca_mass: f64,
    pub pressure_bar_g: f64,
    pub tanks: [TankResponse; 3],
}

impl From<&PhysicalState> for StateResponse {
    fn from(state: &PhysicalState) -> Self {
        Self {
            time: state.clock.time_s,
            running: state.clock.running,
            speed_factor: state.clock.speed_factor,
            ca_mass: state.reactor_extra.ca_mass_kg,
            pressure_bar_g: state.pressure_bar_g(),
            tanks: state.tanks().map(TankResponse::from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRequest {
    pub factor: f64,
}

/// Factor in effect after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedResponse {
    pub speed_factor: f64,
}

pub struct SimulationService {
    scheduler: Scheduler,
}

impl SimulationService {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    /// Build the model described by `project` and spawn its scheduler.
    pub fn from_project(project: &Project) -> AppResult<Self> {
        let model = project.model()?;
        let initial = model.engine.initial_state();
        let options = SchedulerOptions::from(&project.scheduler);
        tracing::info!(name = %project.name, "loading process");
        Ok(Self::new(Scheduler::spawn(model, initial, options)?))
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn state(&self) -> StateResponse {
        StateResponse::from(&self.scheduler.snapshot())
    }

    pub fn state_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(&self.state())?)
    }

    pub fn start(&self) -> SchedulerStatus {
        self.scheduler.start()
    }

    pub fn pause(&self) -> SchedulerStatus {
        self.scheduler.pause()
    }

    pub fn reset(&self) -> SchedulerStatus {
        self.scheduler.reset()
    }

    pub fn set_speed(&self, request: SpeedRequest) -> SpeedResponse {
        SpeedResponse {
            speed_factor: self.scheduler.set_speed(request.factor),
        }
    }

    /// Parse a `{ "factor": .. }` body and apply it.
    pub fn set_speed_json(&self, body: &str) -> AppResult<SpeedResponse> {
        let request: SpeedRequest = serde_json::from_str(body)?;
        Ok(self.set_speed(request))
    }

    pub fn equipment(&self) -> EquipmentStatus {
        self.scheduler.equipment()
    }

    pub fn status(&self) -> SchedulerStatus {
        self.scheduler.status()
    }

    pub fn shutdown(&mut self) {
        self.scheduler.shutdown();
    }
}
