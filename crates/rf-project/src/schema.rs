//! Process definition schema.
//!
//! Every section except `version` and `name` may be omitted and falls back to
//! the reference plant.

use rf_controls::InterlockSettings;
use rf_sim::{BalanceEngine, PlantParams, ProcessModel, SimResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub plant: PlantParams,
    #[serde(default)]
    pub interlocks: InterlockSettings,
    #[serde(default)]
    pub scheduler: SchedulerDef,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            version: crate::migrate::LATEST_VERSION,
            name: "Reference plant".to_string(),
            plant: PlantParams::default(),
            interlocks: InterlockSettings::default(),
            scheduler: SchedulerDef::default(),
        }
    }
}

impl Project {
    /// Balance engine for this plant.
    pub fn engine(&self) -> SimResult<BalanceEngine> {
        BalanceEngine::new(self.plant)
    }

    /// Interlocks and engine ready to tick.
    pub fn model(&self) -> SimResult<ProcessModel> {
        Ok(ProcessModel::new(self.engine()?, self.interlocks))
    }
}

/// Real-time pacing of the background scheduler.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerDef {
    /// Wall-clock period between ticks (ms)
    pub tick_interval_ms: u64,
    /// Upper bound on wall time credited to a single tick (s)
    pub max_wall_step_s: f64,
    /// Speed multiplier applied at start-up
    pub speed_factor: f64,
}

impl Default for SchedulerDef {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            max_wall_step_s: 1.0,
            speed_factor: 1.0,
        }
    }
}
