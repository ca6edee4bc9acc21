//! Plant parameters: vessel sizes, initial charge, equipment duties and the
//! chemistry constants the balance engine works with.
//!
//! Defaults describe the reference plant: a 5 m³ acid buffer full of 98 wt-%
//! H2SO4, an empty 10 m³ dilution tank and a 10 m³ reactor pre-charged with
//! 5 m³ of 10 wt-% CaCO3 slurry.

use crate::error::SimResult;
use rf_core::numeric::{ensure_non_negative, ensure_positive, ensure_within};
use rf_core::units::{bar, m3_per_h, to_m3_per_s};
use serde::{Deserialize, Serialize};

/// Size and initial contents of one vessel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselParams {
    /// Capacity (m³)
    pub volume_m3: f64,
    /// Liquid charged at start / reset (m³)
    pub initial_level_m3: f64,
    /// H2SO4 mass fraction of the initial charge (wt-%)
    #[serde(default)]
    pub initial_concentration_wt: f64,
    /// Temperature of the initial charge (K)
    #[serde(default = "default_temperature_k")]
    pub initial_temperature_k: f64,
}

fn default_temperature_k() -> f64 {
    298.0
}

impl VesselParams {
    fn validate(&self, what: &'static str) -> SimResult<()> {
        ensure_positive(self.volume_m3, what)?;
        ensure_within(self.initial_level_m3, 0.0, self.volume_m3, what)?;
        ensure_within(self.initial_concentration_wt, 0.0, 100.0, what)?;
        ensure_positive(self.initial_temperature_k, what)?;
        Ok(())
    }
}

/// Equipment duties. Quoted per hour, the way the plant datasheet gives them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowParams {
    /// P-01 acid transfer T-01 -> M-01 (m³/h)
    pub pump1_m3_per_h: f64,
    /// V-01 dilution water into M-01 (m³/h)
    pub water_m3_per_h: f64,
    /// P-02 dilute acid M-01 -> R-01 (m³/h)
    pub pump2_m3_per_h: f64,
    /// Dilution water supply temperature (K)
    pub water_temperature_k: f64,
}

impl Default for FlowParams {
    fn default() -> Self {
        Self {
            pump1_m3_per_h: 0.5,
            water_m3_per_h: 4.0,
            pump2_m3_per_h: 1.0,
            water_temperature_k: 298.0,
        }
    }
}

impl FlowParams {
    pub fn pump1_m3_per_s(&self) -> f64 {
        to_m3_per_s(m3_per_h(self.pump1_m3_per_h))
    }

    pub fn water_m3_per_s(&self) -> f64 {
        to_m3_per_s(m3_per_h(self.water_m3_per_h))
    }

    pub fn pump2_m3_per_s(&self) -> f64 {
        to_m3_per_s(m3_per_h(self.pump2_m3_per_h))
    }

    fn validate(&self) -> SimResult<()> {
        ensure_non_negative(self.pump1_m3_per_h, "pump1_m3_per_h")?;
        ensure_non_negative(self.water_m3_per_h, "water_m3_per_h")?;
        ensure_non_negative(self.pump2_m3_per_h, "pump2_m3_per_h")?;
        ensure_positive(self.water_temperature_k, "water_temperature_k")?;
        Ok(())
    }
}

/// Constants for CaCO3 + H2SO4 -> CaSO4 + CO2 + H2O.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChemistryParams {
    /// Liquid density used for every stream (kg/m³)
    pub density_kg_per_m3: f64,
    /// CaCO3 molar mass (kg/mol)
    pub molar_mass_caco3_kg_per_mol: f64,
    /// H2SO4 molar mass (kg/mol)
    pub molar_mass_h2so4_kg_per_mol: f64,
    /// Heat released per mole reacted (J/mol, positive = exothermic)
    pub reaction_heat_j_per_mol: f64,
    /// Reactor contents heat capacity (J/(kg·K))
    pub heat_capacity_j_per_kg_k: f64,
}

impl Default for ChemistryParams {
    fn default() -> Self {
        Self {
            density_kg_per_m3: 1000.0,
            molar_mass_caco3_kg_per_mol: 0.100_09,
            molar_mass_h2so4_kg_per_mol: 0.098_079,
            reaction_heat_j_per_mol: 90_000.0,
            heat_capacity_j_per_kg_k: 4180.0,
        }
    }
}

impl ChemistryParams {
    fn validate(&self) -> SimResult<()> {
        ensure_positive(self.density_kg_per_m3, "density_kg_per_m3")?;
        ensure_positive(self.molar_mass_caco3_kg_per_mol, "molar_mass_caco3_kg_per_mol")?;
        ensure_positive(self.molar_mass_h2so4_kg_per_mol, "molar_mass_h2so4_kg_per_mol")?;
        ensure_positive(self.heat_capacity_j_per_kg_k, "heat_capacity_j_per_kg_k")?;
        ensure_non_negative(self.reaction_heat_j_per_mol, "reaction_heat_j_per_mol")?;
        Ok(())
    }
}

/// Reactor safety valve and headspace handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliefParams {
    /// PSV set pressure (bar g)
    pub set_pressure_bar_g: f64,
    /// First-order relief time constant (s)
    pub relief_time_constant_s: f64,
    /// Floor on the gas volume used in the pressure calculation (m³)
    pub min_headspace_m3: f64,
}

impl Default for ReliefParams {
    fn default() -> Self {
        Self {
            set_pressure_bar_g: 3.0,
            relief_time_constant_s: 2.0,
            min_headspace_m3: 0.01,
        }
    }
}

impl ReliefParams {
    /// Set pressure as a gauge value in Pa.
    pub fn set_pressure_pa_g(&self) -> f64 {
        bar(self.set_pressure_bar_g).value
    }

    fn validate(&self) -> SimResult<()> {
        ensure_non_negative(self.set_pressure_bar_g, "set_pressure_bar_g")?;
        ensure_positive(self.relief_time_constant_s, "relief_time_constant_s")?;
        ensure_positive(self.min_headspace_m3, "min_headspace_m3")?;
        Ok(())
    }
}

/// Everything the balance engine and the initial charge need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantParams {
    /// T-01 acid buffer tank
    pub feed: VesselParams,
    /// M-01 dilution tank
    pub mix: VesselParams,
    /// R-01 reactor; `initial_level_m3` is the slurry charge
    pub reactor: VesselParams,
    /// CaCO3 mass fraction of the reactor slurry (wt-%)
    pub slurry_caco3_wt: f64,
    pub flows: FlowParams,
    pub chemistry: ChemistryParams,
    pub relief: ReliefParams,
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            feed: VesselParams {
                volume_m3: 5.0,
                initial_level_m3: 5.0,
                initial_concentration_wt: 98.0,
                initial_temperature_k: 298.0,
            },
            mix: VesselParams {
                volume_m3: 10.0,
                initial_level_m3: 0.0,
                initial_concentration_wt: 0.0,
                initial_temperature_k: 298.0,
            },
            reactor: VesselParams {
                volume_m3: 10.0,
                initial_level_m3: 5.0,
                initial_concentration_wt: 0.0,
                initial_temperature_k: 298.0,
            },
            slurry_caco3_wt: 10.0,
            flows: FlowParams::default(),
            chemistry: ChemistryParams::default(),
            relief: ReliefParams::default(),
        }
    }
}

impl PlantParams {
    /// CaCO3 charged with the reactor slurry (kg).
    pub fn initial_caco3_kg(&self) -> f64 {
        self.reactor.initial_level_m3 * self.chemistry.density_kg_per_m3 * self.slurry_caco3_wt
            / 100.0
    }

    pub fn validate(&self) -> SimResult<()> {
        self.feed.validate("feed vessel")?;
        self.mix.validate("mix vessel")?;
        self.reactor.validate("reactor vessel")?;
        ensure_within(self.slurry_caco3_wt, 0.0, 100.0, "slurry_caco3_wt")?;
        self.flows.validate()?;
        self.chemistry.validate()?;
        self.relief.validate()?;
        Ok(())
    }
}
