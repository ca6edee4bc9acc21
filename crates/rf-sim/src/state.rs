//! Physical state of the process train at one simulated instant.
//!
//! `PhysicalState` is a plain value: the scheduler owns the single live copy and
//! everybody else receives clones.

use crate::params::{PlantParams, VesselParams};
use rf_controls::{ProcessMeasurements, TankReading};
use rf_core::numeric::{Tolerances, snap_to_zero};
use rf_core::units::constants::atmosphere;
use rf_core::units::to_bar;

/// Slowest accepted speed multiplier.
pub const SPEED_MIN: f64 = 0.1;
/// Fastest accepted speed multiplier.
pub const SPEED_MAX: f64 = 100.0;

/// Vessel role. Positional order T-01, M-01, R-01 is part of the external
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TankId {
    Feed,
    Mix,
    Reactor,
}

impl TankId {
    pub const ALL: [TankId; 3] = [TankId::Feed, TankId::Mix, TankId::Reactor];

    pub fn tag(self) -> &'static str {
        match self {
            TankId::Feed => "T-01",
            TankId::Mix => "M-01",
            TankId::Reactor => "R-01",
        }
    }
}

/// A volume of liquid moved between vessels in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Parcel {
    pub volume_m3: f64,
    /// Dissolved H2SO4 carried along (kg)
    pub solute_kg: f64,
    pub temperature_k: f64,
}

impl Parcel {
    /// Solute-free water.
    pub fn water(volume_m3: f64, temperature_k: f64) -> Self {
        Self {
            volume_m3,
            solute_kg: 0.0,
            temperature_k,
        }
    }
}

/// Lumped liquid inventory of one vessel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tank {
    pub id: TankId,
    /// Fixed capacity (m³)
    pub volume_m3: f64,
    /// Current liquid volume (m³), `0 <= level <= volume`
    pub level_m3: f64,
    /// H2SO4 mass fraction (wt-%)
    pub concentration_wt: f64,
    pub temperature_k: f64,
}

impl Tank {
    pub fn from_params(id: TankId, p: &VesselParams) -> Self {
        Self {
            id,
            volume_m3: p.volume_m3,
            level_m3: p.initial_level_m3,
            concentration_wt: p.initial_concentration_wt,
            temperature_k: p.initial_temperature_k,
        }
    }

    /// Unused capacity (m³).
    pub fn free_m3(&self) -> f64 {
        (self.volume_m3 - self.level_m3).max(0.0)
    }

    /// Dissolved acid (kg) at the given liquid density.
    pub fn solute_kg(&self, density_kg_per_m3: f64) -> f64 {
        self.level_m3 * density_kg_per_m3 * self.concentration_wt / 100.0
    }

    /// Draw up to `volume_m3` from the vessel. The draw is capped at the
    /// current level; concentration and temperature of the remainder are
    /// unchanged.
    pub fn withdraw(&mut self, volume_m3: f64, density_kg_per_m3: f64) -> Parcel {
        let dv = volume_m3.clamp(0.0, self.level_m3);
        let parcel = Parcel {
            volume_m3: dv,
            solute_kg: dv * density_kg_per_m3 * self.concentration_wt / 100.0,
            temperature_k: self.temperature_k,
        };
        self.level_m3 = snap_to_zero(self.level_m3 - dv, Tolerances::default());
        if self.level_m3 == 0.0 {
            self.concentration_wt = 0.0;
        }
        parcel
    }

    /// Blend a parcel into the vessel.
    ///
    /// Concentration follows solute-mass conservation,
    /// `c' = (m_solute + m_in) / (rho * V')`; temperature follows adiabatic
    /// mixing at equal heat capacity. The level is clamped at capacity.
    pub fn receive(&mut self, parcel: Parcel, density_kg_per_m3: f64) {
        if parcel.volume_m3 <= 0.0 {
            return;
        }
        let old_level = self.level_m3;
        let solute = self.solute_kg(density_kg_per_m3) + parcel.solute_kg;
        let new_level = old_level + parcel.volume_m3;

        self.temperature_k =
            (self.temperature_k * old_level + parcel.temperature_k * parcel.volume_m3) / new_level;
        self.concentration_wt = solute / (new_level * density_kg_per_m3) * 100.0;
        self.level_m3 = new_level.min(self.volume_m3);
    }

    /// Remove dissolved acid consumed by reaction (kg), capped at what is
    /// present.
    pub fn consume_solute(&mut self, kg: f64, density_kg_per_m3: f64) {
        if self.level_m3 <= 0.0 {
            return;
        }
        let remaining = (self.solute_kg(density_kg_per_m3) - kg).max(0.0);
        self.concentration_wt = remaining / (self.level_m3 * density_kg_per_m3) * 100.0;
    }

    pub fn reading(&self) -> TankReading {
        TankReading {
            level_m3: self.level_m3,
            volume_m3: self.volume_m3,
            concentration_wt: self.concentration_wt,
        }
    }
}

/// Reactor-only quantities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactorExtra {
    /// Unreacted CaCO3 (kg), non-increasing
    pub ca_mass_kg: f64,
    /// Absolute headspace pressure (bar abs), never below atmospheric
    pub pressure_bar_abs: f64,
    /// CO2 held in the headspace (mol)
    pub co2_moles: f64,
}

/// Simulated time plus the run/pause flag and speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    pub time_s: f64,
    pub running: bool,
    pub speed_factor: f64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            time_s: 0.0,
            running: false,
            speed_factor: 1.0,
        }
    }
}

impl SimulationClock {
    /// Apply a requested speed factor, clamped to `[SPEED_MIN, SPEED_MAX]`.
    ///
    /// NaN leaves the current factor untouched. Returns the factor in effect.
    pub fn set_speed(&mut self, factor: f64) -> f64 {
        if !factor.is_nan() {
            self.speed_factor = factor.clamp(SPEED_MIN, SPEED_MAX);
        }
        self.speed_factor
    }
}

/// Complete plant state.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalState {
    /// T-01 acid buffer
    pub feed: Tank,
    /// M-01 dilution tank
    pub mix: Tank,
    /// R-01 reactor
    pub reactor: Tank,
    pub reactor_extra: ReactorExtra,
    pub clock: SimulationClock,
}

impl PhysicalState {
    /// Initial charge described by `params`, clock stopped at zero.
    pub fn initial(params: &PlantParams) -> Self {
        Self {
            feed: Tank::from_params(TankId::Feed, &params.feed),
            mix: Tank::from_params(TankId::Mix, &params.mix),
            reactor: Tank::from_params(TankId::Reactor, &params.reactor),
            reactor_extra: ReactorExtra {
                ca_mass_kg: params.initial_caco3_kg(),
                pressure_bar_abs: to_bar(atmosphere()),
                co2_moles: 0.0,
            },
            clock: SimulationClock::default(),
        }
    }

    /// Tanks in contract order T-01, M-01, R-01.
    pub fn tanks(&self) -> [&Tank; 3] {
        [&self.feed, &self.mix, &self.reactor]
    }

    pub fn tank(&self, id: TankId) -> &Tank {
        match id {
            TankId::Feed => &self.feed,
            TankId::Mix => &self.mix,
            TankId::Reactor => &self.reactor,
        }
    }

    /// Reactor gauge pressure, `max(0, p_abs - 1 bar)`.
    pub fn pressure_bar_g(&self) -> f64 {
        (self.reactor_extra.pressure_bar_abs - to_bar(atmosphere())).max(0.0)
    }

    /// Dissolved acid across all three vessels (kg).
    pub fn total_solute_kg(&self, density_kg_per_m3: f64) -> f64 {
        self.tanks()
            .iter()
            .map(|t| t.solute_kg(density_kg_per_m3))
            .sum()
    }
}

impl Default for PhysicalState {
    fn default() -> Self {
        Self::initial(&PlantParams::default())
    }
}

impl ProcessMeasurements for PhysicalState {
    fn feed_tank(&self) -> TankReading {
        self.feed.reading()
    }

    fn mix_tank(&self) -> TankReading {
        self.mix.reading()
    }
}
