// rf-core/src/units.rs

use uom::si::f64::{Pressure as UomPressure, VolumeRate as UomVolumeRate};

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

/// Volumetric flow given in m³/h, the unit pump and valve duties are quoted in.
#[inline]
pub fn m3_per_h(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_hour;
    VolumeRate::new::<cubic_meter_per_hour>(v)
}

#[inline]
pub fn to_bar(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

#[inline]
pub fn to_m3_per_s(q: VolumeRate) -> f64 {
    use uom::si::volume_rate::cubic_meter_per_second;
    q.get::<cubic_meter_per_second>()
}

pub mod constants {
    use super::*;

    /// Universal gas constant, J/(mol·K).
    pub const R_GAS_J_PER_MOL_K: f64 = 8.314;

    /// Local atmosphere. Gauge pressures are quoted against exactly 1 bar.
    pub const P_ATM_PA: f64 = 1.0e5;

    #[inline]
    pub fn atmosphere() -> Pressure {
        pa(P_ATM_PA)
    }
}
