//! Stoichiometry, reaction heat and headspace gas law.
//!
//! CaCO3 + H2SO4 -> CaSO4 + CO2 + H2O, 1:1:1 on a molar basis. The reaction is
//! treated as instantaneous: whatever acid arrives in the reactor during a tick
//! reacts at once until either the acid batch or the CaCO3 is used up.

use crate::params::ChemistryParams;
use rf_core::units::constants::{P_ATM_PA, R_GAS_J_PER_MOL_K};
use rf_core::units::{pa, to_bar};

/// Result of reacting one acid batch against the CaCO3 inventory.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reaction {
    /// Moles of CaCO3 (= moles of H2SO4) reacted
    pub reacted_mol: f64,
    /// CaCO3 left afterwards (kg), exactly zero when CaCO3 was limiting
    pub caco3_remaining_kg: f64,
    /// H2SO4 consumed (kg)
    pub acid_consumed_kg: f64,
    /// CO2 released to the headspace (mol)
    pub co2_generated_mol: f64,
    /// Reaction heat released into the liquid (J)
    pub heat_released_j: f64,
}

/// React `acid_kg` of fresh H2SO4 with `caco3_kg` of CaCO3.
pub fn react_batch(acid_kg: f64, caco3_kg: f64, chem: &ChemistryParams) -> Reaction {
    let acid_kg = acid_kg.max(0.0);
    let caco3_kg = caco3_kg.max(0.0);

    let acid_mol = acid_kg / chem.molar_mass_h2so4_kg_per_mol;
    let caco3_mol = caco3_kg / chem.molar_mass_caco3_kg_per_mol;

    if acid_mol <= 0.0 || caco3_mol <= 0.0 {
        return Reaction {
            caco3_remaining_kg: caco3_kg,
            ..Reaction::default()
        };
    }

    let (reacted_mol, caco3_remaining_kg) = if caco3_mol <= acid_mol {
        (caco3_mol, 0.0)
    } else {
        (
            acid_mol,
            (caco3_kg - acid_mol * chem.molar_mass_caco3_kg_per_mol).max(0.0),
        )
    };

    Reaction {
        reacted_mol,
        caco3_remaining_kg,
        acid_consumed_kg: (reacted_mol * chem.molar_mass_h2so4_kg_per_mol).min(acid_kg),
        co2_generated_mol: reacted_mol,
        heat_released_j: reacted_mol * chem.reaction_heat_j_per_mol,
    }
}

/// Adiabatic temperature rise `dT = Q / (m * c_p)`.
///
/// Zero liquid mass absorbs nothing and yields zero rise.
pub fn adiabatic_temperature_rise(heat_j: f64, liquid_mass_kg: f64, cp_j_per_kg_k: f64) -> f64 {
    if liquid_mass_kg <= 0.0 {
        return 0.0;
    }
    heat_j / (liquid_mass_kg * cp_j_per_kg_k)
}

/// Absolute headspace pressure (bar abs).
///
/// The headspace starts out as air at atmospheric pressure; CO2 adds its
/// ideal-gas partial pressure `p = n R T / V` on top.
pub fn headspace_pressure_bar_abs(co2_mol: f64, temperature_k: f64, headspace_m3: f64) -> f64 {
    let partial_pa = co2_mol.max(0.0) * R_GAS_J_PER_MOL_K * temperature_k / headspace_m3;
    to_bar(pa(P_ATM_PA + partial_pa))
}

/// CO2 inventory (mol) that produces `gauge_pa` in the given headspace.
pub fn co2_moles_at_gauge(gauge_pa: f64, temperature_k: f64, headspace_m3: f64) -> f64 {
    gauge_pa * headspace_m3 / (R_GAS_J_PER_MOL_K * temperature_k)
}
