//! Interlock rules for the process train.
//!
//! Every output is derived independently from the *pre-tick* readings; there is
//! no ordering dependency between rules and no memory between calls, so the
//! function may be evaluated any number of times per tick (UI mirroring,
//! diagnostics) without side effects.

use crate::error::{ControlError, ControlResult};
use crate::measured::ProcessMeasurements;
use rf_core::numeric::{ensure_non_negative, ensure_within};
use serde::{Deserialize, Serialize};

/// Thresholds gating the dilute-acid transfer P-02.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterlockSettings {
    /// P-02 may only run once M-01 holds more than this volume (m³).
    pub transfer_min_level_m3: f64,
    /// P-02 may only run while M-01 is weaker than this (wt-%).
    pub transfer_max_concentration_wt: f64,
}

impl Default for InterlockSettings {
    fn default() -> Self {
        Self {
            transfer_min_level_m3: 2.0,
            transfer_max_concentration_wt: 60.0,
        }
    }
}

impl InterlockSettings {
    /// Create interlock settings.
    ///
    /// # Errors
    ///
    /// Returns error if the level is negative or the concentration lies
    /// outside `[0, 100]`.
    pub fn new(
        transfer_min_level_m3: f64,
        transfer_max_concentration_wt: f64,
    ) -> ControlResult<Self> {
        let settings = Self {
            transfer_min_level_m3,
            transfer_max_concentration_wt,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> ControlResult<()> {
        ensure_non_negative(self.transfer_min_level_m3, "transfer_min_level_m3")?;
        ensure_within(
            self.transfer_max_concentration_wt,
            0.0,
            100.0,
            "transfer_max_concentration_wt",
        )?;
        if self.transfer_max_concentration_wt == 0.0 {
            return Err(ControlError::InvalidArg {
                what: "transfer_max_concentration_wt of 0 would never allow transfer",
            });
        }
        Ok(())
    }
}

/// Equipment energisation for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Actuation {
    /// P-01, acid T-01 -> M-01.
    pub pump1_on: bool,
    /// P-02, dilute acid M-01 -> R-01.
    pub pump2_on: bool,
    /// V-01, dilution water into M-01.
    pub valve_on: bool,
    /// A-01, M-01 agitator.
    pub agitator_on: bool,
}

impl Actuation {
    /// Everything de-energised.
    pub const IDLE: Self = Self {
        pump1_on: false,
        pump2_on: false,
        valve_on: false,
        agitator_on: false,
    };

    pub fn any_on(&self) -> bool {
        self.pump1_on || self.pump2_on || self.valve_on || self.agitator_on
    }
}

/// Compute equipment actuation from plant readings.
///
/// - `pump1_on`: running, T-01 not empty, M-01 not full
/// - `valve_on`: running, M-01 not full
/// - `pump2_on`: running, M-01 above the minimum level and below the maximum
///   concentration (both strict)
/// - `agitator_on`: running, M-01 not empty
pub fn actuate<P: ProcessMeasurements + ?Sized>(
    plant: &P,
    running: bool,
    settings: &InterlockSettings,
) -> Actuation {
    if !running {
        return Actuation::IDLE;
    }

    let feed = plant.feed_tank();
    let mix = plant.mix_tank();

    Actuation {
        pump1_on: !feed.is_empty() && !mix.is_full(),
        valve_on: !mix.is_full(),
        pump2_on: mix.level_m3 > settings.transfer_min_level_m3
            && mix.concentration_wt < settings.transfer_max_concentration_wt,
        agitator_on: !mix.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measured::TankReading;

    struct Readings {
        feed: TankReading,
        mix: TankReading,
    }

    impl ProcessMeasurements for Readings {
        fn feed_tank(&self) -> TankReading {
            self.feed
        }

        fn mix_tank(&self) -> TankReading {
            self.mix
        }
    }

    fn tank(level_m3: f64, volume_m3: f64, concentration_wt: f64) -> TankReading {
        TankReading {
            level_m3,
            volume_m3,
            concentration_wt,
        }
    }

    fn plant(feed_level: f64, mix_level: f64, mix_conc: f64) -> Readings {
        Readings {
            feed: tank(feed_level, 5.0, 98.0),
            mix: tank(mix_level, 10.0, mix_conc),
        }
    }

    #[test]
    fn stopped_plant_is_idle() {
        let a = actuate(&plant(5.0, 5.0, 10.0), false, &InterlockSettings::default());
        assert_eq!(a, Actuation::IDLE);
        assert!(!a.any_on());
    }

    #[test]
    fn fresh_start_feeds_and_doses_but_does_not_transfer() {
        let a = actuate(&plant(5.0, 0.0, 0.0), true, &InterlockSettings::default());
        assert!(a.pump1_on);
        assert!(a.valve_on);
        assert!(!a.pump2_on);
        assert!(!a.agitator_on);
    }

    #[test]
    fn full_mix_tank_stops_feed_and_water() {
        let a = actuate(&plant(3.0, 10.0, 20.0), true, &InterlockSettings::default());
        assert!(!a.pump1_on);
        assert!(!a.valve_on);
        assert!(a.pump2_on);
        assert!(a.agitator_on);
    }

    #[test]
    fn empty_feed_stops_pump1_only() {
        let a = actuate(&plant(0.0, 4.0, 20.0), true, &InterlockSettings::default());
        assert!(!a.pump1_on);
        assert!(a.valve_on);
    }

    #[test]
    fn transfer_thresholds_are_strict() {
        let settings = InterlockSettings::default();
        assert!(!actuate(&plant(5.0, 2.0, 10.0), true, &settings).pump2_on);
        assert!(actuate(&plant(5.0, 2.0001, 10.0), true, &settings).pump2_on);
        assert!(!actuate(&plant(5.0, 5.0, 60.0), true, &settings).pump2_on);
        assert!(actuate(&plant(5.0, 5.0, 59.99), true, &settings).pump2_on);
    }

    #[test]
    fn invalid_settings_rejected() {
        assert!(InterlockSettings::new(-1.0, 60.0).is_err());
        assert!(InterlockSettings::new(2.0, 120.0).is_err());
        assert!(InterlockSettings::new(2.0, 0.0).is_err());
        assert!(InterlockSettings::new(2.0, f64::NAN).is_err());
        assert!(InterlockSettings::new(2.0, 60.0).is_ok());
    }

    proptest::proptest! {
        #[test]
        fn nothing_runs_without_liquid_paths(
            feed in 0.0f64..5.0,
            mix in 0.0f64..10.0,
            conc in 0.0f64..100.0,
        ) {
            let a = actuate(&plant(feed, mix, conc), true, &InterlockSettings::default());
            if a.pump1_on {
                proptest::prop_assert!(feed > 0.0 && mix < 10.0);
            }
            if a.pump2_on {
                proptest::prop_assert!(mix > 2.0 && conc < 60.0);
            }
            proptest::prop_assert_eq!(a.valve_on, mix < 10.0);
            proptest::prop_assert_eq!(a.agitator_on, mix > 0.0);
        }
    }
}
