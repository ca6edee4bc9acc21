//! Integration tests: full-train scenarios driven tick by tick.
//!
//! Plant: T-01 --[P-01]--> M-01 <--[V-01] water, M-01 --[P-02]--> R-01
//!
//! Covers:
//! - P-02 interlock crossing on the pre-tick M-01 level
//! - CaCO3 exhaustion and the end of CO2 generation
//! - PSV relief onto set pressure
//! - Step-size independence of the linear filling phase
//! - Offline runner end to end

use rf_controls::InterlockSettings;
use rf_sim::chemistry::co2_moles_at_gauge;
use rf_sim::{
    BalanceEngine, PhysicalState, PlantParams, ProcessModel, SimOptions, TickOutcome, run_sim,
};

fn model() -> ProcessModel {
    ProcessModel::new(
        BalanceEngine::new(PlantParams::default()).expect("default plant is valid"),
        InterlockSettings::default(),
    )
}

fn running_start(m: &ProcessModel) -> PhysicalState {
    let mut s = m.engine.initial_state();
    s.clock.running = true;
    s
}

#[test]
fn pump2_starts_exactly_when_mix_level_exceeds_threshold() {
    let m = model();
    let mut s = running_start(&m);
    let mut first_on: Option<(f64, f64, f64)> = None;
    let mut prev_level = s.mix.level_m3;

    for _ in 0..2000 {
        let TickOutcome {
            actuation, state, ..
        } = m.tick(&s, 1.0).unwrap();

        let expected = s.mix.level_m3 > 2.0 && s.mix.concentration_wt < 60.0;
        assert_eq!(actuation.pump2_on, expected, "t = {}", s.clock.time_s);

        if actuation.pump2_on && first_on.is_none() {
            first_on = Some((prev_level, s.mix.level_m3, s.clock.time_s));
        }
        prev_level = s.mix.level_m3;
        s = state;
    }

    let (before, at, t) = first_on.expect("P-02 should start within 2000 s");
    assert!(before <= 2.0);
    assert!(at > 2.0);
    // M-01 fills at 4.5 m³/h, so the crossing happens around t = 1600 s
    assert!((t - 1600.0).abs() <= 2.0, "P-02 started at {t}");
}

#[test]
fn diluted_acid_settles_near_eleven_percent() {
    let m = model();
    let mut s = running_start(&m);
    for _ in 0..600 {
        s = m.tick(&s, 1.0).unwrap().state;
    }
    // 0.5 m³/h of 98 wt-% against 4 m³/h water
    let expected = 98.0 * 0.5 / 4.5;
    assert!((s.mix.concentration_wt - expected).abs() < 1e-9);
    assert!(s.mix.concentration_wt < 60.0);
}

#[test]
fn caco3_exhaustion_stops_co2_generation() {
    let m = model();
    let mut s = running_start(&m);
    let mut exhausted_at = None;

    for _ in 0..4000 {
        let out = m.tick(&s, 10.0).unwrap();
        assert!(out.state.reactor_extra.ca_mass_kg <= s.reactor_extra.ca_mass_kg);
        if exhausted_at.is_some() {
            assert_eq!(out.report.co2_generated_mol, 0.0);
            assert_eq!(out.report.reacted_mol, 0.0);
            assert!(out.state.reactor_extra.co2_moles <= s.reactor_extra.co2_moles);
        } else if out.state.reactor_extra.ca_mass_kg == 0.0 {
            exhausted_at = Some(out.state.clock.time_s);
        }
        s = out.state;
    }

    let t = exhausted_at.expect("CaCO3 should run out");
    // ~1110 mol/h of acid against ~4995 mol CaCO3, after the 1600 s fill
    assert!(t > 15_000.0 && t < 20_000.0, "exhausted at {t}");
    // unreacted acid now accumulates in the reactor
    assert!(s.reactor.concentration_wt > 0.0);
}

#[test]
fn psv_relieves_onto_set_pressure() {
    let m = model();
    let mut s = m.engine.initial_state();
    let headspace = m.engine.headspace_m3(&s);
    s.reactor_extra.co2_moles = co2_moles_at_gauge(6.0e5, s.reactor.temperature_k, headspace);

    let first = m.tick(&s, 0.5).unwrap();
    assert!(first.report.psv_open);
    assert!(first.report.co2_vented_mol > 0.0);
    assert!(first.state.pressure_bar_g() < 6.0);

    let mut prev = first.state.pressure_bar_g();
    s = first.state;
    for _ in 0..400 {
        s = m.tick(&s, 0.5).unwrap().state;
        let p = s.pressure_bar_g();
        assert!(p <= prev + 1e-12);
        assert!(p >= 3.0 - 1e-9);
        prev = p;
    }
    assert!((s.pressure_bar_g() - 3.0).abs() < 1e-3);
}

#[test]
fn filling_phase_is_step_size_independent() {
    let m = model();

    let mut fine = running_start(&m);
    for _ in 0..1000 {
        fine = m.tick(&fine, 0.1).unwrap().state;
    }

    let mut coarse = running_start(&m);
    for _ in 0..100 {
        coarse = m.tick(&coarse, 1.0).unwrap().state;
    }

    assert!((fine.clock.time_s - coarse.clock.time_s).abs() < 1e-9);
    assert!((fine.feed.level_m3 - coarse.feed.level_m3).abs() < 1e-9);
    assert!((fine.mix.level_m3 - coarse.mix.level_m3).abs() < 1e-9);
    assert!((fine.mix.concentration_wt - coarse.mix.concentration_wt).abs() < 1e-9);
}

#[test]
fn offline_run_reaches_end_time() {
    let m = model();
    let opts = SimOptions {
        dt: 1.0,
        t_end: 3600.0,
        max_steps: 10_000,
        record_every: 600,
    };
    let record = run_sim(&m, running_start(&m), &opts).unwrap();

    assert_eq!(record.t.len(), 7);
    let last = record.x.last().unwrap();
    assert!((last.clock.time_s - 3600.0).abs() < 1e-6);
    assert!(last.reactor.level_m3 > 5.0);
    assert!(last.reactor_extra.ca_mass_kg < 500.0);
}

#[test]
fn stopped_plant_stays_put_offline() {
    let m = model();
    let x0 = m.engine.initial_state();
    let record = run_sim(&m, x0.clone(), &SimOptions::default()).unwrap();
    let last = record.x.last().unwrap();
    assert_eq!(last.feed, x0.feed);
    assert_eq!(last.mix, x0.mix);
    assert_eq!(last.reactor, x0.reactor);
    assert_eq!(last.reactor_extra, x0.reactor_extra);
}
