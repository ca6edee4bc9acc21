//! The process files shipped under `projects/` load and validate.

use rf_project::{LATEST_VERSION, load};
use std::path::PathBuf;

fn projects_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../projects")
}

#[test]
fn default_project_matches_reference_plant() {
    let project = load(&projects_dir().join("default.yaml")).expect("default.yaml should load");
    assert_eq!(project.version, LATEST_VERSION);
    assert_eq!(project.plant, rf_sim::PlantParams::default());
    assert_eq!(project.interlocks, rf_controls::InterlockSettings::default());

    let engine = project.engine().unwrap();
    let s0 = engine.initial_state();
    assert!((s0.reactor_extra.ca_mass_kg - 500.0).abs() < 1e-9);
}

#[test]
fn fast_relief_project_migrates_and_builds() {
    let project =
        load(&projects_dir().join("fast_relief.json")).expect("fast_relief.json should load");
    assert_eq!(project.version, LATEST_VERSION);
    assert_eq!(project.plant.reactor.volume_m3, 6.0);
    assert_eq!(project.plant.relief.set_pressure_bar_g, 1.5);
    // unspecified sections keep their defaults
    assert_eq!(project.plant.feed.volume_m3, 5.0);
    assert_eq!(project.scheduler.tick_interval_ms, 100);

    let model = project.model().unwrap();
    assert_eq!(model.interlocks.transfer_min_level_m3, 1.0);
}
