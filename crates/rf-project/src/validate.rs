//! Project validation logic.

use crate::schema::{Project, SchedulerDef};
use rf_controls::{ControlError, InterlockSettings};
use rf_sim::{PlantParams, SPEED_MAX, SPEED_MIN, SimError};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid plant: {0}")]
    Plant(#[from] SimError),

    #[error("Invalid interlocks: {0}")]
    Interlocks(#[from] ControlError),

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }
    if project.name.trim().is_empty() {
        return Err(invalid("name", "", "must not be empty"));
    }

    project.plant.validate()?;
    project.interlocks.validate()?;
    validate_interlocks_against_plant(&project.interlocks, &project.plant)?;
    validate_scheduler(&project.scheduler)?;
    Ok(())
}

fn validate_interlocks_against_plant(
    interlocks: &InterlockSettings,
    plant: &PlantParams,
) -> Result<(), ValidationError> {
    if interlocks.transfer_min_level_m3 >= plant.mix.volume_m3 {
        return Err(invalid(
            "interlocks.transfer_min_level_m3",
            interlocks.transfer_min_level_m3,
            "must be below the M-01 volume or P-02 can never run",
        ));
    }
    Ok(())
}

fn validate_scheduler(scheduler: &SchedulerDef) -> Result<(), ValidationError> {
    if scheduler.tick_interval_ms == 0 {
        return Err(invalid("scheduler.tick_interval_ms", 0, "must be positive"));
    }
    let max_wall = scheduler.max_wall_step_s;
    if !max_wall.is_finite() || max_wall <= 0.0 {
        return Err(invalid(
            "scheduler.max_wall_step_s",
            max_wall,
            "must be positive",
        ));
    }
    if max_wall * 1000.0 < scheduler.tick_interval_ms as f64 {
        return Err(invalid(
            "scheduler.max_wall_step_s",
            max_wall,
            "must cover at least one tick interval",
        ));
    }
    let speed = scheduler.speed_factor;
    if !(SPEED_MIN..=SPEED_MAX).contains(&speed) {
        return Err(invalid(
            "scheduler.speed_factor",
            speed,
            "must lie within the accepted speed range",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_project_is_valid() {
        validate_project(&Project::default()).unwrap();
    }

    #[test]
    fn future_version_rejected() {
        let project = Project {
            version: 99,
            ..Project::default()
        };
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::UnsupportedVersion { version: 99 })
        ));
    }

    #[test]
    fn blank_name_rejected() {
        let project = Project {
            name: "  ".to_string(),
            ..Project::default()
        };
        assert!(validate_project(&project).is_err());
    }

    #[test]
    fn initial_level_above_volume_rejected() {
        let mut project = Project::default();
        project.plant.feed.initial_level_m3 = 6.0;
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::Plant(_))
        ));
    }

    #[test]
    fn concentration_out_of_range_rejected() {
        let mut project = Project::default();
        project.plant.feed.initial_concentration_wt = 120.0;
        assert!(validate_project(&project).is_err());

        let mut project = Project::default();
        project.interlocks.transfer_max_concentration_wt = 150.0;
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::Interlocks(_))
        ));
    }

    #[test]
    fn unreachable_transfer_level_rejected() {
        let mut project = Project::default();
        project.interlocks.transfer_min_level_m3 = 10.0;
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn scheduler_pacing_checked() {
        let mut project = Project::default();
        project.scheduler.tick_interval_ms = 0;
        assert!(validate_project(&project).is_err());

        let mut project = Project::default();
        project.scheduler.max_wall_step_s = 0.05;
        assert!(validate_project(&project).is_err());

        let mut project = Project::default();
        project.scheduler.speed_factor = 500.0;
        assert!(validate_project(&project).is_err());
    }
}
