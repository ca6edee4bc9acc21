//! Real-time scheduler.
//!
//! [`SimulationCore`] holds the command semantics and the tick rule; it never
//! touches a clock, so callers feed it wall time explicitly. [`Scheduler`]
//! wraps one core in a mutex and drives it from a background thread.
//!
//! Every tick and every command runs as one critical section on the same
//! lock, so a snapshot never shows a half-applied tick.

use crate::error::{AppError, AppResult};
use rf_controls::Actuation;
use rf_project::SchedulerDef;
use rf_sim::{PhysicalState, ProcessModel, SimError, StepReport};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Pacing of the background loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerOptions {
    /// Wall time between ticks
    pub tick_interval: Duration,
    /// Most wall time credited to a single tick
    pub max_wall_step: Duration,
    /// Speed multiplier in effect at spawn and after reset
    pub speed_factor: f64,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            max_wall_step: Duration::from_secs(1),
            speed_factor: 1.0,
        }
    }
}

impl From<&SchedulerDef> for SchedulerOptions {
    fn from(def: &SchedulerDef) -> Self {
        Self {
            tick_interval: Duration::from_millis(def.tick_interval_ms),
            max_wall_step: Duration::try_from_secs_f64(def.max_wall_step_s)
                .unwrap_or(Duration::from_secs(1)),
            speed_factor: def.speed_factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerStatus {
    Stopped,
    Running,
    Paused,
    /// An invariant check failed; only reset leaves this state
    Faulted,
}

/// Equipment lamps: live interlock output plus the PSV state of the last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EquipmentStatus {
    #[serde(flatten)]
    pub actuation: Actuation,
    pub psv_open: bool,
}

/// Scheduler state machine without a thread.
#[derive(Debug, Clone)]
pub struct SimulationCore {
    model: ProcessModel,
    initial: PhysicalState,
    state: PhysicalState,
    status: SchedulerStatus,
    max_wall_step: Duration,
    last_report: StepReport,
    fault: Option<SimError>,
}

impl SimulationCore {
    /// Core in `Stopped`, holding `initial` with the configured speed applied.
    pub fn new(model: ProcessModel, initial: PhysicalState, options: &SchedulerOptions) -> Self {
        let mut initial = initial;
        initial.clock.running = false;
        initial.clock.set_speed(options.speed_factor);
        Self {
            model,
            state: initial.clone(),
            initial,
            status: SchedulerStatus::Stopped,
            max_wall_step: options.max_wall_step,
            last_report: StepReport::default(),
            fault: None,
        }
    }

    pub fn status(&self) -> SchedulerStatus {
        self.status
    }

    /// Published state.
    pub fn snapshot(&self) -> PhysicalState {
        self.state.clone()
    }

    /// Defect that faulted the core, if any.
    pub fn fault(&self) -> Option<&SimError> {
        self.fault.as_ref()
    }

    pub fn equipment(&self) -> EquipmentStatus {
        EquipmentStatus {
            actuation: self.model.actuation(&self.state),
            psv_open: self.last_report.psv_open,
        }
    }

    /// Stopped or Paused -> Running. No-op when already running or faulted.
    pub fn start(&mut self) -> SchedulerStatus {
        match self.status {
            SchedulerStatus::Stopped | SchedulerStatus::Paused => {
                self.status = SchedulerStatus::Running;
                self.state.clock.running = true;
                tracing::info!(time_s = self.state.clock.time_s, "simulation started");
            }
            SchedulerStatus::Running => {}
            SchedulerStatus::Faulted => {
                tracing::warn!("start ignored: simulation faulted, reset required");
            }
        }
        self.status
    }

    /// Running -> Paused. No-op otherwise.
    pub fn pause(&mut self) -> SchedulerStatus {
        if self.status == SchedulerStatus::Running {
            self.status = SchedulerStatus::Paused;
            self.state.clock.running = false;
            tracing::info!(time_s = self.state.clock.time_s, "simulation paused");
        }
        self.status
    }

    /// Any -> Stopped with the initial charge restored.
    pub fn reset(&mut self) -> SchedulerStatus {
        self.state = self.initial.clone();
        self.status = SchedulerStatus::Stopped;
        self.last_report = StepReport::default();
        self.fault = None;
        tracing::info!("simulation reset");
        self.status
    }

    /// Apply a speed multiplier from the next tick on; returns the factor in
    /// effect after clamping.
    pub fn set_speed(&mut self, factor: f64) -> f64 {
        let applied = self.state.clock.set_speed(factor);
        if factor.is_nan() {
            tracing::warn!(applied, "speed factor NaN ignored");
        } else if applied != factor {
            tracing::warn!(requested = factor, applied, "speed factor clamped");
        } else {
            tracing::info!(applied, "speed factor changed");
        }
        applied
    }

    /// Credit `wall_elapsed` to the simulation.
    ///
    /// Does nothing unless running. Wall time is capped at `max_wall_step`
    /// and scaled by the speed factor. Returns whether a tick was taken.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Faulted` when the step breaks an invariant. The
    /// last good state stays published and the core moves to `Faulted`.
    pub fn advance(&mut self, wall_elapsed: Duration) -> AppResult<bool> {
        if self.status != SchedulerStatus::Running {
            return Ok(false);
        }

        let wall_s = wall_elapsed.min(self.max_wall_step).as_secs_f64();
        let dt_sim = wall_s * self.state.clock.speed_factor;

        match self.model.tick(&self.state, dt_sim) {
            Ok(outcome) => {
                self.state = outcome.state;
                self.last_report = outcome.report;
                tracing::debug!(
                    time_s = self.state.clock.time_s,
                    dt_sim,
                    pressure_bar_g = self.state.pressure_bar_g(),
                    "tick"
                );
                Ok(true)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    time_s = self.state.clock.time_s,
                    "simulation faulted"
                );
                self.status = SchedulerStatus::Faulted;
                self.state.clock.running = false;
                let message = err.to_string();
                self.fault = Some(err);
                Err(AppError::Faulted(message))
            }
        }
    }
}

struct Inner {
    core: SimulationCore,
    shutdown: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background thread advancing a [`SimulationCore`] in real time.
pub struct Scheduler {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawn the timing thread. The simulation starts `Stopped`.
    pub fn spawn(
        model: ProcessModel,
        initial: PhysicalState,
        options: SchedulerOptions,
    ) -> AppResult<Self> {
        if options.tick_interval.is_zero() {
            return Err(AppError::InvalidInput(
                "tick interval must be positive".to_string(),
            ));
        }

        let shared = Arc::new(Shared {
            inner: Mutex::new(Inner {
                core: SimulationCore::new(model, initial, &options),
                shutdown: false,
            }),
            wake: Condvar::new(),
        });

        let loop_shared = Arc::clone(&shared);
        let tick_interval = options.tick_interval;
        let handle = thread::Builder::new()
            .name("rf-scheduler".to_string())
            .spawn(move || run_loop(&loop_shared, tick_interval))?;

        tracing::info!(
            tick_interval_ms = tick_interval.as_millis() as u64,
            "scheduler spawned"
        );

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    pub fn start(&self) -> SchedulerStatus {
        self.shared.lock().core.start()
    }

    pub fn pause(&self) -> SchedulerStatus {
        self.shared.lock().core.pause()
    }

    pub fn reset(&self) -> SchedulerStatus {
        self.shared.lock().core.reset()
    }

    pub fn set_speed(&self, factor: f64) -> f64 {
        self.shared.lock().core.set_speed(factor)
    }

    pub fn snapshot(&self) -> PhysicalState {
        self.shared.lock().core.snapshot()
    }

    pub fn equipment(&self) -> EquipmentStatus {
        self.shared.lock().core.equipment()
    }

    pub fn status(&self) -> SchedulerStatus {
        self.shared.lock().core.status()
    }

    /// Fault message, if the simulation is faulted.
    pub fn fault(&self) -> Option<String> {
        self.shared.lock().core.fault().map(ToString::to_string)
    }

    /// Stop the timing thread and wait for it. Idempotent.
    pub fn shutdown(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.wake.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("scheduler thread panicked");
            } else {
                tracing::info!("scheduler stopped");
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(shared: &Shared, tick_interval: Duration) {
    let mut last = Instant::now();
    let mut guard = shared.lock();
    loop {
        if guard.shutdown {
            break;
        }
        guard = match shared.wake.wait_timeout(guard, tick_interval) {
            Ok((g, _)) => g,
            Err(poisoned) => poisoned.into_inner().0,
        };
        if guard.shutdown {
            break;
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last);
        last = now;
        // Faults are logged and latched by the core.
        let _ = guard.core.advance(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_controls::InterlockSettings;
    use rf_sim::{BalanceEngine, PlantParams};

    fn core() -> SimulationCore {
        let engine = BalanceEngine::new(PlantParams::default()).unwrap();
        let initial = engine.initial_state();
        let model = ProcessModel::new(engine, InterlockSettings::default());
        SimulationCore::new(model, initial, &SchedulerOptions::default())
    }

    #[test]
    fn transitions() {
        let mut c = core();
        assert_eq!(c.status(), SchedulerStatus::Stopped);
        assert_eq!(c.pause(), SchedulerStatus::Stopped);
        assert_eq!(c.start(), SchedulerStatus::Running);
        assert!(c.snapshot().clock.running);
        assert_eq!(c.start(), SchedulerStatus::Running);
        assert_eq!(c.pause(), SchedulerStatus::Paused);
        assert!(!c.snapshot().clock.running);
        assert_eq!(c.start(), SchedulerStatus::Running);
        assert_eq!(c.reset(), SchedulerStatus::Stopped);
    }

    #[test]
    fn advance_only_while_running() {
        let mut c = core();
        assert!(!c.advance(Duration::from_millis(100)).unwrap());
        assert_eq!(c.snapshot().clock.time_s, 0.0);

        c.start();
        assert!(c.advance(Duration::from_millis(100)).unwrap());
        assert!((c.snapshot().clock.time_s - 0.1).abs() < 1e-12);

        c.pause();
        assert!(!c.advance(Duration::from_millis(100)).unwrap());
        assert!((c.snapshot().clock.time_s - 0.1).abs() < 1e-12);
    }

    #[test]
    fn wall_step_is_capped() {
        let mut c = core();
        c.start();
        c.advance(Duration::from_secs(30)).unwrap();
        assert!((c.snapshot().clock.time_s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn speed_scales_simulated_time() {
        let mut c = core();
        assert_eq!(c.set_speed(10.0), 10.0);
        c.start();
        c.advance(Duration::from_millis(100)).unwrap();
        assert!((c.snapshot().clock.time_s - 1.0).abs() < 1e-12);
    }

    #[test]
    fn speed_input_is_clamped_not_rejected() {
        let mut c = core();
        assert_eq!(c.set_speed(1e6), 100.0);
        assert_eq!(c.set_speed(-3.0), 0.1);
        assert_eq!(c.set_speed(f64::NAN), 0.1);
    }

    #[test]
    fn reset_restores_initial_and_is_idempotent() {
        let mut c = core();
        let s0 = c.snapshot();
        c.set_speed(50.0);
        c.start();
        for _ in 0..20 {
            c.advance(Duration::from_millis(500)).unwrap();
        }
        assert_ne!(c.snapshot(), s0);

        c.reset();
        let once = c.snapshot();
        c.reset();
        assert_eq!(c.snapshot(), once);
        assert_eq!(once, s0);
        assert_eq!(once.clock.speed_factor, 1.0);
        assert_eq!(c.equipment(), EquipmentStatus::default());
    }

    #[test]
    fn configured_speed_survives_reset() {
        let engine = BalanceEngine::new(PlantParams::default()).unwrap();
        let initial = engine.initial_state();
        let model = ProcessModel::new(engine, InterlockSettings::default());
        let options = SchedulerOptions {
            speed_factor: 5.0,
            ..SchedulerOptions::default()
        };
        let mut c = SimulationCore::new(model, initial, &options);
        c.set_speed(20.0);
        c.reset();
        assert_eq!(c.snapshot().clock.speed_factor, 5.0);
    }

    #[test]
    fn invariant_violation_faults_and_keeps_last_good_state() {
        let mut c = core();
        c.start();
        c.advance(Duration::from_millis(100)).unwrap();
        let good = c.snapshot();

        // corrupt the published state behind the engine's back
        c.state.reactor_extra.ca_mass_kg = -1.0;
        let before = c.snapshot();
        let err = c.advance(Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, AppError::Faulted(_)));
        assert_eq!(c.status(), SchedulerStatus::Faulted);
        assert!(c.fault().is_some());
        assert_eq!(c.snapshot().clock.time_s, good.clock.time_s);
        assert_eq!(c.snapshot().reactor_extra, before.reactor_extra);

        // further ticks and start are refused
        assert!(!c.advance(Duration::from_millis(100)).unwrap());
        assert_eq!(c.start(), SchedulerStatus::Faulted);

        assert_eq!(c.reset(), SchedulerStatus::Stopped);
        assert!(c.fault().is_none());
        assert_eq!(c.start(), SchedulerStatus::Running);
    }

    #[test]
    fn equipment_follows_interlocks() {
        let mut c = core();
        assert_eq!(c.equipment().actuation, Actuation::IDLE);
        c.start();
        let eq = c.equipment();
        assert!(eq.actuation.pump1_on);
        assert!(eq.actuation.valve_on);
        assert!(!eq.actuation.pump2_on);
        assert!(!eq.psv_open);
    }

    #[test]
    fn options_from_project_section() {
        let def = SchedulerDef {
            tick_interval_ms: 250,
            max_wall_step_s: 2.5,
            speed_factor: 3.0,
        };
        let opts = SchedulerOptions::from(&def);
        assert_eq!(opts.tick_interval, Duration::from_millis(250));
        assert_eq!(opts.max_wall_step, Duration::from_millis(2500));
        assert_eq!(opts.speed_factor, 3.0);
    }
}
