//! Fixed-step offline runner and result recording.

use crate::error::{SimError, SimResult};
use crate::model::TickModel;

/// Options for offline runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1.0,
            t_end: 3600.0,
            max_steps: 1_000_000,
            record_every: 60,
        }
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds, relative to the start of the run)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

/// Run `model` from `x0` at a fixed step until `t_end`.
///
/// The last step is shortened so the run ends exactly at `t_end`.
pub fn run_sim<M: TickModel>(
    model: &M,
    x0: M::State,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    if !opts.dt.is_finite() || opts.dt <= 0.0 {
        return Err(SimError::InvalidArg {
            what: "dt must be positive",
        });
    }
    if !opts.t_end.is_finite() || opts.t_end < 0.0 {
        return Err(SimError::InvalidArg {
            what: "t_end must be non-negative",
        });
    }
    if opts.max_steps == 0 {
        return Err(SimError::InvalidArg {
            what: "max_steps must be positive",
        });
    }
    if opts.record_every == 0 {
        return Err(SimError::InvalidArg {
            what: "record_every must be positive",
        });
    }

    let mut t = 0.0;
    let mut x = x0;

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    let mut step = 0;
    while t < opts.t_end && step < opts.max_steps {
        let dt = opts.dt.min(opts.t_end - t);
        x = model.advance(&x, dt)?;
        t += dt;
        step += 1;

        // Record if decimation matches
        if step % opts.record_every == 0 {
            t_record.push(t);
            x_record.push(x.clone());
        }
    }

    // Always record final state
    if step % opts.record_every != 0 {
        t_record.push(t);
        x_record.push(x);
    }

    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}
