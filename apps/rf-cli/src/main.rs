use clap::{Parser, Subcommand};
use rf_app::{AppResult, SchedulerStatus, SimulationService, SpeedRequest};
use rf_project::Project;
use rf_sim::{PhysicalState, SimOptions, run_sim};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "rf-cli")]
#[command(about = "ReactorFlow CLI - acid dilution and CaCO3 reactor simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a process file
    Validate {
        /// Path to the process file (.yaml, .yml or .json)
        project_path: PathBuf,
    },
    /// Run the plant offline at a fixed step and export the trajectory
    Simulate {
        /// Path to the process file (.yaml, .yml or .json)
        project_path: PathBuf,
        /// Time step in seconds
        #[arg(long, default_value_t = 1.0)]
        dt: f64,
        /// End time in seconds
        #[arg(long, default_value_t = 3600.0)]
        t_end: f64,
        /// Record every N-th step
        #[arg(long, default_value_t = 60)]
        record_every: usize,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the plant in real time and print state snapshots as JSON
    Run {
        /// Path to the process file (.yaml, .yml or .json)
        project_path: PathBuf,
        /// Speed multiplier (clamped to 0.1 - 100)
        #[arg(long)]
        speed: Option<f64>,
        /// Wall-clock duration in seconds
        #[arg(long, default_value_t = 10.0)]
        duration: f64,
        /// Snapshot period in milliseconds
        #[arg(long, default_value_t = 1000)]
        every_ms: u64,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Simulate {
            project_path,
            dt,
            t_end,
            record_every,
            output,
        } => cmd_simulate(&project_path, dt, t_end, record_every, output.as_deref()),
        Commands::Run {
            project_path,
            speed,
            duration,
            every_ms,
        } => cmd_run(&project_path, speed, duration, every_ms),
    }
}

fn load_project(project_path: &Path) -> AppResult<Project> {
    tracing::info!(path = %project_path.display(), "loading process file");
    Ok(rf_project::load(project_path)?)
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating process file: {}", project_path.display());
    let project = load_project(project_path)?;
    println!("✓ Process '{}' is valid", project.name);
    Ok(())
}

fn cmd_simulate(
    project_path: &Path,
    dt: f64,
    t_end: f64,
    record_every: usize,
    output: Option<&Path>,
) -> AppResult<()> {
    let project = load_project(project_path)?;
    let model = project.model()?;

    let mut x0 = model.engine.initial_state();
    x0.clock.running = true;
    x0.clock.set_speed(project.scheduler.speed_factor);

    let opts = SimOptions {
        dt,
        t_end,
        max_steps: SimOptions::default().max_steps,
        record_every,
    };

    eprintln!("Simulating '{}': dt = {:.3} s, t_end = {:.1} s", project.name, dt, t_end);
    let started = Instant::now();
    let record = run_sim(&model, x0, &opts)?;
    eprintln!(
        "✓ {} records in {:.3} s wall",
        record.t.len(),
        started.elapsed().as_secs_f64()
    );
    if let Some(last) = record.x.last() {
        print_final_summary(last);
    }

    let mut csv = String::from(
        "time_s,t01_level_m3,m01_level_m3,m01_concentration_wt,r01_level_m3,\
         r01_concentration_wt,r01_temperature_k,ca_mass_kg,pressure_bar_g\n",
    );
    for x in &record.x {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            x.clock.time_s,
            x.feed.level_m3,
            x.mix.level_m3,
            x.mix.concentration_wt,
            x.reactor.level_m3,
            x.reactor.concentration_wt,
            x.reactor.temperature_k,
            x.reactor_extra.ca_mass_kg,
            x.pressure_bar_g(),
        ));
    }

    // Write to file or stdout
    if let Some(path) = output {
        std::fs::write(path, csv)?;
        eprintln!("✓ Wrote {}", path.display());
    } else {
        io::stdout().write_all(csv.as_bytes())?;
    }
    Ok(())
}

fn print_final_summary(x: &PhysicalState) {
    eprintln!("\nFinal state at t = {:.1} s:", x.clock.time_s);
    for tank in x.tanks() {
        eprintln!(
            "  {}  level {:>7.3} / {:>5.1} m³  {:>6.2} wt-%  {:>6.1} K",
            tank.id.tag(),
            tank.level_m3,
            tank.volume_m3,
            tank.concentration_wt,
            tank.temperature_k
        );
    }
    eprintln!("  CaCO3 left: {:.2} kg", x.reactor_extra.ca_mass_kg);
    eprintln!("  R-01 pressure: {:.3} bar g", x.pressure_bar_g());
}

fn cmd_run(project_path: &Path, speed: Option<f64>, duration: f64, every_ms: u64) -> AppResult<()> {
    let project = load_project(project_path)?;
    let mut service = SimulationService::from_project(&project)?;

    if let Some(factor) = speed {
        let applied = service.set_speed(SpeedRequest { factor }).speed_factor;
        eprintln!("Speed factor: {}", applied);
    }
    service.start();

    let period = Duration::from_millis(every_ms.max(1));
    let run_for = Duration::try_from_secs_f64(duration.max(0.0)).unwrap_or_default();
    let deadline = Instant::now() + run_for;
    let mut stdout = io::stdout();
    loop {
        writeln!(stdout, "{}", service.state_json()?)?;
        if service.status() == SchedulerStatus::Faulted {
            if let Some(fault) = service.scheduler().fault() {
                eprintln!("✗ Simulation faulted: {}", fault);
            }
            break;
        }
        if Instant::now() >= deadline {
            break;
        }
        thread::sleep(period);
    }

    service.pause();
    writeln!(stdout, "{}", service.state_json()?)?;
    service.shutdown();
    Ok(())
}
