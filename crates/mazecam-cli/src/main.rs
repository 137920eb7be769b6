//! mazecam CLI — plan and drive stereo capture sweeps over a maze model.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mazecam_core::barrier::{AssemblyVersions, BarrierMap};
use mazecam_core::config::{EyeParams, RunConfig};
use mazecam_core::maze::{GridCoord, MazeLayout};
use mazecam_core::renderer::DryRunRenderer;
use mazecam_core::stereo::place_stereo;
use mazecam_core::sweep::{run_sweep, SweepOptions};
use mazecam_core::MazePose;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "mazecam")]
#[command(
    about = "Stereo camera placement and image-dataset sweeps for a rendered maze model"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print both eye views for one grid pose.
    Pose(CliPoseArgs),

    /// Enumerate a run's capture plan and write it as JSON.
    Plan(CliPlanArgs),

    /// Run a sweep against the recording backend.
    Sweep(CliSweepArgs),

    /// Print the surveyed maze layout constants.
    LayoutInfo,

    /// Resolve a barrier's assembly path and emit its move.
    Barrier(CliBarrierArgs),
}

#[derive(Debug, Clone, Args)]
struct CliPoseArgs {
    /// Grid X coordinate (0-12).
    #[arg(long)]
    gx: u8,

    /// Grid Y coordinate (0-12).
    #[arg(long)]
    gy: u8,

    /// Heading in degrees (0 = East, counterclockwise).
    #[arg(long, default_value = "0.0")]
    heading: f64,

    /// Run configuration (JSON); defaults to production eye parameters.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliPlanArgs {
    /// Run configuration (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Path to write the enumerated capture plan (JSON).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct CliSweepArgs {
    /// Run configuration (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Skip captures whose output file already exists on disk.
    #[arg(long)]
    skip_existing: bool,

    /// Lower/raise each maze configuration's barriers around its captures.
    #[arg(long)]
    apply_barriers: bool,

    /// Path to write the sweep report (JSON).
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliBarrierArgs {
    /// Grid X coordinate of the barrier.
    #[arg(long)]
    gx: u8,

    /// Grid Y coordinate of the barrier.
    #[arg(long)]
    gy: u8,

    /// Vertical move in inches (negative = lower).
    #[arg(long, allow_hyphen_values = true)]
    delta_in: f64,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pose(args) => run_pose(&args),
        Commands::Plan(args) => run_plan(&args),
        Commands::Sweep(args) => run_sweep_cmd(&args),
        Commands::LayoutInfo => run_layout_info(),
        Commands::Barrier(args) => run_barrier(&args),
    }
}

// ── pose ───────────────────────────────────────────────────────────────────

fn run_pose(args: &CliPoseArgs) -> CliResult<()> {
    let maze = MazeLayout::default();
    let grid = GridCoord::new(args.gx, args.gy)?;

    let eye_params = match &args.config {
        Some(path) => RunConfig::from_path(path)?.eye,
        None => EyeParams::default(),
    };
    let eye_config = eye_params.to_eye_config(&maze);

    let point_in = maze.model_point_in(grid);
    let point_cm = maze.model_point_cm(grid);
    let pose = MazePose::new(point_cm[0], point_cm[1], args.heading);
    let pair = place_stereo(&pose, &eye_config)?;

    println!("grid position ({}, {})", args.gx, args.gy);
    println!(
        "  model:    ({:.3}, {:.3}) in = ({:.3}, {:.3}) cm",
        point_in[0], point_in[1], point_cm[0], point_cm[1]
    );
    println!("  heading:  {}°", args.heading);
    for view in [&pair.left, &pair.right] {
        println!("{:?} eye:", view.eye);
        println!(
            "  position: ({:.3}, {:.3}, {:.3}) cm",
            view.position.x, view.position.y, view.position.z
        );
        println!(
            "  target:   ({:.3}, {:.3}, {:.3}) cm",
            view.aim_target.x, view.aim_target.y, view.aim_target.z
        );
        println!("  fov:      {}°", view.fov_vertical_deg);
    }

    Ok(())
}

// ── plan ───────────────────────────────────────────────────────────────────

fn run_plan(args: &CliPlanArgs) -> CliResult<()> {
    let maze = MazeLayout::default();
    let config = RunConfig::from_path(&args.config)?;
    let plan = config.plan(&maze)?;
    let captures = plan.captures(&maze);

    tracing::info!(
        tuples = captures.len(),
        out = %args.out.display(),
        "writing capture plan"
    );
    let json = serde_json::to_string_pretty(&captures)?;
    std::fs::write(&args.out, json)?;
    println!("{} capture tuples -> {}", captures.len(), args.out.display());

    Ok(())
}

// ── sweep ──────────────────────────────────────────────────────────────────

fn run_sweep_cmd(args: &CliSweepArgs) -> CliResult<()> {
    let maze = MazeLayout::default();
    let config = RunConfig::from_path(&args.config)?;
    let plan = config.plan(&maze)?;

    // The recording backend stands in for the CAD host; a live bridge
    // implements mazecam_core::Renderer and slots in here.
    let mut renderer = DryRunRenderer::new();
    renderer.check_filesystem = args.skip_existing;

    let opts = SweepOptions {
        skip_existing: args.skip_existing,
        apply_barriers: args.apply_barriers,
    };
    let report = run_sweep(
        &plan,
        &maze,
        &BarrierMap::standard(),
        &AssemblyVersions::default(),
        &mut renderer,
        &opts,
    )?;

    println!("sweep finished");
    println!("  captured: {}", report.captured);
    println!("  skipped:  {}", report.skipped);
    println!("  failed:   {}", report.failures.len());
    for failure in &report.failures {
        tracing::warn!(
            file = %failure.file_name,
            tag = failure.config_tag,
            error = %failure.error,
            "capture failed"
        );
    }

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("report -> {}", path.display());
    }

    Ok(())
}

// ── layout-info ────────────────────────────────────────────────────────────

fn run_layout_info() -> CliResult<()> {
    let maze = MazeLayout::default();

    println!("mazecam surveyed maze layout");
    println!("  grid range:     0..=12 on both axes");
    println!("  floor height:   {} in = {:.3} cm", maze.floor_z_in(), maze.floor_z_cm());
    let bounds = maze.traversable_bounds();
    println!(
        "  bounds (cm):    x [{:.3}, {:.3}], y [{:.3}, {:.3}]",
        bounds.min_x_cm, bounds.max_x_cm, bounds.min_y_cm, bounds.max_y_cm
    );
    println!("  reference points (grid -> inches):");
    for ((gx, gy), (x, y)) in maze.reference_points() {
        println!("    ({:>2}, {:>2}) -> ({:>8.3}, {:>8.3})", gx, gy, x, y);
    }

    Ok(())
}

// ── barrier ────────────────────────────────────────────────────────────────

fn run_barrier(args: &CliBarrierArgs) -> CliResult<()> {
    let grid = GridCoord::new(args.gx, args.gy)?;
    let map = BarrierMap::standard();
    let versions = AssemblyVersions::default();

    let barrier = map
        .lookup(grid)
        .ok_or_else(|| -> CliError { format!("no barrier at grid position {}", grid).into() })?;
    println!("barrier at {}: {:?}", grid, barrier.kind);
    println!("  occurrence: {}", versions.occurrence_path(barrier));
    println!("  move:       {} in", args.delta_in);

    let mut renderer = DryRunRenderer::new();
    map.apply(&mut renderer, &versions, grid, args.delta_in)?;

    Ok(())
}
