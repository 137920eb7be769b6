//! Grid sweep planning and driving.
//!
//! A sweep is fully declarative: (maze configuration × grid position ×
//! cardinal heading × eye) tuples, each independent of the rest. Poses are
//! generated transiently, eye views are recomputed fresh per capture and
//! discarded after the capture call returns, so re-running a plan is
//! idempotent and a partially completed sweep stays valid.
//!
//! The driver serializes all renderer calls (the host has a single camera
//! object); placement itself is pure and freely parallelizable.

use serde::{Deserialize, Serialize};

use crate::barrier::{AssemblyVersions, BarrierError, BarrierMap, MazeConfig};
use crate::maze::{cm_to_in, GridCoord, MazeError, MazeLayout};
use crate::naming::{DatasetLayout, FixedPointName, GridName, Illumination};
use crate::renderer::{Renderer, RendererError};
use crate::stereo::{place_stereo, Cardinal, Eye, EyeConfig, MazePose, PlacementError};

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors that abort a whole sweep. Placement and maze errors indicate a
/// bad grid/config definition and fail fast; collaborator errors abort only
/// when even the initial workspace switch fails. Per-capture collaborator
/// failures are reported in the [`SweepReport`] instead.
#[derive(Debug)]
pub enum SweepError {
    Placement(PlacementError),
    Maze(MazeError),
    Renderer(RendererError),
}

impl std::fmt::Display for SweepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Placement(e) => write!(f, "placement error: {}", e),
            Self::Maze(e) => write!(f, "maze error: {}", e),
            Self::Renderer(e) => write!(f, "renderer error: {}", e),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Placement(e) => Some(e),
            Self::Maze(e) => Some(e),
            Self::Renderer(e) => Some(e),
        }
    }
}

impl From<PlacementError> for SweepError {
    fn from(e: PlacementError) -> Self {
        Self::Placement(e)
    }
}

impl From<MazeError> for SweepError {
    fn from(e: MazeError) -> Self {
        Self::Maze(e)
    }
}

impl From<RendererError> for SweepError {
    fn from(e: RendererError) -> Self {
        Self::Renderer(e)
    }
}

// ── Plan ───────────────────────────────────────────────────────────────────

/// Declarative description of a grid sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPlan {
    pub positions: Vec<GridCoord>,
    pub headings: Vec<Cardinal>,
    pub configs: Vec<MazeConfig>,
    pub eye_config: EyeConfig,
    pub illumination: Illumination,
    pub layout: DatasetLayout,
}

impl SweepPlan {
    /// Number of capture tuples the plan enumerates.
    pub fn capture_count(&self) -> usize {
        self.configs.len() * self.positions.len() * self.headings.len() * 2
    }

    /// Enumerates every capture tuple with its pose and output filename.
    /// Deterministic order: configs, then positions, then headings, then
    /// left before right.
    pub fn captures(&self, maze: &MazeLayout) -> Vec<PlannedCapture> {
        let mut out = Vec::with_capacity(self.capture_count());
        for config in &self.configs {
            for &grid in &self.positions {
                let point_cm = maze.model_point_cm(grid);
                for &heading in &self.headings {
                    let pose = MazePose::new(point_cm[0], point_cm[1], heading.heading_deg());
                    for eye in [Eye::Left, Eye::Right] {
                        let name = GridName {
                            gx: grid.gx,
                            gy: grid.gy,
                            heading,
                            config_tag: config.tag,
                            eye,
                        };
                        out.push(PlannedCapture {
                            config_tag: config.tag,
                            grid,
                            heading,
                            eye,
                            pose,
                            file_name: name.to_string(),
                        });
                    }
                }
            }
        }
        out
    }
}

/// One enumerated capture tuple. The eye view itself is not stored here;
/// the driver recomputes it at capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCapture {
    pub config_tag: u32,
    pub grid: GridCoord,
    pub heading: Cardinal,
    pub eye: Eye,
    pub pose: MazePose,
    pub file_name: String,
}

// ── Driver ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOptions {
    /// Skip tuples whose output file the renderer reports as existing.
    pub skip_existing: bool,
    /// Lower/raise each configuration's barriers around its captures.
    pub apply_barriers: bool,
}

/// A capture that failed on the collaborator side, with enough context to
/// retry just this tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureFailure {
    pub file_name: String,
    pub config_tag: u32,
    pub grid: GridCoord,
    pub heading: Cardinal,
    pub eye: Eye,
    pub error: String,
}

/// Outcome of a sweep run. Partial datasets are expected and acceptable;
/// failures list the tuples an operator can retry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub captured: usize,
    pub skipped: usize,
    pub failures: Vec<CaptureFailure>,
}

/// Runs a sweep against a renderer.
///
/// Placement errors halt immediately (bad grid/config definition);
/// per-capture collaborator errors are recorded and the sweep continues.
/// Barrier application failures skip the affected configuration's tuples
/// but keep the run going.
pub fn run_sweep<R: Renderer + ?Sized>(
    plan: &SweepPlan,
    maze: &MazeLayout,
    barriers: &BarrierMap,
    versions: &AssemblyVersions,
    renderer: &mut R,
    opts: &SweepOptions,
) -> Result<SweepReport, SweepError> {
    let mut report = SweepReport::default();
    renderer.switch_to_render_workspace()?;
    let bounds = maze.traversable_bounds();

    for config in &plan.configs {
        if opts.apply_barriers {
            if let Err(e) = config.apply(renderer, barriers, versions) {
                tracing::warn!(tag = config.tag, error = %e, "skipping maze configuration");
                record_config_failures(plan, maze, config, &e, &mut report);
                continue;
            }
        }

        for &grid in &plan.positions {
            let point_cm = maze.model_point_cm(grid);
            for &heading in &plan.headings {
                let pose = MazePose::new(point_cm[0], point_cm[1], heading.heading_deg());
                let pair =
                    crate::stereo::place_stereo_within(&pose, &plan.eye_config, &bounds)?;
                for eye in [Eye::Left, Eye::Right] {
                    let view = pair.view(eye);
                    let name = GridName {
                        gx: grid.gx,
                        gy: grid.gy,
                        heading,
                        config_tag: config.tag,
                        eye,
                    }
                    .to_string();
                    let path = plan.layout.path_for(plan.illumination, &name);

                    if opts.skip_existing && renderer.image_exists(&path) {
                        report.skipped += 1;
                        continue;
                    }

                    let result = renderer
                        .set_camera_eye(view.position, view.aim_target, view.fov_vertical_deg)
                        .and_then(|_| renderer.capture_image(&path));
                    match result {
                        Ok(()) => {
                            report.captured += 1;
                            tracing::info!(file = %name, "captured");
                        }
                        Err(e) => {
                            tracing::warn!(file = %name, error = %e, "capture failed");
                            report.failures.push(CaptureFailure {
                                file_name: name,
                                config_tag: config.tag,
                                grid,
                                heading,
                                eye,
                                error: e.to_string(),
                            });
                        }
                    }
                }
            }
        }

        if opts.apply_barriers {
            if let Err(e) = config.reset(renderer, barriers, versions) {
                tracing::warn!(tag = config.tag, error = %e, "failed to reset maze configuration");
            }
        }
    }

    Ok(report)
}

fn record_config_failures(
    plan: &SweepPlan,
    maze: &MazeLayout,
    config: &MazeConfig,
    error: &BarrierError,
    report: &mut SweepReport,
) {
    let single = SweepPlan {
        configs: vec![config.clone()],
        ..plan.clone()
    };
    for planned in single.captures(maze) {
        report.failures.push(CaptureFailure {
            file_name: planned.file_name,
            config_tag: planned.config_tag,
            grid: planned.grid,
            heading: planned.heading,
            eye: planned.eye,
            error: error.to_string(),
        });
    }
}

// ── Fixed four-direction capture ───────────────────────────────────────────

/// The fixed-point flow: one model position, all four cardinals, both
/// eyes, fixed-point filenames. Uses the same placement function as the
/// grid sweep, so placements for the same logical pose are identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FourDirectionCapture {
    /// Position in model cm.
    pub x_cm: f64,
    pub y_cm: f64,
    pub eye_config: EyeConfig,
    pub illumination: Illumination,
    pub layout: DatasetLayout,
}

impl FourDirectionCapture {
    pub fn run<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        opts: &SweepOptions,
    ) -> Result<SweepReport, SweepError> {
        let mut report = SweepReport::default();
        renderer.switch_to_render_workspace()?;

        for heading in Cardinal::ALL {
            let pose = MazePose::new(self.x_cm, self.y_cm, heading.heading_deg());
            let pair = place_stereo(&pose, &self.eye_config)?;
            for eye in [Eye::Left, Eye::Right] {
                let view = pair.view(eye);
                let name = FixedPointName {
                    eye,
                    x_in: cm_to_in(self.x_cm),
                    y_in: cm_to_in(self.y_cm),
                    heading_deg: heading.heading_deg() as u32,
                }
                .to_string();
                let path = self.layout.path_for(self.illumination, &name);

                if opts.skip_existing && renderer.image_exists(&path) {
                    report.skipped += 1;
                    continue;
                }

                let result = renderer
                    .set_camera_eye(view.position, view.aim_target, view.fov_vertical_deg)
                    .and_then(|_| renderer.capture_image(&path));
                match result {
                    Ok(()) => report.captured += 1,
                    Err(e) => report.failures.push(CaptureFailure {
                        file_name: name,
                        config_tag: 0,
                        grid: GridCoord { gx: 0, gy: 0 },
                        heading,
                        eye,
                        error: e.to_string(),
                    }),
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::in_to_cm;
    use crate::renderer::{DryRunRenderer, RendererCall};
    use std::path::PathBuf;

    fn test_eye_config() -> EyeConfig {
        EyeConfig {
            eye_height_cm: in_to_cm(33.577 + 2.5),
            interocular_cm: in_to_cm(0.5),
            pitch_deg: 15.0,
            yaw_offset_deg: 50.0,
            fov_vertical_deg: 150.0,
        }
    }

    fn small_plan() -> SweepPlan {
        SweepPlan {
            positions: vec![
                GridCoord::new(6, 6).unwrap(),
                GridCoord::new(2, 2).unwrap(),
            ],
            headings: Cardinal::ALL.to_vec(),
            configs: vec![MazeConfig::baseline(0)],
            eye_config: test_eye_config(),
            illumination: Illumination::NonGi,
            layout: DatasetLayout::new("/data/run"),
        }
    }

    #[test]
    fn plan_enumerates_all_tuples_deterministically() {
        let plan = small_plan();
        let maze = MazeLayout::default();
        let captures = plan.captures(&maze);
        assert_eq!(captures.len(), plan.capture_count());
        assert_eq!(captures.len(), 16);
        assert_eq!(captures[0].file_name, "6_6_0_0_L.png");
        assert_eq!(captures[1].file_name, "6_6_0_0_R.png");
        assert_eq!(captures[2].file_name, "6_6_1_0_L.png");
        // Identical plans enumerate identically.
        assert_eq!(captures, plan.captures(&maze));
    }

    #[test]
    fn sweep_captures_every_tuple() {
        let plan = small_plan();
        let maze = MazeLayout::default();
        let mut r = DryRunRenderer::new();
        let report = run_sweep(
            &plan,
            &maze,
            &BarrierMap::standard(),
            &AssemblyVersions::default(),
            &mut r,
            &SweepOptions::default(),
        )
        .unwrap();

        assert_eq!(report.captured, 16);
        assert_eq!(report.skipped, 0);
        assert!(report.failures.is_empty());
        // One workspace switch, then set-camera + capture per tuple.
        assert_eq!(r.calls[0], RendererCall::SwitchWorkspace);
        assert_eq!(r.calls.len(), 1 + 16 * 2);
        assert_eq!(r.captured_paths().len(), 16);
        assert_eq!(
            r.captured_paths()[0],
            PathBuf::from("/data/run/non_gi/6_6_0_0_L.png")
        );
    }

    #[test]
    fn capture_failure_is_reported_and_sweep_continues() {
        let plan = small_plan();
        let maze = MazeLayout::default();
        let mut r = DryRunRenderer::new();
        r.fail_captures
            .insert(PathBuf::from("/data/run/non_gi/6_6_2_0_R.png"));

        let report = run_sweep(
            &plan,
            &maze,
            &BarrierMap::standard(),
            &AssemblyVersions::default(),
            &mut r,
            &SweepOptions::default(),
        )
        .unwrap();

        assert_eq!(report.captured, 15);
        assert_eq!(report.failures.len(), 1);
        let failure = &report.failures[0];
        assert_eq!(failure.file_name, "6_6_2_0_R.png");
        assert_eq!(failure.heading, Cardinal::South);
        assert_eq!(failure.eye, Eye::Right);
        assert_eq!(failure.grid, GridCoord::new(6, 6).unwrap());
    }

    #[test]
    fn skip_existing_makes_reruns_idempotent() {
        let plan = small_plan();
        let maze = MazeLayout::default();
        let opts = SweepOptions {
            skip_existing: true,
            ..Default::default()
        };

        let mut first = DryRunRenderer::new();
        let report = run_sweep(
            &plan,
            &maze,
            &BarrierMap::standard(),
            &AssemblyVersions::default(),
            &mut first,
            &opts,
        )
        .unwrap();
        assert_eq!(report.captured, 16);

        // Second run against a backend that has all first-run outputs.
        let mut second = DryRunRenderer::new();
        second.existing = first
            .captured_paths()
            .into_iter()
            .map(|p| p.to_path_buf())
            .collect();
        let report = run_sweep(
            &plan,
            &maze,
            &BarrierMap::standard(),
            &AssemblyVersions::default(),
            &mut second,
            &opts,
        )
        .unwrap();
        assert_eq!(report.captured, 0);
        assert_eq!(report.skipped, 16);
    }

    #[test]
    fn barrier_configs_bracket_their_captures() {
        let mut plan = small_plan();
        plan.positions.truncate(1);
        plan.headings.truncate(1);
        plan.configs = vec![MazeConfig {
            tag: 3,
            lowered: vec![GridCoord::new(6, 5).unwrap()],
            drop_in: 16.0,
        }];
        let maze = MazeLayout::default();
        let mut r = DryRunRenderer::new();
        let opts = SweepOptions {
            apply_barriers: true,
            ..Default::default()
        };
        let report = run_sweep(
            &plan,
            &maze,
            &BarrierMap::standard(),
            &AssemblyVersions::default(),
            &mut r,
            &opts,
        )
        .unwrap();
        assert_eq!(report.captured, 2);

        // Lower before the first capture, raise after the last.
        assert!(matches!(r.calls[1], RendererCall::AssemblyOffset { .. }));
        assert!(matches!(
            r.calls.last().unwrap(),
            RendererCall::AssemblyOffset { .. }
        ));
        // Filenames carry the config tag.
        assert_eq!(
            r.captured_paths()[0],
            PathBuf::from("/data/run/non_gi/6_6_0_3_L.png")
        );
    }

    #[test]
    fn unmapped_barrier_skips_config_but_not_sweep() {
        let mut plan = small_plan();
        plan.configs = vec![
            MazeConfig {
                tag: 1,
                lowered: vec![GridCoord::new(1, 1).unwrap()], // no barrier here
                drop_in: 16.0,
            },
            MazeConfig::baseline(2),
        ];
        let maze = MazeLayout::default();
        let mut r = DryRunRenderer::new();
        let opts = SweepOptions {
            apply_barriers: true,
            ..Default::default()
        };
        let report = run_sweep(
            &plan,
            &maze,
            &BarrierMap::standard(),
            &AssemblyVersions::default(),
            &mut r,
            &opts,
        )
        .unwrap();

        // Config 1's 16 tuples failed; config 2's 16 captured.
        assert_eq!(report.captured, 16);
        assert_eq!(report.failures.len(), 16);
        assert!(report.failures.iter().all(|f| f.config_tag == 1));
    }

    #[test]
    fn bad_eye_config_halts_the_sweep() {
        let mut plan = small_plan();
        plan.eye_config.interocular_cm = -1.0;
        let maze = MazeLayout::default();
        let mut r = DryRunRenderer::new();
        let err = run_sweep(
            &plan,
            &maze,
            &BarrierMap::standard(),
            &AssemblyVersions::default(),
            &mut r,
            &SweepOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SweepError::Placement(_)));
    }

    #[test]
    fn four_direction_flow_matches_grid_flow_placement() {
        // Same logical pose through both flows must place the camera
        // identically.
        let maze = MazeLayout::default();
        let grid = GridCoord::new(6, 6).unwrap();
        let point_cm = maze.model_point_cm(grid);
        let cfg = test_eye_config();

        let mut grid_backend = DryRunRenderer::new();
        let plan = SweepPlan {
            positions: vec![grid],
            headings: Cardinal::ALL.to_vec(),
            configs: vec![MazeConfig::baseline(0)],
            eye_config: cfg,
            illumination: Illumination::NonGi,
            layout: DatasetLayout::new("/data/a"),
        };
        run_sweep(
            &plan,
            &maze,
            &BarrierMap::standard(),
            &AssemblyVersions::default(),
            &mut grid_backend,
            &SweepOptions::default(),
        )
        .unwrap();

        let mut fixed_backend = DryRunRenderer::new();
        let fixed = FourDirectionCapture {
            x_cm: point_cm[0],
            y_cm: point_cm[1],
            eye_config: cfg,
            illumination: Illumination::NonGi,
            layout: DatasetLayout::new("/data/b"),
        };
        fixed.run(&mut fixed_backend, &SweepOptions::default()).unwrap();

        let cameras = |r: &DryRunRenderer| -> Vec<RendererCall> {
            r.calls
                .iter()
                .filter(|c| matches!(c, RendererCall::SetCamera { .. }))
                .cloned()
                .collect()
        };
        assert_eq!(cameras(&grid_backend), cameras(&fixed_backend));
    }

    #[test]
    fn fixed_point_names_use_inches() {
        let maze = MazeLayout::default();
        let point_cm = maze.model_point_cm(GridCoord::new(6, 6).unwrap());
        let fixed = FourDirectionCapture {
            x_cm: point_cm[0],
            y_cm: point_cm[1],
            eye_config: test_eye_config(),
            illumination: Illumination::NonGi,
            layout: DatasetLayout::new("/data/fixed"),
        };
        let mut r = DryRunRenderer::new();
        fixed.run(&mut r, &SweepOptions::default()).unwrap();
        // North is the first cardinal; (6,6) surveys at (55.519, 53.50) in.
        assert_eq!(
            r.captured_paths()[0],
            PathBuf::from("/data/fixed/non_gi/left_x55.52_y53.50_h90.png")
        );
    }
}
