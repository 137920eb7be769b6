//! Run configuration files.
//!
//! Operators describe a sweep in JSON using the units the maze was
//! surveyed in (inches, degrees); loading converts to core units once and
//! produces a validated [`SweepPlan`]. Every field except the output root
//! has a default taken from the production rat-view runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::barrier::MazeConfig;
use crate::maze::{in_to_cm, GridCoord, MazeLayout};
use crate::naming::{DatasetLayout, Illumination};
use crate::stereo::{Cardinal, EyeConfig};
use crate::sweep::SweepPlan;

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "failed to read {}: {}", path.display(), e),
            Self::Parse(e) => write!(f, "failed to parse run config: {}", e),
            Self::Invalid(msg) => write!(f, "invalid run config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(_, e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

// ── Eye parameters ─────────────────────────────────────────────────────────

/// Eye parameters as written in run configs: inches and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeParams {
    /// Height of the eyes above the maze floor, inches.
    pub eye_height_above_floor_in: f64,
    /// Interocular separation, inches.
    pub interocular_in: f64,
    /// Upward gaze pitch, degrees.
    pub pitch_deg: f64,
    /// Per-eye yaw divergence from straight ahead, degrees.
    pub yaw_offset_deg: f64,
    /// Vertical field of view per eye, degrees.
    pub fov_vertical_deg: f64,
}

impl Default for EyeParams {
    fn default() -> Self {
        // Production rat-view constants.
        Self {
            eye_height_above_floor_in: 2.5,
            interocular_in: 0.5,
            pitch_deg: 15.0,
            yaw_offset_deg: 50.0,
            fov_vertical_deg: 150.0,
        }
    }
}

impl EyeParams {
    /// Core eye configuration in cm, with the maze floor height folded
    /// into the absolute eye height.
    pub fn to_eye_config(self, maze: &MazeLayout) -> EyeConfig {
        EyeConfig {
            eye_height_cm: maze.floor_z_cm() + in_to_cm(self.eye_height_above_floor_in),
            interocular_cm: in_to_cm(self.interocular_in),
            pitch_deg: self.pitch_deg,
            yaw_offset_deg: self.yaw_offset_deg,
            fov_vertical_deg: self.fov_vertical_deg,
        }
    }
}

// ── Maze configuration spec ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeConfigSpec {
    pub tag: u32,
    #[serde(default)]
    pub lowered: Vec<[u8; 2]>,
    #[serde(default = "default_drop_in")]
    pub drop_in: f64,
}

fn default_drop_in() -> f64 {
    16.0
}

impl MazeConfigSpec {
    fn to_maze_config(&self) -> Result<MazeConfig, ConfigError> {
        let lowered = self
            .lowered
            .iter()
            .map(|&[gx, gy]| {
                GridCoord::new(gx, gy)
                    .map_err(|e| ConfigError::Invalid(format!("config {}: {}", self.tag, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MazeConfig {
            tag: self.tag,
            lowered,
            drop_in: self.drop_in,
        })
    }
}

// ── Run configuration ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Dataset root; the GI and non-GI trees live beneath it.
    pub output_root: PathBuf,
    #[serde(default = "default_illumination")]
    pub illumination: Illumination,
    /// Grid positions to sweep, as [gx, gy] pairs.
    pub grid_positions: Vec<[u8; 2]>,
    #[serde(default)]
    pub eye: EyeParams,
    /// Maze states to capture under; empty means one baseline state with
    /// tag 0 and no barriers moved.
    #[serde(default)]
    pub maze_configs: Vec<MazeConfigSpec>,
}

fn default_illumination() -> Illumination {
    Illumination::NonGi
}

impl RunConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(ConfigError::Parse)
    }

    /// Validates and converts into a sweep plan.
    pub fn plan(&self, maze: &MazeLayout) -> Result<SweepPlan, ConfigError> {
        if self.grid_positions.is_empty() {
            return Err(ConfigError::Invalid(
                "grid_positions must not be empty".to_string(),
            ));
        }
        let positions = self
            .grid_positions
            .iter()
            .map(|&[gx, gy]| {
                GridCoord::new(gx, gy).map_err(|e| ConfigError::Invalid(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let configs = if self.maze_configs.is_empty() {
            vec![MazeConfig::baseline(0)]
        } else {
            self.maze_configs
                .iter()
                .map(MazeConfigSpec::to_maze_config)
                .collect::<Result<Vec<_>, _>>()?
        };

        let eye_config = self.eye.to_eye_config(maze);
        eye_config
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(SweepPlan {
            positions,
            headings: Cardinal::ALL.to_vec(),
            configs,
            eye_config,
            illumination: self.illumination,
            layout: DatasetLayout::new(self.output_root.clone()),
        })
    }
}
