//! Stereo eye placement geometry.
//!
//! Converts a logical maze pose (position + compass heading) and a set of
//! eye parameters into two eye viewpoints with aim targets, ready to hand
//! to a renderer. All geometry is in centimeters; inputs in other units
//! must be converted before they reach this module.
//!
//! Heading convention: 0° = East (+X), increasing counterclockwise, so
//! 90° = North (+Y), 180° = West, 270° = South. The same formula serves
//! arbitrary headings and the four cardinals; at exactly 0/90/180/270 the
//! direction vectors are the exact axis vectors, so cardinal-only capture
//! flows and grid sweeps place the camera bit-identically.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Distance from the eye to its aim target, in cm. Only the direction
/// matters to the renderer; the magnitude just needs to be positive.
pub const AIM_DISTANCE_CM: f64 = 100.0;

// ── Error type ─────────────────────────────────────────────────────────────

/// Errors produced by the placement model. These indicate a bad pose or
/// eye configuration, not a transient condition.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// Heading is NaN or infinite.
    InvalidHeading(f64),
    /// Eye configuration violates an invariant (negative interocular
    /// distance, non-positive FOV, eye outside the maze, ...).
    InvalidEyeConfig(String),
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHeading(h) => write!(f, "invalid heading: {}", h),
            Self::InvalidEyeConfig(msg) => write!(f, "invalid eye config: {}", msg),
        }
    }
}

impl std::error::Error for PlacementError {}

// ── Pose and configuration ─────────────────────────────────────────────────

/// Logical position and facing direction inside the maze, in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MazePose {
    /// X position in cm.
    pub x_cm: f64,
    /// Y position in cm.
    pub y_cm: f64,
    /// Compass heading in degrees; normalized into [0, 360) on use.
    pub heading_deg: f64,
}

impl MazePose {
    pub fn new(x_cm: f64, y_cm: f64, heading_deg: f64) -> Self {
        Self {
            x_cm,
            y_cm,
            heading_deg,
        }
    }
}

/// Which simulated eye a view belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    /// Single-letter tag used by grid dataset filenames.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Left => "L",
            Self::Right => "R",
        }
    }

    /// Full word used by fixed-point dataset filenames.
    pub fn word(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "L" => Some(Self::Left),
            "R" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn from_word(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Process-wide eye parameters, in cm and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeConfig {
    /// Eye height above the maze floor plane, cm.
    pub eye_height_cm: f64,
    /// Separation between the left and right eye, cm.
    pub interocular_cm: f64,
    /// Upward pitch of the gaze, degrees.
    pub pitch_deg: f64,
    /// Per-eye yaw divergence from straight ahead, degrees. The left eye
    /// aims at heading + offset, the right at heading − offset. Zero gives
    /// both eyes the shared forward aim direction.
    pub yaw_offset_deg: f64,
    /// Vertical field of view to apply per eye, degrees.
    pub fov_vertical_deg: f64,
}

impl EyeConfig {
    /// Checks the configuration invariants. FOV must lie strictly inside
    /// (0, 180); out-of-range values are rejected rather than clamped.
    pub fn validate(&self) -> Result<(), PlacementError> {
        let bad = |msg: String| Err(PlacementError::InvalidEyeConfig(msg));
        if !self.eye_height_cm.is_finite() || self.eye_height_cm < 0.0 {
            return bad(format!("eye height must be >= 0, got {}", self.eye_height_cm));
        }
        if !self.interocular_cm.is_finite() || self.interocular_cm < 0.0 {
            return bad(format!(
                "interocular distance must be >= 0, got {}",
                self.interocular_cm
            ));
        }
        if !self.pitch_deg.is_finite() {
            return bad(format!("pitch must be finite, got {}", self.pitch_deg));
        }
        if !self.yaw_offset_deg.is_finite() {
            return bad(format!("yaw offset must be finite, got {}", self.yaw_offset_deg));
        }
        if !self.fov_vertical_deg.is_finite()
            || self.fov_vertical_deg <= 0.0
            || self.fov_vertical_deg >= 180.0
        {
            return bad(format!(
                "vertical FOV must lie in (0, 180), got {}",
                self.fov_vertical_deg
            ));
        }
        Ok(())
    }
}

// ── Derived views ──────────────────────────────────────────────────────────

/// One eye's viewpoint: where the camera sits, where it looks, and the
/// vertical FOV to apply. Recomputed fresh for every pose; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeView {
    pub eye: Eye,
    /// Camera position in model cm.
    pub position: Point3<f64>,
    /// Point the camera looks at, in model cm.
    pub aim_target: Point3<f64>,
    /// Vertical field of view, degrees (passed through from [`EyeConfig`]).
    pub fov_vertical_deg: f64,
}

/// Left/right pair produced by one placement call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StereoPair {
    pub left: EyeView,
    pub right: EyeView,
}

impl StereoPair {
    pub fn view(&self, eye: Eye) -> &EyeView {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }
}

// ── Cardinal headings ──────────────────────────────────────────────────────

/// The four cardinal headings used by grid datasets. The filename index
/// order is N, E, S, W.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinal {
    North,
    East,
    South,
    West,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Heading in degrees under the 0° = East convention.
    pub fn heading_deg(self) -> f64 {
        match self {
            Self::North => 90.0,
            Self::East => 0.0,
            Self::South => 270.0,
            Self::West => 180.0,
        }
    }

    /// Index used in grid dataset filenames (0=N, 1=E, 2=S, 3=W).
    pub fn index(self) -> u8 {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    pub fn from_index(i: u8) -> Option<Self> {
        match i {
            0 => Some(Self::North),
            1 => Some(Self::East),
            2 => Some(Self::South),
            3 => Some(Self::West),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::North => "North",
            Self::East => "East",
            Self::South => "South",
            Self::West => "West",
        }
    }
}

// ── Placement ──────────────────────────────────────────────────────────────

/// Normalizes a heading into [0, 360). Non-finite input is rejected.
pub fn normalize_heading(deg: f64) -> Result<f64, PlacementError> {
    if !deg.is_finite() {
        return Err(PlacementError::InvalidHeading(deg));
    }
    let h = deg % 360.0;
    Ok(if h < 0.0 { h + 360.0 } else { h })
}

/// Horizontal unit vector for a heading already normalized to [0, 360).
/// Exact at the four cardinals so that cardinal-only flows and arbitrary
/// headings land on identical vectors.
fn heading_unit(deg: f64) -> Vector3<f64> {
    if deg == 0.0 {
        Vector3::new(1.0, 0.0, 0.0)
    } else if deg == 90.0 {
        Vector3::new(0.0, 1.0, 0.0)
    } else if deg == 180.0 {
        Vector3::new(-1.0, 0.0, 0.0)
    } else if deg == 270.0 {
        Vector3::new(0.0, -1.0, 0.0)
    } else {
        let r = deg.to_radians();
        Vector3::new(r.cos(), r.sin(), 0.0)
    }
}

/// Aim point ahead of an eye: [`AIM_DISTANCE_CM`] along the gaze heading,
/// tilted by `pitch_deg` around the eye position itself.
fn aim_from(eye_pos: Point3<f64>, gaze_heading_deg: f64, pitch_deg: f64) -> Point3<f64> {
    let horizontal = heading_unit(gaze_heading_deg);
    let p = pitch_deg.to_radians();
    let dir = Vector3::new(
        p.cos() * horizontal.x,
        p.cos() * horizontal.y,
        p.sin(),
    );
    eye_pos + dir * AIM_DISTANCE_CM
}

/// Places both eyes for a pose. Pure and deterministic: identical inputs
/// always yield bit-identical pairs.
pub fn place_stereo(pose: &MazePose, cfg: &EyeConfig) -> Result<StereoPair, PlacementError> {
    cfg.validate()?;
    let heading = normalize_heading(pose.heading_deg)?;

    let base = Point3::new(pose.x_cm, pose.y_cm, cfg.eye_height_cm);
    // Left-hand lateral = forward rotated +90° in the horizontal plane.
    let lateral_left = heading_unit(normalize_heading(heading + 90.0)?);
    let half_sep = cfg.interocular_cm / 2.0;

    let left_pos = base + lateral_left * half_sep;
    let right_pos = base - lateral_left * half_sep;

    let left = EyeView {
        eye: Eye::Left,
        position: left_pos,
        aim_target: aim_from(
            left_pos,
            normalize_heading(heading + cfg.yaw_offset_deg)?,
            cfg.pitch_deg,
        ),
        fov_vertical_deg: cfg.fov_vertical_deg,
    };
    let right = EyeView {
        eye: Eye::Right,
        position: right_pos,
        aim_target: aim_from(
            right_pos,
            normalize_heading(heading - cfg.yaw_offset_deg)?,
            cfg.pitch_deg,
        ),
        fov_vertical_deg: cfg.fov_vertical_deg,
    };

    Ok(StereoPair { left, right })
}

/// Like [`place_stereo`], but additionally rejects configurations whose
/// eye positions land outside the maze's traversable bounds.
pub fn place_stereo_within(
    pose: &MazePose,
    cfg: &EyeConfig,
    bounds: &crate::maze::MazeBounds,
) -> Result<StereoPair, PlacementError> {
    let pair = place_stereo(pose, cfg)?;
    for view in [&pair.left, &pair.right] {
        if !bounds.contains(view.position.x, view.position.y) {
            return Err(PlacementError::InvalidEyeConfig(format!(
                "{:?} eye at ({:.3}, {:.3}) cm falls outside the traversable maze bounds",
                view.eye, view.position.x, view.position.y
            )));
        }
    }
    Ok(pair)
}
