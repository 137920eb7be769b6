//! Maze grid to model coordinates.
//!
//! The physical maze was surveyed at nine reference intersections; every
//! other grid point is interpolated from those. Survey values are in
//! inches (the CAD model's authoring unit); conversion to cm happens once,
//! at [`MazeLayout::model_point_cm`], and nowhere else.

use serde::{Deserialize, Serialize};

/// Inches-to-centimeters factor. The single unit boundary of the crate.
pub const IN_TO_CM: f64 = 2.54;

pub fn in_to_cm(v: f64) -> f64 {
    v * IN_TO_CM
}

pub fn cm_to_in(v: f64) -> f64 {
    v / IN_TO_CM
}

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Grid coordinate outside the 0..=12 maze range.
    GridOutOfRange { gx: i64, gy: i64 },
}

impl std::fmt::Display for MazeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GridOutOfRange { gx, gy } => {
                write!(f, "grid coordinates must be in 0..=12, got ({}, {})", gx, gy)
            }
        }
    }
}

impl std::error::Error for MazeError {}

// ── Grid coordinates ───────────────────────────────────────────────────────

/// A logical maze intersection. Valid coordinates are 0..=12 on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub gx: u8,
    pub gy: u8,
}

impl GridCoord {
    pub const MAX: u8 = 12;

    pub fn new(gx: u8, gy: u8) -> Result<Self, MazeError> {
        if gx > Self::MAX || gy > Self::MAX {
            return Err(MazeError::GridOutOfRange {
                gx: gx as i64,
                gy: gy as i64,
            });
        }
        Ok(Self { gx, gy })
    }
}

impl std::fmt::Display for GridCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.gx, self.gy)
    }
}

// ── Surveyed layout ────────────────────────────────────────────────────────

/// Surveyed reference intersections: (grid, model inches).
const REFERENCE_POINTS: [((u8, u8), (f64, f64)); 9] = [
    ((1, 1), (8.039, 100.98)),
    ((2, 2), (16.336, 92.683)),
    ((6, 2), (55.519, 92.683)),
    ((6, 6), (55.519, 53.50)),
    ((10, 2), (94.702, 92.683)),
    ((11, 1), (102.999, 100.98)),
    ((2, 10), (16.336, 21.973)),
    ((1, 11), (8.039, 6.02)),
    ((11, 11), (102.999, 6.02)),
];

/// Maze floor height in the model, inches.
const FLOOR_Z_IN: f64 = 33.577;

/// Maps logical grid coordinates onto surveyed model coordinates.
///
/// Columns 1 and 11 and rows 1 and 11 sit on the maze's outer ring and use
/// their surveyed values directly; interior columns interpolate linearly
/// between the surveyed columns at row 2, and interior rows interpolate
/// with separate step sizes above and below row 6 (the physical maze is
/// not perfectly uniform).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeLayout {
    floor_z_in: f64,
}

impl Default for MazeLayout {
    fn default() -> Self {
        Self {
            floor_z_in: FLOOR_Z_IN,
        }
    }
}

impl MazeLayout {
    pub fn reference_points(&self) -> &'static [((u8, u8), (f64, f64))] {
        &REFERENCE_POINTS
    }

    pub fn floor_z_in(&self) -> f64 {
        self.floor_z_in
    }

    pub fn floor_z_cm(&self) -> f64 {
        in_to_cm(self.floor_z_in)
    }

    /// Model coordinates for a grid intersection, in inches.
    /// Surveyed points are returned exactly; interpolated values are
    /// rounded to 3 decimals to match the survey precision.
    pub fn model_point_in(&self, grid: GridCoord) -> [f64; 3] {
        let (gx, gy) = (grid.gx, grid.gy);

        if let Some((_, (x, y))) = REFERENCE_POINTS.iter().find(|(g, _)| *g == (gx, gy)) {
            return [*x, *y, self.floor_z_in];
        }

        let x = if gx == 1 {
            8.039
        } else if gx == 11 {
            102.999
        } else {
            // Columns 2..=10 are uniform; step from the row-2 survey.
            let x_step = (94.702 - 16.336) / 8.0;
            16.336 + (gx as f64 - 2.0) * x_step
        };

        let y = if gy == 1 {
            100.98
        } else if gy == 11 {
            6.02
        } else if gy <= 6 {
            let y_step = (92.683 - 53.50) / 4.0;
            92.683 - (gy as f64 - 2.0) * y_step
        } else {
            let y_step_lower = (53.50 - 21.973) / 4.0;
            53.50 - (gy as f64 - 6.0) * y_step_lower
        };

        [round3(x), round3(y), self.floor_z_in]
    }

    /// Model coordinates for a grid intersection, in cm.
    pub fn model_point_cm(&self, grid: GridCoord) -> [f64; 3] {
        let p = self.model_point_in(grid);
        [in_to_cm(p[0]), in_to_cm(p[1]), in_to_cm(p[2])]
    }

    /// Axis-aligned traversable region spanned by the surveyed ring, cm.
    pub fn traversable_bounds(&self) -> MazeBounds {
        MazeBounds {
            min_x_cm: in_to_cm(8.039),
            max_x_cm: in_to_cm(102.999),
            min_y_cm: in_to_cm(6.02),
            max_y_cm: in_to_cm(100.98),
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Axis-aligned traversable region of the maze, in cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MazeBounds {
    pub min_x_cm: f64,
    pub max_x_cm: f64,
    pub min_y_cm: f64,
    pub max_y_cm: f64,
}

impl MazeBounds {
    pub fn contains(&self, x_cm: f64, y_cm: f64) -> bool {
        x_cm >= self.min_x_cm
            && x_cm <= self.max_x_cm
            && y_cm >= self.min_y_cm
            && y_cm <= self.max_y_cm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_points_are_exact() {
        let layout = MazeLayout::default();
        for ((gx, gy), (x, y)) in REFERENCE_POINTS {
            let p = layout.model_point_in(GridCoord::new(gx, gy).unwrap());
            assert_eq!(p, [x, y, FLOOR_Z_IN], "reference ({}, {})", gx, gy);
        }
    }

    #[test]
    fn interior_columns_interpolate_from_row_two_survey() {
        let layout = MazeLayout::default();
        // Column step = (94.702 − 16.336) / 8 = 9.79575.
        let p = layout.model_point_in(GridCoord::new(3, 2).unwrap());
        assert_relative_eq!(p[0], 26.132, epsilon = 1e-9);
        assert_relative_eq!(p[1], 92.683, epsilon = 1e-9);

        let p = layout.model_point_in(GridCoord::new(10, 6).unwrap());
        assert_relative_eq!(p[0], 94.702, epsilon = 1e-9);
        assert_relative_eq!(p[1], 53.5, epsilon = 1e-9);
    }

    #[test]
    fn rows_use_distinct_steps_above_and_below_center() {
        let layout = MazeLayout::default();
        // Above center: step (92.683 − 53.50) / 4 = 9.79575.
        let p = layout.model_point_in(GridCoord::new(6, 4).unwrap());
        assert_relative_eq!(p[1], 92.683 - 2.0 * 9.79575, epsilon = 1e-3);
        // Below center: step (53.50 − 21.973) / 4 = 7.88175.
        let p = layout.model_point_in(GridCoord::new(6, 8).unwrap());
        assert_relative_eq!(p[1], 53.50 - 2.0 * 7.88175, epsilon = 1e-3);
    }

    #[test]
    fn outer_ring_rows_and_columns_are_pinned() {
        let layout = MazeLayout::default();
        let p = layout.model_point_in(GridCoord::new(1, 5).unwrap());
        assert_eq!(p[0], 8.039);
        let p = layout.model_point_in(GridCoord::new(11, 3).unwrap());
        assert_eq!(p[0], 102.999);
        let p = layout.model_point_in(GridCoord::new(4, 1).unwrap());
        assert_eq!(p[1], 100.98);
        let p = layout.model_point_in(GridCoord::new(7, 11).unwrap());
        assert_eq!(p[1], 6.02);
    }

    #[test]
    fn coordinates_out_of_range_are_rejected() {
        assert!(GridCoord::new(13, 0).is_err());
        assert!(GridCoord::new(0, 13).is_err());
        assert!(GridCoord::new(12, 12).is_ok());
    }

    #[test]
    fn cm_conversion_happens_once_at_the_boundary() {
        let layout = MazeLayout::default();
        let grid = GridCoord::new(6, 6).unwrap();
        let inches = layout.model_point_in(grid);
        let cm = layout.model_point_cm(grid);
        for i in 0..3 {
            assert_relative_eq!(cm[i], inches[i] * 2.54, epsilon = 1e-12);
        }
        assert_relative_eq!(cm[0], 141.01826, epsilon = 1e-9);
    }

    #[test]
    fn bounds_cover_the_surveyed_ring() {
        let layout = MazeLayout::default();
        let bounds = layout.traversable_bounds();
        for ((gx, gy), _) in REFERENCE_POINTS {
            let p = layout.model_point_cm(GridCoord::new(gx, gy).unwrap());
            assert!(bounds.contains(p[0], p[1]), "({}, {})", gx, gy);
        }
        assert!(!bounds.contains(0.0, 0.0));
    }

    #[test]
    fn unit_helpers_round_trip() {
        assert_relative_eq!(cm_to_in(in_to_cm(55.519)), 55.519, epsilon = 1e-12);
        assert_eq!(in_to_cm(1.0), 2.54);
    }
}
