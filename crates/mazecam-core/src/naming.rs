//! Deterministic capture filenames and dataset layout.
//!
//! Downstream dataset tooling keys on these names, so the formats are
//! bit-exact contracts:
//!
//! - fixed-point: `{left|right}_x{X:.2}_y{Y:.2}_h{H}.png` (X, Y inches)
//! - grid:        `{gx}_{gy}_{headingIndex}_{configTag}_{L|R}.png`
//!
//! GI and non-GI renders land in two parallel trees with identical leaf
//! names, so corresponding images are comparable by filename alone.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::stereo::{Cardinal, Eye};

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    /// The string does not match the expected filename scheme.
    Malformed(String),
}

impl std::fmt::Display for NameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed capture filename: {:?}", s),
        }
    }
}

impl std::error::Error for NameError {}

// ── Illumination mode ──────────────────────────────────────────────────────

/// Render illumination mode. GI renders are produced by a manually
/// triggered cloud render; non-GI renders come straight from the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Illumination {
    Gi,
    NonGi,
}

impl Illumination {
    /// Subdirectory name of this mode's output tree.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Gi => "gi",
            Self::NonGi => "non_gi",
        }
    }
}

// ── Fixed-point scheme ─────────────────────────────────────────────────────

/// Name for the fixed-point dataset: one surveyed position, named by its
/// model coordinates in inches (two decimals) and heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPointName {
    pub eye: Eye,
    pub x_in: f64,
    pub y_in: f64,
    pub heading_deg: u32,
}

impl std::fmt::Display for FixedPointName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_x{:.2}_y{:.2}_h{}.png",
            self.eye.word(),
            self.x_in,
            self.y_in,
            self.heading_deg
        )
    }
}

impl FixedPointName {
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let malformed = || NameError::Malformed(s.to_string());
        let stem = s.strip_suffix(".png").ok_or_else(malformed)?;
        let mut parts = stem.split('_');

        let eye = parts
            .next()
            .and_then(Eye::from_word)
            .ok_or_else(malformed)?;
        let x_in = parts
            .next()
            .and_then(|p| p.strip_prefix('x'))
            .and_then(|p| p.parse::<f64>().ok())
            .ok_or_else(malformed)?;
        let y_in = parts
            .next()
            .and_then(|p| p.strip_prefix('y'))
            .and_then(|p| p.parse::<f64>().ok())
            .ok_or_else(malformed)?;
        let heading_deg = parts
            .next()
            .and_then(|p| p.strip_prefix('h'))
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(Self {
            eye,
            x_in,
            y_in,
            heading_deg,
        })
    }
}

// ── Grid scheme ────────────────────────────────────────────────────────────

/// Name for the grid dataset: logical grid coordinates, cardinal heading
/// index (0=N, 1=E, 2=S, 3=W), maze configuration tag, and eye letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridName {
    pub gx: u8,
    pub gy: u8,
    pub heading: Cardinal,
    pub config_tag: u32,
    pub eye: Eye,
}

impl std::fmt::Display for GridName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}.png",
            self.gx,
            self.gy,
            self.heading.index(),
            self.config_tag,
            self.eye.tag()
        )
    }
}

impl GridName {
    pub fn parse(s: &str) -> Result<Self, NameError> {
        let malformed = || NameError::Malformed(s.to_string());
        let stem = s.strip_suffix(".png").ok_or_else(malformed)?;
        let parts: Vec<&str> = stem.split('_').collect();
        if parts.len() != 5 {
            return Err(malformed());
        }

        let gx = parts[0].parse::<u8>().map_err(|_| malformed())?;
        let gy = parts[1].parse::<u8>().map_err(|_| malformed())?;
        let heading = parts[2]
            .parse::<u8>()
            .ok()
            .and_then(Cardinal::from_index)
            .ok_or_else(malformed)?;
        let config_tag = parts[3].parse::<u32>().map_err(|_| malformed())?;
        let eye = Eye::from_tag(parts[4]).ok_or_else(malformed)?;

        Ok(Self {
            gx,
            gy,
            heading,
            config_tag,
            eye,
        })
    }
}

// ── Dataset layout ─────────────────────────────────────────────────────────

/// Root of a dataset: one subtree per illumination mode, identical leaf
/// names in both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetLayout {
    pub root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory of one illumination mode's tree.
    pub fn mode_dir(&self, illumination: Illumination) -> PathBuf {
        self.root.join(illumination.dir_name())
    }

    /// Full output path for a capture filename under the given mode.
    pub fn path_for(&self, illumination: Illumination, file_name: &str) -> PathBuf {
        self.mode_dir(illumination).join(file_name)
    }

    /// The GI/non-GI counterpart of an output path, for filename-level
    /// comparison across illumination modes.
    pub fn counterpart(&self, illumination: Illumination, path: &Path) -> Option<PathBuf> {
        let other = match illumination {
            Illumination::Gi => Illumination::NonGi,
            Illumination::NonGi => Illumination::Gi,
        };
        path.file_name()
            .map(|name| self.mode_dir(other).join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_format_is_bit_exact() {
        let name = FixedPointName {
            eye: Eye::Left,
            x_in: 55.519,
            y_in: 53.50,
            heading_deg: 0,
        };
        assert_eq!(name.to_string(), "left_x55.52_y53.50_h0.png");

        let name = FixedPointName {
            eye: Eye::Right,
            x_in: 8.039,
            y_in: 100.98,
            heading_deg: 270,
        };
        assert_eq!(name.to_string(), "right_x8.04_y100.98_h270.png");
    }

    #[test]
    fn fixed_point_parse_round_trip() {
        let name = FixedPointName {
            eye: Eye::Right,
            x_in: 94.70,
            y_in: 21.97,
            heading_deg: 180,
        };
        let parsed = FixedPointName::parse(&name.to_string()).unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn grid_format_is_bit_exact() {
        let name = GridName {
            gx: 6,
            gy: 6,
            heading: Cardinal::North,
            config_tag: 3,
            eye: Eye::Left,
        };
        assert_eq!(name.to_string(), "6_6_0_3_L.png");

        let name = GridName {
            gx: 6,
            gy: 6,
            heading: Cardinal::East,
            config_tag: 3,
            eye: Eye::Right,
        };
        assert_eq!(name.to_string(), "6_6_1_3_R.png");
    }

    #[test]
    fn grid_parse_recovers_all_fields() {
        for gx in [0u8, 6, 12] {
            for heading in Cardinal::ALL {
                for eye in [Eye::Left, Eye::Right] {
                    let name = GridName {
                        gx,
                        gy: 11,
                        heading,
                        config_tag: 7,
                        eye,
                    };
                    assert_eq!(GridName::parse(&name.to_string()).unwrap(), name);
                }
            }
        }
    }

    #[test]
    fn malformed_names_are_rejected() {
        for s in [
            "6_6_0_3_L",        // missing extension
            "6_6_0_3.png",      // missing eye
            "6_6_9_3_L.png",    // heading index out of range
            "6_6_0_3_X.png",    // unknown eye letter
            "center_x1_y2_h3.png",
            "",
        ] {
            assert!(GridName::parse(s).is_err(), "{:?}", s);
        }
        assert!(FixedPointName::parse("left_55.52_53.50_0.png").is_err());
    }

    #[test]
    fn illumination_trees_are_parallel() {
        let layout = DatasetLayout::new("/data/maze");
        let gi = layout.path_for(Illumination::Gi, "6_6_1_3_L.png");
        let non_gi = layout.path_for(Illumination::NonGi, "6_6_1_3_L.png");
        assert_eq!(gi, PathBuf::from("/data/maze/gi/6_6_1_3_L.png"));
        assert_eq!(non_gi, PathBuf::from("/data/maze/non_gi/6_6_1_3_L.png"));
        assert_eq!(gi.file_name(), non_gi.file_name());
        assert_eq!(layout.counterpart(Illumination::Gi, &gi), Some(non_gi));
    }
}
