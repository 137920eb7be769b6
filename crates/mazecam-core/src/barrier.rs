//! Maze reconfiguration via movable barrier assemblies.
//!
//! The physical maze has drop-in barriers at sixteen surveyed grid
//! positions, each modeled as a saddle-and-plexiglass assembly nested four
//! levels deep in the CAD component tree. A maze configuration names the
//! barriers to lower before a sweep; the occurrence path addresses the
//! exact component the host must move.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::maze::{in_to_cm, GridCoord};
use crate::renderer::{Renderer, RendererError};

// ── Error type ─────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum BarrierError {
    /// No barrier is installed at the given grid position.
    NoBarrierAt(GridCoord),
    /// The host failed to move the resolved assembly.
    Renderer(RendererError),
}

impl std::fmt::Display for BarrierError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBarrierAt(g) => write!(f, "no barrier at grid position {}", g),
            Self::Renderer(e) => write!(f, "barrier move failed: {}", e),
        }
    }
}

impl std::error::Error for BarrierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Renderer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RendererError> for BarrierError {
    fn from(e: RendererError) -> Self {
        Self::Renderer(e)
    }
}

// ── Barrier identity ───────────────────────────────────────────────────────

/// Which arm of the maze a barrier assembly belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarrierKind {
    Center,
    Side(u8),
}

/// A barrier's place in the component tree: its arm and its number within
/// that arm's barrier assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarrierRef {
    pub kind: BarrierKind,
    pub number: u8,
}

/// Component version suffixes; bumped whenever the model is re-exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyVersions {
    pub full_assembly: String,
    pub center_assembly: String,
    pub side_assembly: String,
    pub barrier_assembly: String,
    pub saddle_assembly: String,
}

impl Default for AssemblyVersions {
    fn default() -> Self {
        Self {
            full_assembly: "v20".to_string(),
            center_assembly: "v22".to_string(),
            side_assembly: "v24".to_string(),
            barrier_assembly: "v41".to_string(),
            saddle_assembly: "v13".to_string(),
        }
    }
}

impl AssemblyVersions {
    /// Slash-joined occurrence path of a barrier's saddle assembly, with
    /// the barrier number disambiguating sibling occurrences.
    pub fn occurrence_path(&self, barrier: BarrierRef) -> String {
        let mid = match barrier.kind {
            BarrierKind::Center => format!("Center Assembly {}", self.center_assembly),
            BarrierKind::Side(_) => format!("Side Assembly {}", self.side_assembly),
        };
        format!(
            "Full Assembly {}/{}/New Barrier Assembly {}:{}/Barrier: Saddle and Plexiglass Assembly {}",
            self.full_assembly, mid, self.barrier_assembly, barrier.number, self.saddle_assembly
        )
    }
}

// ── Barrier map ────────────────────────────────────────────────────────────

/// Surveyed grid position → barrier assembly mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierMap {
    entries: BTreeMap<(u8, u8), BarrierRef>,
}

impl BarrierMap {
    /// The sixteen barriers of the production maze: four around the center
    /// hub and three on each of the four side arms.
    pub fn standard() -> Self {
        let center = |n| BarrierRef {
            kind: BarrierKind::Center,
            number: n,
        };
        let side = |s, n| BarrierRef {
            kind: BarrierKind::Side(s),
            number: n,
        };
        let entries = BTreeMap::from([
            ((5, 6), center(4)),
            ((7, 6), center(3)),
            ((6, 5), center(2)),
            ((6, 7), center(1)),
            ((2, 7), side(4, 3)),
            ((2, 5), side(4, 2)),
            ((3, 6), side(4, 1)),
            ((6, 3), side(2, 1)),
            ((5, 2), side(2, 3)),
            ((7, 2), side(2, 2)),
            ((10, 5), side(1, 3)),
            ((9, 6), side(1, 1)),
            ((10, 7), side(1, 2)),
            ((6, 9), side(3, 1)),
            ((7, 10), side(3, 3)),
            ((5, 10), side(3, 2)),
        ]);
        Self { entries }
    }

    pub fn lookup(&self, coord: GridCoord) -> Option<BarrierRef> {
        self.entries.get(&(coord.gx, coord.gy)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves the barrier at `coord` vertically by `delta_in` inches
    /// (negative = lower). The inch value crosses the unit boundary here.
    pub fn apply<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        versions: &AssemblyVersions,
        coord: GridCoord,
        delta_in: f64,
    ) -> Result<(), BarrierError> {
        let barrier = self.lookup(coord).ok_or(BarrierError::NoBarrierAt(coord))?;
        let path = versions.occurrence_path(barrier);
        renderer.set_assembly_offset(&path, in_to_cm(delta_in))?;
        Ok(())
    }
}

// ── Maze configurations ────────────────────────────────────────────────────

/// One maze state, identified by its config tag: the set of barriers to
/// lower (by `drop_in` inches) while captures for this tag run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeConfig {
    pub tag: u32,
    pub lowered: Vec<GridCoord>,
    /// Drop distance in inches.
    pub drop_in: f64,
}

impl MazeConfig {
    /// The all-barriers-up state; used when a sweep has no reconfiguration.
    pub fn baseline(tag: u32) -> Self {
        Self {
            tag,
            lowered: Vec::new(),
            drop_in: 0.0,
        }
    }

    /// Lowers this configuration's barriers.
    pub fn apply<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        map: &BarrierMap,
        versions: &AssemblyVersions,
    ) -> Result<(), BarrierError> {
        for coord in &self.lowered {
            map.apply(renderer, versions, *coord, -self.drop_in)?;
        }
        Ok(())
    }

    /// Raises this configuration's barriers back to the baseline state.
    pub fn reset<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        map: &BarrierMap,
        versions: &AssemblyVersions,
    ) -> Result<(), BarrierError> {
        for coord in &self.lowered {
            map.apply(renderer, versions, *coord, self.drop_in)?;
        }
        Ok(())
    }
}
