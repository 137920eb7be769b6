//! Host-renderer capability interface.
//!
//! The core never talks to the CAD/render application directly; everything
//! it needs from the host is behind [`Renderer`]. The host exposes exactly
//! one camera object, so implementations are driven serially by the sweep
//! driver even though placement itself is freely parallelizable.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use nalgebra::Point3;

// ── Error type ─────────────────────────────────────────────────────────────

/// Collaborator/environment failures. Reported per capture with enough
/// context for an operator to retry just that capture.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererError {
    /// No scene or camera is loaded in the host.
    RendererUnavailable(String),
    /// The render or image export failed.
    CaptureFailed { path: PathBuf, reason: String },
    /// A named assembly could not be resolved in the scene graph.
    AssemblyNotFound(String),
}

impl std::fmt::Display for RendererError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RendererUnavailable(msg) => write!(f, "renderer unavailable: {}", msg),
            Self::CaptureFailed { path, reason } => {
                write!(f, "capture failed for {}: {}", path.display(), reason)
            }
            Self::AssemblyNotFound(name) => write!(f, "assembly not found: {:?}", name),
        }
    }
}

impl std::error::Error for RendererError {}

// ── Capability trait ───────────────────────────────────────────────────────

/// The capabilities the core requires from its host renderer.
///
/// Positions and targets are in model cm; FOV is the vertical field of
/// view in degrees. The manual GI cloud-render trigger is out-of-band and
/// deliberately absent: GI captures assume the render is already
/// materialized when [`Renderer::capture_image`] is invoked.
pub trait Renderer {
    /// Point the host camera: position, aim target, vertical FOV.
    fn set_camera_eye(
        &mut self,
        position: Point3<f64>,
        aim_target: Point3<f64>,
        fov_vertical_deg: f64,
    ) -> Result<(), RendererError>;

    /// Render the current camera view and save it under `output_path`.
    fn capture_image(&mut self, output_path: &Path) -> Result<(), RendererError>;

    /// Move a named assembly vertically (maze reconfiguration).
    fn set_assembly_offset(
        &mut self,
        assembly: &str,
        vertical_delta_cm: f64,
    ) -> Result<(), RendererError>;

    /// Activate the host's render workspace.
    fn switch_to_render_workspace(&mut self) -> Result<(), RendererError>;

    /// Whether an image already exists at `output_path`. Lets sweep re-runs
    /// skip already-produced files; backends without that knowledge keep
    /// the default and simply overwrite.
    fn image_exists(&self, _output_path: &Path) -> bool {
        false
    }
}

// ── Recording backend ──────────────────────────────────────────────────────

/// One recorded call on a [`DryRunRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    SetCamera {
        position: Point3<f64>,
        aim_target: Point3<f64>,
        fov_vertical_deg: f64,
    },
    Capture(PathBuf),
    AssemblyOffset {
        assembly: String,
        vertical_delta_cm: f64,
    },
    SwitchWorkspace,
}

/// Backend that records every call instead of talking to a host. Used by
/// tests and the CLI dry-run path.
#[derive(Debug, Default)]
pub struct DryRunRenderer {
    pub calls: Vec<RendererCall>,
    /// Paths reported as already existing by [`Renderer::image_exists`].
    pub existing: HashSet<PathBuf>,
    /// Paths whose capture should fail (test hook for per-tuple error
    /// reporting).
    pub fail_captures: HashSet<PathBuf>,
    /// When set, `image_exists` also consults the real filesystem, making
    /// dry re-runs resumable against previously written datasets.
    pub check_filesystem: bool,
}

impl DryRunRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured_paths(&self) -> Vec<&Path> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                RendererCall::Capture(p) => Some(p.as_path()),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for DryRunRenderer {
    fn set_camera_eye(
        &mut self,
        position: Point3<f64>,
        aim_target: Point3<f64>,
        fov_vertical_deg: f64,
    ) -> Result<(), RendererError> {
        tracing::debug!(
            x = position.x,
            y = position.y,
            z = position.z,
            fov = fov_vertical_deg,
            "set camera"
        );
        self.calls.push(RendererCall::SetCamera {
            position,
            aim_target,
            fov_vertical_deg,
        });
        Ok(())
    }

    fn capture_image(&mut self, output_path: &Path) -> Result<(), RendererError> {
        if self.fail_captures.contains(output_path) {
            return Err(RendererError::CaptureFailed {
                path: output_path.to_path_buf(),
                reason: "simulated capture failure".to_string(),
            });
        }
        tracing::info!(path = %output_path.display(), "capture");
        self.calls.push(RendererCall::Capture(output_path.to_path_buf()));
        Ok(())
    }

    fn set_assembly_offset(
        &mut self,
        assembly: &str,
        vertical_delta_cm: f64,
    ) -> Result<(), RendererError> {
        tracing::info!(assembly, delta_cm = vertical_delta_cm, "move assembly");
        self.calls.push(RendererCall::AssemblyOffset {
            assembly: assembly.to_string(),
            vertical_delta_cm,
        });
        Ok(())
    }

    fn switch_to_render_workspace(&mut self) -> Result<(), RendererError> {
        self.calls.push(RendererCall::SwitchWorkspace);
        Ok(())
    }

    fn image_exists(&self, output_path: &Path) -> bool {
        if self.existing.contains(output_path) {
            return true;
        }
        self.check_filesystem && output_path.exists()
    }
}
