//! mazecam-core — stereo camera placement and dataset sweeps for a
//! rendered maze model.
//!
//! Automates placing a left/right eye camera pair inside a CAD-hosted maze
//! and sweeping grids of positions, headings, and maze configurations to
//! export image datasets. The stages are:
//!
//! 1. **Maze** – logical grid coordinates to surveyed model coordinates,
//!    inches at the survey boundary, cm everywhere else.
//! 2. **Stereo** – pure placement model: pose + eye parameters → two eye
//!    viewpoints with aim targets and FOV.
//! 3. **Naming** – bit-exact capture filenames and the parallel GI/non-GI
//!    output trees.
//! 4. **Barrier** – maze reconfiguration through named assembly moves.
//! 5. **Sweep** – declarative capture plans and the serialized driver.
//!
//! The host CAD/render application is reached only through the
//! [`renderer::Renderer`] capability trait; the core holds no handle to it
//! and no state across captures.

pub mod barrier;
pub mod config;
pub mod maze;
pub mod naming;
pub mod renderer;
pub mod stereo;
pub mod sweep;

pub use maze::{GridCoord, MazeLayout};
pub use naming::Illumination;
pub use renderer::{DryRunRenderer, Renderer, RendererError};
pub use stereo::{place_stereo, Cardinal, Eye, EyeConfig, EyeView, MazePose, StereoPair};
pub use sweep::{run_sweep, SweepOptions, SweepPlan, SweepReport};
