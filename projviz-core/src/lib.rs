//! projviz core library - scene graph, geometry and rendering for the
//! cube-to-screen projection animation
//!
//! The library holds the geometry (cube, screen, orthogonal projection),
//! a small explicit scene graph with timed transitions, a camera, and
//! writers that turn each frame into SVG and into an ffmpeg-encoded mp4.

pub mod animation;
pub mod config;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod raster;
pub mod render;
pub mod scene;
pub mod style;
pub mod svg;
pub mod transform;
pub mod video;
pub mod visualizer;

// Re-export commonly used types
pub use config::{Quality, RenderConfig, ResolvedConfig};
pub use error::{Result, VizError};
pub use geometry::{Cube, Plane, QUAD_EDGES};
pub use projection::{Camera, ProjectionMode};
pub use render::{render_frame, Frame, Primitive};
pub use scene::{FrameRecorder, FrameSink, RenderSummary, Scene};
pub use svg::SvgSequenceWriter;
pub use transform::{Orientation, Transform};
pub use video::VideoWriter;
pub use visualizer::{ProjectionVisualizer, SCENE_NAME};
