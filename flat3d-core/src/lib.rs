/// flat3d Core Library - software transform, cull, light, project and sort pipeline
///
/// This library is renderer-agnostic: it turns a triangle mesh into a
/// back-to-front list of flat-shaded screen-space triangles and hands them to
/// any `Renderer` implementation.

pub mod config;
pub mod error;
pub mod geometry;
pub mod obj;
pub mod painter;
pub mod pipeline;
pub mod projection;
pub mod renderer;
pub mod transform;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use geometry::{Mesh, Rgb, Triangle, BASE, LINE, PRIMARY};
pub use painter::{DisplayOptions, ScreenTriangle};
pub use pipeline::{Frame, FrameStats, Pipeline};
pub use projection::{Camera, ProjectionParams, Viewport};
pub use renderer::{DrawCommand, RecordingRenderer, Renderer, Triangle2d};
pub use transform::{FrameState, Transform};
