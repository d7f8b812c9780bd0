// Top-down map capture: render each tagged object alone from an orthographic camera,
// recolor and outline each layer, then composite the layers into one map image.

pub mod capture;
pub mod composite;
pub mod config;
pub mod error;
pub mod export;
pub mod framing;
pub mod geom;
pub mod outline;
pub mod pipeline;
pub mod recolor;
pub mod scene;
pub mod types;

pub use capture::{ElementRenderer, RenderBackend, next_frame};
pub use composite::{BlendPolicy, composite};
pub use config::{CaptureConfig, ElementSpec, ExportSettings, ObjectHandle};
pub use error::{Error, ErrorKind};
pub use export::{MapSink, PngExporter};
pub use framing::{FrameConfig, FramingCalculator, OrthoView};
pub use outline::outline;
pub use pipeline::{CaptureOutput, ElementResult, Pipeline, PipelineState, Stage};
pub use recolor::{RecolorMode, recolor};
pub use types::{OutputSize, PixelBuffer, Rgba, TextureSize};
