// Capture configuration: which objects to capture, how each one is styled, where the
// camera looks and how the final map is written out. Loaded from JSON or built in code.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::composite::BlendPolicy;
use crate::error::Error;
use crate::framing::{DEFAULT_MARGIN, FrameConfig};
use crate::recolor::RecolorMode;
use crate::types::{OutputSize, Rgba};

/// Opaque, named handle to a renderable object owned by the render backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHandle(String);

impl ObjectHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One capturable element and how it should look on the map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// `None` models an unassigned object slot; capture refuses to run with one.
    #[serde(default)]
    pub object: Option<ObjectHandle>,
    /// Outline ring width in pixels; 0 disables the outline.
    #[serde(default)]
    pub outline_width: u32,
    #[serde(default)]
    pub outline_color: Rgba,
    #[serde(default)]
    pub recolor: RecolorMode,
    /// Only used with `RecolorMode::UseFlatColor`.
    #[serde(default)]
    pub flat_color: Rgba,
}

impl ElementSpec {
    /// Pass-through element with no outline.
    pub fn new(object: ObjectHandle) -> Self {
        Self {
            object: Some(object),
            outline_width: 0,
            outline_color: Rgba::TRANSPARENT,
            recolor: RecolorMode::UseSourceTexture,
            flat_color: Rgba::TRANSPARENT,
        }
    }

    pub fn with_outline(mut self, width: u32, color: Rgba) -> Self {
        self.outline_width = width;
        self.outline_color = color;
        self
    }

    pub fn with_flat_color(mut self, color: Rgba) -> Self {
        self.recolor = RecolorMode::UseFlatColor;
        self.flat_color = color;
        self
    }

    /// Display name for logs.
    pub fn label(&self) -> &str {
        self.object.as_ref().map_or("<unassigned>", ObjectHandle::name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// File name without extension; the exporter picks the directory.
    pub file_name: String,
}

impl ExportSettings {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into() }
    }

    pub fn validate(&self) -> Result<(), Error> {
        let name = self.file_name.trim();
        if name.is_empty() {
            return Err(Error::InvalidExport("map file name is empty".into()));
        }
        if name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::InvalidExport(format!(
                "map file name `{name}` must not contain a path"
            )));
        }
        Ok(())
    }
}

fn default_margin() -> f32 {
    DEFAULT_MARGIN
}

/// Everything one capture run needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Capture order; `OverlapOrdered` gives earlier elements priority.
    pub elements: Vec<ElementSpec>,
    pub corners: FrameConfig,
    pub output_size: OutputSize,
    #[serde(default)]
    pub blend_policy: BlendPolicy,
    pub export: ExportSettings,
    #[serde(default = "default_margin")]
    pub framing_margin: f32,
    /// Keep every stage's per-element buffers in the run output (debugging).
    #[serde(default)]
    pub retain_intermediates: bool,
}

impl CaptureConfig {
    pub fn new(
        elements: Vec<ElementSpec>,
        corners: FrameConfig,
        output_size: OutputSize,
        blend_policy: BlendPolicy,
        export: ExportSettings,
    ) -> Self {
        Self {
            elements,
            corners,
            output_size,
            blend_policy,
            export,
            framing_margin: DEFAULT_MARGIN,
            retain_intermediates: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks that need no scene: element set, export settings, output size.
    pub fn validate(&self) -> Result<(), Error> {
        if self.elements.is_empty() {
            return Err(Error::EmptyElementSet);
        }
        if self.output_size.is_empty() {
            return Err(Error::InvalidExport(format!(
                "output size {} has no pixels",
                self.output_size
            )));
        }
        self.export.validate()
    }
}
