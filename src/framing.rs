// Orthographic camera framing for the capture area.
// Visual: the camera hangs `render_height` above the middle of the four corners, looking
// straight down, zoomed out just enough to see all of them plus a margin.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geom::{WorldBox, WorldPoint, WorldVector, vector};
use crate::types::OutputSize;

pub const DEFAULT_MARGIN: f32 = 1.0;
pub const NEAR_CLIP: f32 = 0.1;

const DEGENERATE_EPSILON: f32 = 1e-6;

/// The capture area: four corner positions and how high above them the camera sits.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    #[serde(default)]
    pub right_top: Option<WorldPoint>,
    #[serde(default)]
    pub left_top: Option<WorldPoint>,
    #[serde(default)]
    pub right_bottom: Option<WorldPoint>,
    #[serde(default)]
    pub left_bottom: Option<WorldPoint>,
    pub render_height: f32,
}

impl FrameConfig {
    pub fn new(
        right_top: WorldPoint,
        left_top: WorldPoint,
        right_bottom: WorldPoint,
        left_bottom: WorldPoint,
        render_height: f32,
    ) -> Self {
        Self {
            right_top: Some(right_top),
            left_top: Some(left_top),
            right_bottom: Some(right_bottom),
            left_bottom: Some(left_bottom),
            render_height,
        }
    }

    /// Corners in perimeter order, each resolved or reported by name.
    fn resolved_corners(&self) -> Result<[WorldPoint; 4], Error> {
        let named = [
            ("right_top", self.right_top),
            ("left_top", self.left_top),
            ("left_bottom", self.left_bottom),
            ("right_bottom", self.right_bottom),
        ];
        let mut out = [WorldPoint::origin(); 4];
        for (slot, (name, corner)) in out.iter_mut().zip(named) {
            *slot = corner
                .ok_or_else(|| Error::InvalidFrame(format!("corner `{name}` is not assigned")))?;
        }
        Ok(out)
    }
}

/// Camera placement produced by framing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoView {
    pub position: WorldPoint,
    pub target: WorldPoint,
    /// Vertical orthographic half-size in world units.
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthoView {
    /// Ground-plane (x, z) position under the center of pixel (px, py).
    /// Image top is +z; the horizontal half-size follows the output aspect ratio.
    pub fn pixel_to_ground(&self, px: usize, py: usize, size: OutputSize) -> (f32, f32) {
        let w = size.width.max(1) as f32;
        let h = size.height.max(1) as f32;
        let half_h = self.half_extent;
        let half_w = self.half_extent * (w / h);
        let u = (px as f32 + 0.5) / w; // 0..1 left to right
        let v = (py as f32 + 0.5) / h; // 0..1 top to bottom
        let x = self.target.x + (u * 2.0 - 1.0) * half_w;
        let z = self.target.z + (1.0 - v * 2.0) * half_h;
        (x, z)
    }
}

/// Computes an `OrthoView` from a `FrameConfig`.
#[derive(Clone, Copy, Debug)]
pub struct FramingCalculator {
    margin: f32,
}

impl Default for FramingCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl FramingCalculator {
    pub fn new(margin: f32) -> Self {
        Self { margin }
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn frame(&self, config: &FrameConfig) -> Result<OrthoView, Error> {
        let corners = config.resolved_corners()?;
        let height = config.render_height;
        if !height.is_finite() || height <= 0.0 {
            return Err(Error::InvalidFrame(format!(
                "render height must be positive, got {height}"
            )));
        }

        check_distinct(&corners)?;
        check_not_collinear(&corners)?;

        let bounds = WorldBox::from_points(corners.iter());
        let extent = bounds.size();
        // width along x, depth along z: the footprint the camera looks down on
        if extent.width <= DEGENERATE_EPSILON || extent.depth <= DEGENERATE_EPSILON {
            return Err(Error::InvalidFrame(format!(
                "corners span a zero-area ground footprint ({} x {})",
                extent.width, extent.depth
            )));
        }

        let half_extent = extent.width.max(extent.depth) / 2.0 + self.margin;
        let sum = corners
            .iter()
            .fold(WorldVector::zero(), |acc, p| acc + p.to_vector());
        let target = (sum / corners.len() as f32).to_point();
        let position = target + vector(0.0, height, 0.0);

        Ok(OrthoView { position, target, half_extent, near: NEAR_CLIP, far: height * 2.0 })
    }
}

fn check_distinct(corners: &[WorldPoint; 4]) -> Result<(), Error> {
    for i in 0..corners.len() {
        for j in (i + 1)..corners.len() {
            if (corners[i] - corners[j]).square_length() <= DEGENERATE_EPSILON {
                return Err(Error::InvalidFrame(format!("corners #{i} and #{j} coincide")));
            }
        }
    }
    Ok(())
}

fn check_not_collinear(corners: &[WorldPoint; 4]) -> Result<(), Error> {
    let origin = corners[0];
    let spans_area = corners[1..].iter().enumerate().any(|(i, a)| {
        corners[i + 2..].iter().any(|b| {
            (*a - origin).cross(*b - origin).square_length() > DEGENERATE_EPSILON
        })
    });
    if spans_area {
        Ok(())
    } else {
        Err(Error::InvalidFrame("corners are collinear".into()))
    }
}
