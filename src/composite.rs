// Merges the per-element layers into the final map.
// Visual: Blend makes overlapping colors add up (they can get brighter than white);
// OverlapOrdered lets the earliest layer in the list sit on top.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{OutputSize, PixelBuffer, Rgba};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendPolicy {
    /// Straight additive sum of every layer, unclamped.
    Blend,
    /// First layer (in list order) with alpha > 0 wins.
    #[default]
    OverlapOrdered,
}

/// Composite `layers` into one `size` buffer under `policy`.
///
/// Every layer must be exactly `size`, else [`Error::SizeMismatch`]. The order of
/// `layers` decides the result for `OverlapOrdered`.
pub fn composite(layers: &[PixelBuffer], size: OutputSize, policy: BlendPolicy) -> Result<PixelBuffer, Error> {
    if let Some(bad) = layers.iter().find(|l| l.size() != size) {
        return Err(Error::SizeMismatch { expected: size, actual: bad.size() });
    }

    let pixels = (0..size.pixel_count())
        .map(|idx| {
            let mut stack = layers.iter().map(|l| l.pixels()[idx]);
            match policy {
                BlendPolicy::Blend => stack.fold(Rgba::TRANSPARENT, |acc, p| acc + p),
                BlendPolicy::OverlapOrdered => stack.find(Rgba::is_painted).unwrap_or(Rgba::TRANSPARENT),
            }
        })
        .collect();

    PixelBuffer::from_pixels(size.width, size.height, pixels)
}
