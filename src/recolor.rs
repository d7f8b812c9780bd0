// Solid-fill recolor of one captured layer.
// Visual: with a flat color every drawn pixel of the element turns that color; the
// background is always wiped to clear so stray clear-color pixels never reach the outline pass.

use serde::{Deserialize, Serialize};

use crate::types::{PixelBuffer, Rgba};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecolorMode {
    /// Keep whatever the renderer produced.
    #[default]
    UseSourceTexture,
    /// Paint every drawn pixel with the element's flat color.
    UseFlatColor,
}

/// Recolor `src` according to `mode`.
///
/// Flat-color pixels keep their original alpha so anti-aliased edges stay soft.
pub fn recolor(src: &PixelBuffer, mode: RecolorMode, flat: Rgba) -> PixelBuffer {
    src.map(|p| {
        if !p.is_painted() {
            return Rgba::TRANSPARENT;
        }
        match mode {
            RecolorMode::UseSourceTexture => p,
            RecolorMode::UseFlatColor => flat.with_alpha(p.a),
        }
    })
}
