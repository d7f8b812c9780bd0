// Outline ring around the drawn parts of a layer (square / Chebyshev dilation).
// Visual: every clear pixel within `width` pixels (horizontally, vertically or diagonally)
// of something drawn becomes the outline color, so each shape gets a hard border.

use crate::types::{PixelBuffer, Rgba};

/// Offsets of the square neighborhood `[-r, r] x [-r, r]`, row by row.
/// `r` saturates at `i32::MAX`; callers outlining a buffer cap it with [`reach_cap`] first.
pub fn neighborhood(width: u32) -> Vec<(i32, i32)> {
    let r = i32::try_from(width).unwrap_or(i32::MAX);
    let side = (r as usize).checked_mul(2).and_then(|d| d.checked_add(1));
    let capacity = side.and_then(|s| s.checked_mul(s)).unwrap_or(0);
    let mut offsets = Vec::with_capacity(capacity);
    for dy in -r..=r {
        for dx in -r..=r {
            offsets.push((dx, dy));
        }
    }
    offsets
}

/// Outline `src` with a ring `width` pixels wide.
///
/// Two sliding-window passes (rows, then columns) over a coverage mask, so the cost
/// does not grow with `width`. Output is identical to [`outline_naive`].
pub fn outline(src: &PixelBuffer, color: Rgba, width: u32) -> PixelBuffer {
    if width == 0 {
        return src.clone();
    }
    let w = src.width();
    let h = src.height();
    let r = width.min(reach_cap(src)) as usize;
    let covered: Vec<bool> = src.pixels().iter().map(Rgba::is_painted).collect();

    /* ---- Pass 1: Horizontal (any coverage within r along the row) ---- */
    let mut rows = vec![false; covered.len()];
    for y in 0..h {
        let ofs = y * w;
        dilate_line(w, r, |x| covered[ofs + x], |x, hit| rows[ofs + x] = hit);
    }

    /* ---- Pass 2: Vertical over the row result ---- */
    let mut reach = vec![false; covered.len()];
    for x in 0..w {
        dilate_line(h, r, |y| rows[y * w + x], |y, hit| reach[y * w + x] = hit);
    }

    paint_ring(src, color, |idx| reach[idx])
}

/// Outline by scanning each clear pixel's full neighborhood in row order.
pub fn outline_naive(src: &PixelBuffer, color: Rgba, width: u32) -> PixelBuffer {
    if width == 0 {
        return src.clone();
    }
    outline_with_scan_order(src, color, &neighborhood(width.min(reach_cap(src))))
}

/// Largest ring width that can still change `src`: no pixel is further than
/// `max(width, height)` from any other, so wider rings paint the same pixels.
pub fn reach_cap(src: &PixelBuffer) -> u32 {
    u32::try_from(src.width().max(src.height())).unwrap_or(u32::MAX)
}

/// Outline using an explicit neighborhood `offsets` list, visited in the given order.
///
/// The test is pure existence ("is any neighbor drawn?"), so stopping at the first hit
/// gives the same answer for every ordering of the same offsets.
pub fn outline_with_scan_order(src: &PixelBuffer, color: Rgba, offsets: &[(i32, i32)]) -> PixelBuffer {
    let w = src.width() as i64;
    let h = src.height() as i64;
    let pixels = src.pixels();

    paint_ring(src, color, |idx| {
        let x = (idx as i64) % w;
        let y = (idx as i64) / w;
        offsets.iter().any(|&(dx, dy)| {
            let nx = x + dx as i64;
            let ny = y + dy as i64;
            // clipped to the buffer, never wrapped
            nx >= 0 && ny >= 0 && nx < w && ny < h && pixels[(ny * w + nx) as usize].is_painted()
        })
    })
}

/// Copy `src`, turning clear pixels for which `near_coverage(index)` holds into `color`
/// at full alpha. Drawn pixels pass through untouched.
fn paint_ring(src: &PixelBuffer, color: Rgba, near_coverage: impl Fn(usize) -> bool) -> PixelBuffer {
    let ring = color.with_alpha(1.0);
    let pixels = src
        .pixels()
        .iter()
        .enumerate()
        .map(|(idx, &p)| if !p.is_painted() && near_coverage(idx) { ring } else { p })
        .collect();
    src.with_pixels(pixels)
}

/// 1-D dilation of length `len` with radius `r`: `set(i, true)` when any of
/// `[i - r, i + r]` (clipped) is covered.
fn dilate_line(len: usize, r: usize, covered: impl Fn(usize) -> bool, mut set: impl FnMut(usize, bool)) {
    // Prime the window [0..r]
    let mut count = (0..(r + 1).min(len)).filter(|&i| covered(i)).count();

    // Slide: drop i - r, add i + r + 1
    for i in 0..len {
        set(i, count > 0);
        if i >= r && covered(i - r) {
            count -= 1;
        }
        if i + r + 1 < len && covered(i + r + 1) {
            count += 1;
        }
    }
}
