// Writes the finished map somewhere. The pipeline only sees the `MapSink` trait;
// `PngExporter` is the file-backed implementation.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, ImageFormat, Rgba as ImageRgba, RgbaImage};
use log::info;

use crate::error::Error;
use crate::types::PixelBuffer;

/// Persistence capability: receives the final map once per successful run.
pub trait MapSink {
    fn save(&mut self, map: &PixelBuffer, name: &str) -> Result<(), Error>;
}

/// Convert a float map to 8-bit RGBA, clamping each channel into [0,1] first.
pub fn to_rgba8(map: &PixelBuffer) -> Result<RgbaImage, Error> {
    let too_big = |_| Error::InvalidExport(format!("{} is too large to encode", map.size()));
    let w = u32::try_from(map.width()).map_err(too_big)?;
    let h = u32::try_from(map.height()).map_err(too_big)?;
    let pixels = map.pixels();

    Ok(ImageBuffer::from_fn(w, h, |x, y| {
        let p = pixels[y as usize * map.width() + x as usize].clamped();
        ImageRgba([quantize(p.r), quantize(p.g), quantize(p.b), quantize(p.a)])
    }))
}

#[inline]
fn quantize(c: f32) -> u8 {
    (c * 255.0).round() as u8
}

/// Saves maps as `<dir>/<name>.png`.
#[derive(Clone, Debug)]
pub struct PngExporter {
    dir: PathBuf,
}

impl PngExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.png"))
    }

    fn write(img: &RgbaImage, part: &Path, path: &Path) -> Result<(), Error> {
        img.save_with_format(part, ImageFormat::Png)?;
        fs::rename(part, path)?;
        Ok(())
    }
}

impl MapSink for PngExporter {
    fn save(&mut self, map: &PixelBuffer, name: &str) -> Result<(), Error> {
        let img = to_rgba8(map)?;
        let path = self.path_for(name);
        // write next to the target, then move into place: no half-written map on failure
        let part = self.dir.join(format!("{name}.png.part"));
        if let Err(err) = Self::write(&img, &part, &path) {
            let _ = fs::remove_file(&part);
            return Err(err);
        }
        info!("{} was created.", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgba;

    #[test]
    fn quantizes_and_clamps_channels() {
        let mut map = PixelBuffer::new(2, 1);
        map.set(0, 0, Rgba::new(1.0, 0.5, 0.0, 1.0)).unwrap();
        map.set(1, 0, Rgba::new(2.5, -1.0, 0.2, 3.0)).unwrap();
        let img = to_rgba8(&map).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255, 128, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [255, 0, 51, 255]);
    }

    #[test]
    fn png_exporter_writes_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = PngExporter::new(dir.path());
        let mut map = PixelBuffer::new(3, 2);
        map.set(2, 1, Rgba::new(0.0, 0.0, 1.0, 1.0)).unwrap();

        exporter.save(&map, "island").unwrap();

        let path = dir.path().join("island.png");
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [0, 0, 255, 255]);
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert!(!dir.path().join("island.png.part").exists());
    }

    #[test]
    fn failed_save_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = PngExporter::new(dir.path().join("missing"));
        let map = PixelBuffer::new(1, 1);
        assert!(exporter.save(&map, "island").is_err());
        assert!(!exporter.path_for("island").exists());
    }
}
