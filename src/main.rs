// Demo: capture a small harbor scene into `harbor_map.png` in the working directory.
// What you SEE afterwards: a 256x256 top-down map. The island is ringed with sand,
// the pier and lighthouse are flat-colored with outlines, and the water fills the rest.
// Set RUST_LOG=debug to watch each stage.

use futures::executor::block_on;
use log::info;

use ortho_map::{CaptureConfig, Error, Pipeline, PngExporter, Rgba};

#[path = "../demos/harbor.rs"]
mod harbor;

fn main() -> Result<(), Error> {
    env_logger::init();

    /* --- Configuration + scene ---
       Visual: nothing yet; the scene only exists in memory. */
    let config = CaptureConfig::from_json(harbor::CONFIG)?;
    let mut scene = harbor::scene();
    let mut exporter = PngExporter::new(".");
    let map_path = exporter.path_for(&config.export.file_name);

    /* --- Capture ---
       Visual: each element is rendered alone, then everything is stacked into the map. */
    let pipeline = Pipeline::new(config);
    let output = block_on(pipeline.capture(&mut scene, &mut exporter))?;

    let count = |color: Rgba| output.map.pixels().iter().filter(|&&p| p == color).count();
    info!(
        "{} painted pixels in a {} map at {} ({} island, {} beach)",
        output.map.painted_count(),
        output.map.size(),
        map_path.display(),
        count(harbor::ISLAND),
        count(harbor::SAND)
    );
    Ok(())
}
