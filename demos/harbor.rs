// Harbor demo scene, shared by the demo binary and the integration tests.
// Visual: open water with a round island to the west, a pier running east into a lighthouse.

use ortho_map::Rgba;
use ortho_map::scene::{Footprint, SceneObject, SoftwareScene};

pub const CONFIG: &str = include_str!("harbor.json");

pub const ISLAND: Rgba = Rgba::new(0.25, 0.6, 0.25, 1.0);
pub const SAND: Rgba = Rgba::new(0.95, 0.85, 0.55, 1.0);

pub fn scene() -> SoftwareScene {
    let mut clouds = SceneObject::new("clouds", Footprint::Disc { center: (0.0, 0.0), radius: 30.0 }, Rgba::WHITE);
    // not part of the capture: hidden, like scenery switched off before capturing
    clouds.visible = false;

    SoftwareScene::new(vec![
        SceneObject::new(
            "water",
            Footprint::Rect { min: (-21.0, -21.0), max: (21.0, 21.0) },
            Rgba::new(0.12, 0.35, 0.6, 1.0),
        ),
        SceneObject::new("island", Footprint::Disc { center: (-6.0, 4.0), radius: 9.0 }, ISLAND),
        SceneObject::new(
            "pier",
            Footprint::Rect { min: (2.0, 2.5), max: (14.0, 4.5) },
            Rgba::new(0.5, 0.5, 0.5, 1.0),
        ),
        SceneObject::new("lighthouse", Footprint::Disc { center: (14.0, 3.5), radius: 1.5 }, Rgba::WHITE),
        clouds,
    ])
}
