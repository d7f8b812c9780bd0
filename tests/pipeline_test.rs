use std::pin::pin;

use futures::executor::block_on;
use futures::poll;

use ortho_map::geom::point;
use ortho_map::scene::{Footprint, SceneObject, SoftwareScene};
use ortho_map::{
    BlendPolicy, CaptureConfig, ElementSpec, Error, ExportSettings, FrameConfig, MapSink,
    ObjectHandle, OutputSize, PixelBuffer, Pipeline, PipelineState, PngExporter, Rgba, Stage,
};

#[path = "../demos/harbor.rs"]
mod harbor;

const RED: Rgba = Rgba::new(1.0, 0.0, 0.0, 1.0);
const GREEN: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
const BLUE: Rgba = Rgba::new(0.0, 0.0, 1.0, 1.0);

#[derive(Default)]
struct Saved(Vec<(String, PixelBuffer)>);

impl MapSink for Saved {
    fn save(&mut self, map: &PixelBuffer, name: &str) -> Result<(), Error> {
        self.0.push((name.to_string(), map.clone()));
        Ok(())
    }
}

/// 10x10 square at height 5: with the default margin the camera sees 12x12 world
/// units, so a 12x12 map has one pixel per unit and pixel x covers world x in
/// [px - 6, px - 5].
fn frame() -> FrameConfig {
    FrameConfig::new(
        point(5.0, 0.0, 5.0),
        point(-5.0, 0.0, 5.0),
        point(5.0, 0.0, -5.0),
        point(-5.0, 0.0, -5.0),
        5.0,
    )
}

/// A spans pixel columns 3..=6, B spans 5..=8; both span rows 4..=7.
fn scene() -> SoftwareScene {
    let mut tree = SceneObject::new("tree", Footprint::Disc { center: (-4.0, 4.0), radius: 0.5 }, GREEN);
    tree.visible = false;
    SoftwareScene::new(vec![
        SceneObject::new("a", Footprint::Rect { min: (-3.0, -2.0), max: (1.0, 2.0) }, RED),
        SceneObject::new("b", Footprint::Rect { min: (-1.0, -2.0), max: (3.0, 2.0) }, GREEN),
        tree,
    ])
}

fn element_a() -> ElementSpec {
    ElementSpec::new(ObjectHandle::new("a"))
        .with_flat_color(BLUE)
        .with_outline(1, Rgba::BLACK)
}

fn element_b() -> ElementSpec {
    ElementSpec::new(ObjectHandle::new("b"))
}

fn config(elements: Vec<ElementSpec>, policy: BlendPolicy) -> CaptureConfig {
    CaptureConfig::new(elements, frame(), OutputSize::square(12), policy, ExportSettings::new("map"))
}

#[test]
fn overlap_ordered_end_to_end() {
    let mut cfg = config(vec![element_a(), element_b()], BlendPolicy::OverlapOrdered);
    cfg.retain_intermediates = true;
    let pipeline = Pipeline::new(cfg);
    let mut scene = scene();
    let mut sink = Saved::default();

    let out = block_on(pipeline.capture(&mut scene, &mut sink)).unwrap();
    let map = &out.map;

    // opaque in both raw captures: A is first and flat blue
    assert_eq!(map.get(5, 5).unwrap(), BLUE);
    // opaque only in B, outside A's ring: B's source color
    assert_eq!(map.get(8, 5).unwrap(), GREEN);
    // A's ring sits on top of B as well
    assert_eq!(map.get(7, 5).unwrap(), Rgba::BLACK);
    // clear in both
    assert_eq!(map.get(0, 0).unwrap(), Rgba::TRANSPARENT);
    assert_eq!(map.get(11, 11).unwrap(), Rgba::TRANSPARENT);

    // raw captures are still the renderer's colors
    let raw: Vec<_> = out.stage(Stage::Captured).collect();
    assert_eq!(raw[0].buffer.get(5, 5).unwrap(), RED);
    assert_eq!(raw[1].buffer.get(5, 5).unwrap(), GREEN);

    // exactly one element was visible per render; the untagged tree stayed hidden
    assert_eq!(scene.render_log(), [vec![true, false, false], vec![false, true, false]]);
    assert_eq!(scene.visibility(), [true, true, false]);
    assert!(!scene.has_camera());

    assert_eq!(sink.0.len(), 1);
    assert_eq!(sink.0[0].0, "map");
    assert_eq!(pipeline.state(), PipelineState::Done);
}

#[test]
fn element_order_decides_overlap() {
    let a_first = Pipeline::new(config(vec![element_a(), element_b()], BlendPolicy::OverlapOrdered));
    let b_first = Pipeline::new(config(vec![element_b(), element_a()], BlendPolicy::OverlapOrdered));

    let one = block_on(a_first.capture(&mut scene(), &mut Saved::default())).unwrap();
    let two = block_on(b_first.capture(&mut scene(), &mut Saved::default())).unwrap();

    assert_eq!(one.map.get(5, 5).unwrap(), BLUE);
    assert_eq!(two.map.get(5, 5).unwrap(), GREEN);
    assert_ne!(one.map, two.map);
}

#[test]
fn blend_policy_adds_overlaps() {
    let pipeline = Pipeline::new(config(
        vec![ElementSpec::new(ObjectHandle::new("a")), element_b()],
        BlendPolicy::Blend,
    ));
    let out = block_on(pipeline.capture(&mut scene(), &mut Saved::default())).unwrap();

    assert_eq!(out.map.get(5, 5).unwrap(), Rgba::new(1.0, 1.0, 0.0, 2.0));
    assert_eq!(out.map.get(3, 5).unwrap(), RED);
    assert_eq!(out.map.get(8, 5).unwrap(), GREEN);
    assert!(out.intermediates.is_empty());
}

#[test]
fn second_run_is_rejected_while_one_is_active() {
    let pipeline = Pipeline::new(config(vec![element_a(), element_b()], BlendPolicy::OverlapOrdered));
    let mut first = scene();
    let mut second = scene();
    second.set_visible("tree", true);
    let second_before = second.visibility();
    let mut first_sink = Saved::default();
    let mut second_sink = Saved::default();

    let out = block_on(async {
        let mut run = pin!(pipeline.capture(&mut first, &mut first_sink));
        // suspended on the frame boundary after the first element
        assert!(poll!(run.as_mut()).is_pending());
        assert_eq!(pipeline.state(), PipelineState::Capturing);
        assert!(pipeline.is_capturing());

        let err = pipeline.capture(&mut second, &mut second_sink).await.unwrap_err();
        assert!(matches!(err, Error::AlreadyCapturing));
        assert_eq!(pipeline.state(), PipelineState::Capturing);

        run.await
    });

    assert!(out.is_ok());
    assert_eq!(second.visibility(), second_before);
    assert!(second.render_log().is_empty());
    assert!(!second.has_camera());
    assert!(second_sink.0.is_empty());
    assert_eq!(first_sink.0.len(), 1);
    assert_eq!(pipeline.state(), PipelineState::Done);
}

#[test]
fn abandoned_run_restores_the_scene() {
    let pipeline = Pipeline::new(config(vec![element_a(), element_b()], BlendPolicy::OverlapOrdered));
    let mut scene = scene();
    let before = scene.visibility();
    let mut sink = Saved::default();

    block_on(async {
        let mut run = Box::pin(pipeline.capture(&mut scene, &mut sink));
        assert!(poll!(run.as_mut()).is_pending());
        drop(run);
    });

    assert_eq!(pipeline.state(), PipelineState::Idle);
    assert_eq!(scene.visibility(), before);
    assert!(!scene.has_camera());
    assert_eq!(scene.render_log().len(), 1);
    assert!(sink.0.is_empty());

    // and the pipeline is usable again
    assert!(block_on(pipeline.capture(&mut scene, &mut sink)).is_ok());
}

#[test]
fn mid_run_render_failure_restores_visibility() {
    let pipeline = Pipeline::new(config(vec![element_a(), element_b()], BlendPolicy::OverlapOrdered));
    let mut scene = scene().fail_at(1);
    let before = scene.visibility();
    let mut sink = Saved::default();

    let err = block_on(pipeline.capture(&mut scene, &mut sink)).unwrap_err();

    assert!(matches!(err, Error::Render { index: 1, .. }));
    assert_eq!(scene.visibility(), before);
    assert!(!scene.has_camera());
    assert!(sink.0.is_empty());
    assert!(!pipeline.is_capturing());
}

#[test]
fn png_export_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config(vec![element_a(), element_b()], BlendPolicy::OverlapOrdered));
    let mut exporter = PngExporter::new(dir.path());

    block_on(pipeline.capture(&mut scene(), &mut exporter)).unwrap();

    let png = image::open(dir.path().join("map.png")).unwrap().to_rgba8();
    assert_eq!(png.dimensions(), (12, 12));
    assert_eq!(png.get_pixel(5, 5).0, [0, 0, 255, 255]);
    assert_eq!(png.get_pixel(8, 5).0, [0, 255, 0, 255]);
    assert_eq!(png.get_pixel(0, 0).0, [0, 0, 0, 0]);
}

#[test]
fn demo_config_loads_in_order() {
    let config = CaptureConfig::load(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/harbor.json")).unwrap();
    let names: Vec<_> = config.elements.iter().map(ElementSpec::label).collect();
    assert_eq!(names, ["pier", "lighthouse", "island", "water"]);
    assert_eq!(config.output_size, OutputSize::square(256));
    assert!(config.validate().is_ok());
}

#[test]
fn demo_map_shows_the_island_and_its_beach() {
    let config = CaptureConfig::from_json(harbor::CONFIG).unwrap();
    let pipeline = Pipeline::new(config);
    let out = block_on(pipeline.capture(&mut harbor::scene(), &mut Saved::default())).unwrap();

    let count = |color: Rgba| out.map.pixels().iter().filter(|&&p| p == color).count();
    assert!(count(harbor::ISLAND) > 1000, "island pixels: {}", count(harbor::ISLAND));
    assert!(count(harbor::SAND) > 100, "beach pixels: {}", count(harbor::SAND));
    // the water fills everything else, so nothing is left clear
    assert_eq!(out.map.painted_count(), out.map.pixels().len());
}
