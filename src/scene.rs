// A tiny software "scene": flat footprints on the ground plane, drawn top-down.
// It implements `RenderBackend` so the pipeline can be run without a real engine.
// Visual: each object is a solid rectangle or disc seen from directly above; nothing is shaded.

use std::future::Future;

use crate::capture::RenderBackend;
use crate::config::ObjectHandle;
use crate::error::Error;
use crate::framing::OrthoView;
use crate::types::{OutputSize, PixelBuffer, Rgba};

/// Shape of an object on the ground plane, in world (x, z) units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Footprint {
    Rect { min: (f32, f32), max: (f32, f32) },
    Disc { center: (f32, f32), radius: f32 },
}

impl Footprint {
    #[inline]
    fn contains(&self, x: f32, z: f32) -> bool {
        match *self {
            Footprint::Rect { min, max } => x >= min.0 && x <= max.0 && z >= min.1 && z <= max.1,
            Footprint::Disc { center, radius } => {
                let dx = x - center.0;
                let dz = z - center.1;
                dx * dx + dz * dz <= radius * radius
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneObject {
    pub handle: ObjectHandle,
    pub footprint: Footprint,
    pub color: Rgba,
    pub visible: bool,
}

impl SceneObject {
    pub fn new(name: &str, footprint: Footprint, color: Rgba) -> Self {
        Self { handle: ObjectHandle::new(name), footprint, color, visible: true }
    }
}

/// Software render backend over a list of `SceneObject`s.
#[derive(Debug, Default)]
pub struct SoftwareScene {
    objects: Vec<SceneObject>,
    /// Scene indices of the objects being captured, in capture order.
    capture_set: Vec<usize>,
    /// Visibility of every object when the capture began.
    saved_visibility: Option<Vec<bool>>,
    camera: Option<OrthoView>,
    /// Visibility of every object at each render, for inspection.
    render_log: Vec<Vec<bool>>,
    fail_at: Option<usize>,
}

impl SoftwareScene {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self { objects, ..Default::default() }
    }

    /// Make the render of capture index `index` fail (exercises abort handling).
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn visibility(&self) -> Vec<bool> {
        self.objects.iter().map(|o| o.visible).collect()
    }

    pub fn set_visible(&mut self, name: &str, visible: bool) {
        if let Some(obj) = self.objects.iter_mut().find(|o| o.handle.name() == name) {
            obj.visible = visible;
        }
    }

    pub fn render_log(&self) -> &[Vec<bool>] {
        &self.render_log
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    fn index_of(&self, handle: &ObjectHandle) -> Option<usize> {
        self.objects.iter().position(|o| &o.handle == handle)
    }

    fn render_now(&mut self, visible: usize, view: &OrthoView, size: OutputSize) -> Result<PixelBuffer, Error> {
        if self.camera.is_none() {
            return Err(Error::Render { index: visible, message: "no capture camera".into() });
        }
        let &target = self.capture_set.get(visible).ok_or_else(|| Error::Render {
            index: visible,
            message: "index outside the capture set".into(),
        })?;
        if self.fail_at == Some(visible) {
            return Err(Error::Render { index: visible, message: "simulated render failure".into() });
        }

        self.objects[target].visible = true;
        self.render_log.push(self.visibility());
        let layer = self.rasterize(view, size);
        self.objects[target].visible = false;
        layer
    }

    /// Draw every visible object, later objects over earlier ones.
    fn rasterize(&self, view: &OrthoView, size: OutputSize) -> Result<PixelBuffer, Error> {
        let visible: Vec<&SceneObject> = self.objects.iter().filter(|o| o.visible).collect();
        let pixels = (0..size.pixel_count())
            .map(|idx| {
                let (x, z) = view.pixel_to_ground(idx % size.width, idx / size.width, size);
                visible
                    .iter()
                    .rev()
                    .find(|o| o.footprint.contains(x, z))
                    .map_or(Rgba::TRANSPARENT, |o| o.color)
            })
            .collect();
        PixelBuffer::from_pixels(size.width, size.height, pixels)
    }
}

impl RenderBackend for SoftwareScene {
    fn resolves(&self, handle: &ObjectHandle) -> bool {
        self.index_of(handle).is_some()
    }

    fn begin_capture(&mut self, objects: &[ObjectHandle], view: &OrthoView) -> Result<(), Error> {
        let capture_set = objects
            .iter()
            .enumerate()
            .map(|(index, h)| self.index_of(h).ok_or(Error::MissingRenderable { index }))
            .collect::<Result<Vec<_>, _>>()?;

        self.saved_visibility = Some(self.visibility());
        for &i in &capture_set {
            self.objects[i].visible = false;
        }
        self.capture_set = capture_set;
        self.camera = Some(*view);
        Ok(())
    }

    fn render(
        &mut self,
        visible: usize,
        view: &OrthoView,
        size: OutputSize,
    ) -> impl Future<Output = Result<PixelBuffer, Error>> {
        // software rendering finishes immediately; the frame wait lives in the caller
        std::future::ready(self.render_now(visible, view, size))
    }

    fn end_capture(&mut self) {
        if let Some(saved) = self.saved_visibility.take() {
            for (obj, visible) in self.objects.iter_mut().zip(saved) {
                obj.visible = visible;
            }
        }
        self.capture_set.clear();
        self.camera = None;
    }
}
