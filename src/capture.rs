// Renders each element on its own, one per frame, through an external render backend.
// What you get back: one raw layer per element, in the same order as the elements.
// Only one element is ever visible while the camera renders; the backend owns the
// actual show/hide flags and restores them when the session ends.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use log::debug;

use crate::config::{ElementSpec, ObjectHandle};
use crate::error::Error;
use crate::framing::OrthoView;
use crate::types::{OutputSize, PixelBuffer};

/// The rendering collaborator: a scene that can be captured one object at a time.
pub trait RenderBackend {
    /// Whether `handle` names an object this backend can render.
    fn resolves(&self, handle: &ObjectHandle) -> bool;

    /// Remember current visibility, hide every object in `objects`, and set up a
    /// transient camera for `view`.
    fn begin_capture(&mut self, objects: &[ObjectHandle], view: &OrthoView) -> Result<(), Error>;

    /// Render with only `objects[visible]` shown, into an offscreen `size` buffer.
    /// The object is hidden again before the returned future completes.
    fn render(
        &mut self,
        visible: usize,
        view: &OrthoView,
        size: OutputSize,
    ) -> impl Future<Output = Result<PixelBuffer, Error>>;

    /// Restore visibility saved by `begin_capture` and release the camera.
    fn end_capture(&mut self);
}

/// One-shot cooperative yield: pending once, then ready.
/// Stands in for "wait for the next rendered frame".
#[derive(Debug, Default)]
pub struct NextFrame {
    yielded: bool,
}

impl Future for NextFrame {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

pub fn next_frame() -> NextFrame {
    NextFrame::default()
}

/// Ends the backend's capture session when dropped, whether the capture finished,
/// failed, or its future was dropped half-way.
struct CaptureSession<'b, B: RenderBackend> {
    backend: &'b mut B,
}

impl<'b, B: RenderBackend> CaptureSession<'b, B> {
    fn begin(backend: &'b mut B, objects: &[ObjectHandle], view: &OrthoView) -> Result<Self, Error> {
        backend.begin_capture(objects, view)?;
        Ok(Self { backend })
    }
}

impl<B: RenderBackend> Drop for CaptureSession<'_, B> {
    fn drop(&mut self) {
        self.backend.end_capture();
    }
}

/// Captures a list of elements from one camera view.
#[derive(Clone, Copy, Debug)]
pub struct ElementRenderer<'v> {
    view: &'v OrthoView,
    size: OutputSize,
}

impl<'v> ElementRenderer<'v> {
    pub fn new(view: &'v OrthoView, size: OutputSize) -> Self {
        Self { view, size }
    }

    /// Every element's handle, or `MissingRenderable` for the first one that is unset
    /// or unknown to `backend`. Nothing is rendered.
    pub fn resolve<B: RenderBackend>(backend: &B, elements: &[ElementSpec]) -> Result<Vec<ObjectHandle>, Error> {
        elements
            .iter()
            .enumerate()
            .map(|(index, element)| match &element.object {
                Some(handle) if backend.resolves(handle) => Ok(handle.clone()),
                _ => Err(Error::MissingRenderable { index }),
            })
            .collect()
    }

    /// Capture every element in order, one frame each.
    pub async fn capture_all<B: RenderBackend>(
        &self,
        backend: &mut B,
        elements: &[ElementSpec],
    ) -> Result<Vec<PixelBuffer>, Error> {
        let handles = Self::resolve(backend, elements)?;
        let mut session = CaptureSession::begin(backend, &handles, self.view)?;

        let mut raw = Vec::with_capacity(handles.len());
        for (index, handle) in handles.iter().enumerate() {
            debug!("capturing {handle}...");
            let layer = session.backend.render(index, self.view, self.size).await?;
            if layer.size() != self.size {
                return Err(Error::SizeMismatch { expected: self.size, actual: layer.size() });
            }
            raw.push(layer);
            // frame boundary before the next element is shown
            next_frame().await;
        }

        drop(session);
        Ok(raw)
    }
}
