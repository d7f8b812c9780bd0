// The capture run, start to finish:
//   validate -> frame the camera -> capture every element -> recolor -> outline
//   -> composite -> hand the map to the sink.
// What you get: one map image combining every element, or an error and an untouched scene.

use std::sync::{Mutex, MutexGuard};

use log::{debug, info, warn};

use crate::capture::{ElementRenderer, RenderBackend};
use crate::composite::composite;
use crate::config::{CaptureConfig, ElementSpec};
use crate::error::{Error, ErrorKind};
use crate::export::MapSink;
use crate::framing::FramingCalculator;
use crate::outline::outline;
use crate::recolor::recolor;
use crate::types::PixelBuffer;

/// Where a run currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Framing,
    Capturing,
    Recoloring,
    Outlining,
    Compositing,
    Done,
    Failed(ErrorKind),
}

impl PipelineState {
    /// True while a run owns the camera and the element buffers.
    pub fn is_active(&self) -> bool {
        !matches!(self, PipelineState::Idle | PipelineState::Done | PipelineState::Failed(_))
    }
}

/// Which stage produced an `ElementResult`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Captured,
    Recolored,
    Outlined,
}

/// One element's layer after a given stage. Each stage builds a new result
/// instead of editing the previous one.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementResult {
    pub index: usize,
    pub stage: Stage,
    pub buffer: PixelBuffer,
}

impl ElementResult {
    fn captured(index: usize, buffer: PixelBuffer) -> Self {
        Self { index, stage: Stage::Captured, buffer }
    }

    fn next(&self, stage: Stage, buffer: PixelBuffer) -> Self {
        Self { index: self.index, stage, buffer }
    }
}

/// What a successful run returns.
#[derive(Clone, Debug)]
pub struct CaptureOutput {
    pub map: PixelBuffer,
    /// Every stage's per-element results, in stage then element order.
    /// Empty unless `retain_intermediates` is set.
    pub intermediates: Vec<ElementResult>,
}

impl CaptureOutput {
    pub fn stage(&self, stage: Stage) -> impl Iterator<Item = &ElementResult> {
        self.intermediates.iter().filter(move |r| r.stage == stage)
    }
}

/// Recolor every captured layer with its element's settings.
pub fn recolor_all(elements: &[ElementSpec], captured: &[ElementResult]) -> Vec<ElementResult> {
    captured
        .iter()
        .zip(elements)
        .map(|(res, el)| res.next(Stage::Recolored, recolor(&res.buffer, el.recolor, el.flat_color)))
        .collect()
}

/// Outline every layer with its element's width and color (width 0 copies).
pub fn outline_all(elements: &[ElementSpec], recolored: &[ElementResult]) -> Vec<ElementResult> {
    recolored
        .iter()
        .zip(elements)
        .map(|(res, el)| res.next(Stage::Outlined, outline(&res.buffer, el.outline_color, el.outline_width)))
        .collect()
}

/// Runs captures for one configuration. At most one run is active at a time.
#[derive(Debug)]
pub struct Pipeline {
    config: CaptureConfig,
    framer: FramingCalculator,
    state: Mutex<PipelineState>,
}

/// Marks a run active for its lifetime; dropping it without `finish` (an abandoned
/// run) puts the pipeline back to `Idle`.
struct ActiveRun<'p> {
    state: &'p Mutex<PipelineState>,
    finished: bool,
}

impl<'p> ActiveRun<'p> {
    fn start(state: &'p Mutex<PipelineState>) -> Result<Self, Error> {
        let mut current = lock(state);
        if current.is_active() {
            return Err(Error::AlreadyCapturing);
        }
        *current = PipelineState::Framing;
        Ok(Self { state, finished: false })
    }

    fn enter(&self, next: PipelineState) {
        debug!("pipeline: {next:?}");
        *lock(self.state) = next;
    }

    fn finish(mut self, last: PipelineState) {
        self.finished = true;
        *lock(self.state) = last;
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("capture run abandoned");
            *lock(self.state) = PipelineState::Idle;
        }
    }
}

fn lock(state: &Mutex<PipelineState>) -> MutexGuard<'_, PipelineState> {
    // the state is a plain enum; a poisoned lock still holds a usable value
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Pipeline {
    pub fn new(config: CaptureConfig) -> Self {
        let framer = FramingCalculator::new(config.framing_margin);
        Self { config, framer, state: Mutex::new(PipelineState::Idle) }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        *lock(&self.state)
    }

    pub fn is_capturing(&self) -> bool {
        self.state().is_active()
    }

    /// Run one capture against `backend` and hand the map to `sink`.
    ///
    /// Rejected with `AlreadyCapturing` (touching nothing) while another run is active.
    /// Every other check runs before the first render. Whatever happens, the backend's
    /// visibility is restored and its camera released before this returns.
    pub async fn capture<B: RenderBackend, S: MapSink>(
        &self,
        backend: &mut B,
        sink: &mut S,
    ) -> Result<CaptureOutput, Error> {
        let run = ActiveRun::start(&self.state)?;
        info!("start capturing {} element(s)...", self.config.elements.len());

        match self.execute(&run, backend, sink).await {
            Ok(output) => {
                info!("capture finished");
                run.finish(PipelineState::Done);
                Ok(output)
            }
            Err(err) => {
                warn!("capture failed: {err}");
                run.finish(PipelineState::Failed(err.kind()));
                Err(err)
            }
        }
    }

    async fn execute<B: RenderBackend, S: MapSink>(
        &self,
        run: &ActiveRun<'_>,
        backend: &mut B,
        sink: &mut S,
    ) -> Result<CaptureOutput, Error> {
        let config = &self.config;
        let elements = &config.elements;

        config.validate()?;
        let view = self.framer.frame(&config.corners)?;
        ElementRenderer::resolve(backend, elements)?;
        debug!(
            "camera at {:?}, half extent {}, output {}",
            view.position, view.half_extent, config.output_size
        );

        run.enter(PipelineState::Capturing);
        let raw = ElementRenderer::new(&view, config.output_size)
            .capture_all(backend, elements)
            .await?;
        let captured: Vec<ElementResult> = raw
            .into_iter()
            .enumerate()
            .map(|(index, buffer)| ElementResult::captured(index, buffer))
            .collect();

        run.enter(PipelineState::Recoloring);
        let recolored = recolor_all(elements, &captured);

        run.enter(PipelineState::Outlining);
        let outlined = outline_all(elements, &recolored);

        run.enter(PipelineState::Compositing);
        let layers: Vec<PixelBuffer> = outlined.iter().map(|r| r.buffer.clone()).collect();
        let map = composite(&layers, config.output_size, config.blend_policy)?;
        sink.save(&map, &config.export.file_name)?;

        let intermediates = if config.retain_intermediates {
            captured.into_iter().chain(recolored).chain(outlined).collect()
        } else {
            Vec::new()
        };
        Ok(CaptureOutput { map, intermediates })
    }
}
