//! One viewer session: the loaded hill, the viewport it is drawn into and the
//! pointer state on top of it.
//!
//! The session owns every derived value (transform, grid index, hover) and
//! rebuilds them whenever the model or the viewport is replaced, so queries
//! never run against a stale projection.

use serde::Serialize;
use thiserror::Error;

use crate::interaction::{HoverState, Inspector, InteractionController, PointerCoalescer};
use crate::mesh::{MeshError, MeshModel};
use crate::options::{OptionsError, ViewerOptions};
use crate::parse::{MeshPayload, ParseError, SoilMapPayload, model_from_payloads};
use crate::render::{Frame, RenderDiagnostics, Renderer, Surface};
use crate::spatial::{GridIndex, Locator};
use crate::view::{PixelPoint, Transform, Viewport};

/// Identifier the backend uses for a hillslope.
pub type HillId = u32;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("invalid viewer options: {0}")]
    Options(#[from] OptionsError),
    #[error("invalid payload: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// What happened to a load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome {
    Applied,
    /// The user picked another hill while this one was in flight.
    Discarded { requested: HillId, selected: HillId },
}

impl LoadOutcome {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug)]
pub struct Viewer {
    options: ViewerOptions,
    renderer: Renderer,
    selected: Option<HillId>,
    loaded: Option<HillId>,
    model: Option<MeshModel>,
    viewport: Viewport,
    transform: Option<Transform>,
    grid: Option<GridIndex>,
    interaction: InteractionController,
    coalescer: PointerCoalescer,
}

impl Viewer {
    pub fn new(options: ViewerOptions) -> Result<Self, ViewerError> {
        let renderer = options.renderer()?;
        let viewport = Viewport::with_padding(0.0, 0.0, options.padding);
        Ok(Self {
            options,
            renderer,
            selected: None,
            loaded: None,
            model: None,
            viewport,
            transform: None,
            grid: None,
            interaction: InteractionController::new(),
            coalescer: PointerCoalescer::default(),
        })
    }

    #[must_use]
    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Records the hill the user wants to see. Loads tagged with any other id
    /// are discarded from now on.
    pub fn select_hill(&mut self, hill_id: HillId) {
        if self.selected != Some(hill_id) {
            log::debug!("selected hill {hill_id}");
        }
        self.selected = Some(hill_id);
    }

    #[must_use]
    pub fn selected_hill(&self) -> Option<HillId> {
        self.selected
    }

    /// Hill whose model is currently shown.
    #[must_use]
    pub fn loaded_hill(&self) -> Option<HillId> {
        self.loaded
    }

    /// Staleness check only; selection changes happen once a load is applied.
    fn outcome_for(&self, hill_id: HillId) -> LoadOutcome {
        match self.selected {
            Some(selected) if selected != hill_id => {
                log::warn!("discarding stale load for hill {hill_id}, hill {selected} is selected");
                LoadOutcome::Discarded {
                    requested: hill_id,
                    selected,
                }
            }
            _ => LoadOutcome::Applied,
        }
    }

    /// Replaces the model with an already validated one. The first applied
    /// load selects its hill when none is selected yet.
    pub fn load(&mut self, hill_id: HillId, model: MeshModel) -> LoadOutcome {
        let outcome = self.outcome_for(hill_id);
        if outcome.is_applied() {
            log::debug!(
                "loaded hill {hill_id}: {}x{} nodes, {} elements",
                model.mesh().rows(),
                model.mesh().cols(),
                model.element_count()
            );
            self.selected.get_or_insert(hill_id);
            self.model = Some(model);
            self.loaded = Some(hill_id);
            self.rebuild();
        }
        outcome
    }

    /// Validates the payloads and loads them.
    ///
    /// Stale loads are discarded before validation. On a validation error
    /// nothing changes: the previous model and selection stay in place.
    pub fn load_payloads(
        &mut self,
        hill_id: HillId,
        mesh: &MeshPayload,
        soil_map: &SoilMapPayload,
    ) -> Result<LoadOutcome, ViewerError> {
        let outcome = self.outcome_for(hill_id);
        if !outcome.is_applied() {
            return Ok(outcome);
        }

        match model_from_payloads(mesh, soil_map) {
            Ok(model) => Ok(self.load(hill_id, model)),
            Err(err) => {
                log::warn!("rejected payload for hill {hill_id}, keeping previous model: {err}");
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub fn model(&self) -> Option<&MeshModel> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resizes the drawing area. Returns `true` when the size changed.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> bool {
        let viewport = Viewport::with_padding(width, height, self.options.padding);
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.rebuild();
        true
    }

    fn rebuild(&mut self) {
        self.coalescer.cancel();
        self.interaction.invalidate();

        let Some(model) = &self.model else {
            self.transform = None;
            self.grid = None;
            return;
        };

        let mesh = model.mesh();
        let transform = Transform::fit(mesh, self.viewport);
        self.grid = self
            .options
            .locator
            .uses_grid(mesh.node_count(), self.options.linear_scan_limit)
            .then(|| GridIndex::build(mesh, transform, self.options.tolerance_px));
        self.transform = Some(transform);
    }

    #[must_use]
    pub fn transform(&self) -> Option<Transform> {
        self.transform
    }

    /// Active nearest-node locator, once a model is loaded.
    #[must_use]
    pub fn locator(&self) -> Option<Locator<'_>> {
        let model = self.model.as_ref()?;
        let transform = self.transform?;
        Some(Locator::new(model.mesh(), transform, self.grid.as_ref()))
    }

    /// Display list for the current model and viewport.
    #[must_use]
    pub fn frame(&self) -> Option<Frame> {
        let model = self.model.as_ref()?;
        let transform = self.transform?;
        Some(self.renderer.frame(model, &transform, self.viewport))
    }

    /// Repaints everything. Without a model the surface is only cleared.
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<RenderDiagnostics, S::Error> {
        let frame = self
            .frame()
            .unwrap_or_else(|| self.renderer.blank_frame(self.viewport));
        let mut diagnostics = self.renderer.paint(&frame, surface)?;
        diagnostics.degenerate_viewport = self.viewport.is_degenerate();
        log::debug!(
            "rendered hill {:?}: {} elements, {} categories",
            self.loaded,
            diagnostics.element_count,
            diagnostics.category_count
        );
        Ok(diagnostics)
    }

    /// Registers a hover observer; it receives `None` when the hover clears.
    pub fn on_hover_change<F>(&mut self, observer: F)
    where
        F: FnMut(Option<&HoverState>) + 'static,
    {
        self.interaction.on_hover_change(observer);
    }

    /// Runs a hover query right away. Returns `true` when observers were notified.
    pub fn pointer_move(&mut self, pixel: PixelPoint) -> bool {
        let (Some(model), Some(transform)) = (&self.model, self.transform) else {
            return self.interaction.pointer_leave();
        };
        let locator = Locator::new(model.mesh(), transform, self.grid.as_ref());
        self.interaction
            .pointer_move(pixel, &locator, model, self.options.tolerance_px)
    }

    /// Queues a move for [`Viewer::flush_pointer`]. Returns `true` when the
    /// caller should schedule a flush.
    pub fn queue_pointer_move(&mut self, pixel: PixelPoint) -> bool {
        self.coalescer.queue(pixel)
    }

    /// Runs the queued move, if any.
    pub fn flush_pointer(&mut self) -> bool {
        match self.coalescer.take() {
            Some(pixel) => self.pointer_move(pixel),
            None => false,
        }
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.coalescer.cancel();
        self.interaction.pointer_leave()
    }

    #[must_use]
    pub fn hover(&self) -> Option<&HoverState> {
        self.interaction.hover()
    }

    /// Tooltip for the current hover.
    #[must_use]
    pub fn inspector(&self) -> Option<Inspector<'_>> {
        self.hover()
            .map(|hover| Inspector::new(hover, &self.options.unit_suffix))
    }
}
