//! Pointer handling and hover state.
//!
//! The controller is a two-state machine:
//!
//! ```text
//! Idle --move within tolerance--> Hovering(node)
//! Hovering --move onto another node--> Hovering(other)
//! Hovering | Idle --move outside tolerance--> Idle
//! Hovering | Idle --pointer leave--> Idle
//! Hovering | Idle --mesh or viewport change--> Idle
//! ```
//!
//! Observers hear about every change of hovered node, including to and from
//! `Idle`. Moving within the same node only refreshes the stored distance.

mod inspector;

pub use inspector::{Inspector, InspectorFields};

use serde::Serialize;

use crate::mesh::MeshModel;
use crate::spatial::{NodeHit, NodeLocator};
use crate::view::PixelPoint;

/// The node currently under the pointer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverState {
    pub row: usize,
    pub col: usize,
    pub x: f64,
    pub z: f64,
    /// Category of the element named by `element_row` / `element_col`.
    pub category: u32,
    pub element_row: usize,
    pub element_col: usize,
    pub pixel: PixelPoint,
    pub distance: f64,
}

impl HoverState {
    /// Attaches the element-centred category to a locator hit.
    ///
    /// Returns `None` when the hit does not belong to `model`.
    #[must_use]
    pub fn from_hit(hit: NodeHit, model: &MeshModel) -> Option<Self> {
        let (element_row, element_col) = model.element_for_node(hit.row, hit.col).ok()?;
        let category = model.categories().get(element_row, element_col).ok()?;
        Some(Self {
            row: hit.row,
            col: hit.col,
            x: hit.x,
            z: hit.z,
            category,
            element_row,
            element_col,
            pixel: hit.pixel,
            distance: hit.distance,
        })
    }

    fn same_node(&self, other: &Self) -> bool {
        self.row == other.row && self.col == other.col
    }
}

/// Controller state.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering(HoverState),
}

impl InteractionState {
    #[must_use]
    pub fn hover(&self) -> Option<&HoverState> {
        match self {
            Self::Idle => None,
            Self::Hovering(hover) => Some(hover),
        }
    }
}

type HoverObserver = Box<dyn FnMut(Option<&HoverState>)>;

/// Owns hover state and notifies observers when it changes.
#[derive(Default)]
pub struct InteractionController {
    state: InteractionState,
    observers: Vec<HoverObserver>,
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl InteractionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for hover changes; `None` means the hover cleared.
    pub fn on_hover_change<F>(&mut self, observer: F)
    where
        F: FnMut(Option<&HoverState>) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub fn hover(&self) -> Option<&HoverState> {
        self.state.hover()
    }

    /// Queries `locator` at `pixel` and moves to the resulting state.
    ///
    /// Returns `true` when observers were notified.
    pub fn pointer_move(
        &mut self,
        pixel: PixelPoint,
        locator: &dyn NodeLocator,
        model: &MeshModel,
        tolerance: f64,
    ) -> bool {
        let next = locator
            .nearest(pixel, tolerance)
            .and_then(|hit| HoverState::from_hit(hit, model))
            .map_or(InteractionState::Idle, InteractionState::Hovering);
        self.transition(next)
    }

    /// Pointer left the surface.
    pub fn pointer_leave(&mut self) -> bool {
        self.transition(InteractionState::Idle)
    }

    /// Mesh or viewport changed; the stored hover no longer describes the screen.
    pub fn invalidate(&mut self) -> bool {
        self.transition(InteractionState::Idle)
    }

    fn transition(&mut self, next: InteractionState) -> bool {
        let changed = match (&self.state, &next) {
            (InteractionState::Idle, InteractionState::Idle) => false,
            (InteractionState::Hovering(a), InteractionState::Hovering(b)) => !a.same_node(b),
            _ => true,
        };

        self.state = next;
        if changed {
            let hover = self.state.hover();
            for observer in &mut self.observers {
                observer(hover);
            }
        }
        changed
    }
}

/// Collapses bursts of pointer moves into one query per animation frame.
///
/// The last queued position wins; a pointer leave drops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerCoalescer {
    pending: Option<PixelPoint>,
}

impl PointerCoalescer {
    /// Queues a move. Returns `true` when no flush was pending yet, i.e. the
    /// caller should schedule one.
    pub fn queue(&mut self, pixel: PixelPoint) -> bool {
        self.pending.replace(pixel).is_none()
    }

    /// Takes the position to query, if any.
    pub fn take(&mut self) -> Option<PixelPoint> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
