//! Per-table pointer gesture handling.
//!
//! One [`InteractionController`] belongs to one table element. It turns a
//! pointer-down / move / up sequence into an [`Outcome`]: a clamped new
//! position, a clamped new size, or (outside edit mode) a selection or detail
//! request. The controller never talks to persistence; the owning surface
//! decides what to do with each outcome.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::models::table::{clamp_coordinate, clamp_size};
use crate::models::Geometry;

pub type PointerId = i32;

/// Two selects closer than this are reported as a detail request.
pub const DOUBLE_ACTIVATION_WINDOW: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    pub x: i32,
    pub y: i32,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(pointer_id: PointerId, x: i32, y: i32, at: Instant) -> Self {
        Self { pointer_id, x, y, at }
    }
}

/// Resize grips shown on the selected table in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    SouthEast,
    East,
    South,
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Body,
    Handle(ResizeHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PressContext {
    pub edit_mode: bool,
    /// Whether the table currently shows its resize handles.
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("pointer {0} could not be captured")]
pub struct CaptureError(pub PointerId);

/// Host side of pointer capture. While captured, every move/up of that
/// pointer is routed to the controller that captured it.
pub trait PointerCapture {
    fn capture(&mut self, pointer_id: PointerId) -> Result<(), CaptureError>;
    fn release(&mut self, pointer_id: PointerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Move { x: i32, y: i32 },
    Resize { width: i32, height: i32 },
    Select,
    DetailRequest,
}

/// Externally visible gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Dragging,
    Resizing(ResizeHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    pointer_id: PointerId,
    start_x: i32,
    start_y: i32,
    snapshot: Geometry,
}

impl Anchor {
    fn delta(&self, event: &PointerEvent) -> (i32, i32) {
        (
            event.x.saturating_sub(self.start_x),
            event.y.saturating_sub(self.start_y),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Gesture {
    #[default]
    Idle,
    // Press outside edit mode, becomes a select if released without moving
    Pressed {
        pointer_id: PointerId,
        start_x: i32,
        start_y: i32,
        moved: bool,
    },
    Dragging {
        anchor: Anchor,
        last: Option<Outcome>,
    },
    Resizing {
        anchor: Anchor,
        handle: ResizeHandle,
        last: Option<Outcome>,
    },
}

impl Gesture {
    fn pointer_id(&self) -> Option<PointerId> {
        match self {
            Gesture::Idle => None,
            Gesture::Pressed { pointer_id, .. } => Some(*pointer_id),
            Gesture::Dragging { anchor, .. } | Gesture::Resizing { anchor, .. } => {
                Some(anchor.pointer_id)
            }
        }
    }
}

/// New top-left corner for a drag by `(dx, dy)`, never negative.
pub fn drag_to(snapshot: Geometry, dx: i32, dy: i32) -> (i32, i32) {
    (
        clamp_coordinate(snapshot.x.saturating_add(dx)),
        clamp_coordinate(snapshot.y.saturating_add(dy)),
    )
}

/// New size for a resize by `(dx, dy)` through `handle`, never below the minimum.
pub fn resize_to(snapshot: Geometry, handle: ResizeHandle, dx: i32, dy: i32) -> (i32, i32) {
    let width = clamp_size(snapshot.width.saturating_add(dx));
    let height = clamp_size(snapshot.height.saturating_add(dy));
    match handle {
        ResizeHandle::SouthEast => (width, height),
        ResizeHandle::East => (width, snapshot.height),
        ResizeHandle::South => (snapshot.width, height),
    }
}

#[derive(Debug, Default)]
pub struct InteractionController {
    gesture: Gesture,
    last_select: Option<Instant>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        match self.gesture {
            Gesture::Dragging { .. } => GestureState::Dragging,
            Gesture::Resizing { handle, .. } => GestureState::Resizing(handle),
            Gesture::Idle | Gesture::Pressed { .. } => GestureState::Idle,
        }
    }

    /// True while a drag or resize is in progress.
    pub fn is_editing(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. } | Gesture::Resizing { .. })
    }

    pub fn pointer_down(
        &mut self,
        ctx: PressContext,
        target: PressTarget,
        event: PointerEvent,
        table: Geometry,
        capture: &mut dyn PointerCapture,
    ) {
        // One drag/resize at a time per element. A plain press holds no
        // capture, so its release may have gone elsewhere: a new press replaces it.
        if self.is_editing() {
            return;
        }

        if !ctx.edit_mode {
            self.gesture = Gesture::Pressed {
                pointer_id: event.pointer_id,
                start_x: event.x,
                start_y: event.y,
                moved: false,
            };
            return;
        }

        // Handles only exist on the selected table
        let handle = match target {
            PressTarget::Handle(handle) if ctx.selected => Some(handle),
            _ => None,
        };

        if let Err(e) = capture.capture(event.pointer_id) {
            debug!("gesture aborted: {}", e);
            return;
        }

        let anchor = Anchor {
            pointer_id: event.pointer_id,
            start_x: event.x,
            start_y: event.y,
            snapshot: table,
        };
        self.gesture = match handle {
            Some(handle) => Gesture::Resizing {
                anchor,
                handle,
                last: None,
            },
            None => Gesture::Dragging { anchor, last: None },
        };
        debug!("gesture started: {:?}", self.state());
    }

    /// Returns the new candidate position or size, if this move belongs to the active gesture.
    pub fn pointer_move(&mut self, event: PointerEvent) -> Option<Outcome> {
        if self.gesture.pointer_id() != Some(event.pointer_id) {
            return None;
        }
        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::Pressed {
                start_x,
                start_y,
                moved,
                ..
            } => {
                if event.x != *start_x || event.y != *start_y {
                    *moved = true;
                }
                None
            }
            Gesture::Dragging { anchor, last } => {
                let (dx, dy) = anchor.delta(&event);
                let (x, y) = drag_to(anchor.snapshot, dx, dy);
                let outcome = Outcome::Move { x, y };
                *last = Some(outcome);
                Some(outcome)
            }
            Gesture::Resizing {
                anchor,
                handle,
                last,
            } => {
                let (dx, dy) = anchor.delta(&event);
                let (width, height) = resize_to(anchor.snapshot, *handle, dx, dy);
                let outcome = Outcome::Resize { width, height };
                *last = Some(outcome);
                Some(outcome)
            }
        }
    }

    /// Ends the gesture. For a drag or resize this is the committed value
    /// (the last move outcome); a drag released without moving is a select.
    pub fn pointer_up(
        &mut self,
        event: PointerEvent,
        capture: &mut dyn PointerCapture,
    ) -> Option<Outcome> {
        if self.gesture.pointer_id() != Some(event.pointer_id) {
            return None;
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => None,
            Gesture::Pressed { moved: true, .. } => None,
            Gesture::Pressed { moved: false, .. } => Some(self.activate(event.at)),
            Gesture::Dragging { anchor, last } => {
                capture.release(anchor.pointer_id);
                Some(last.unwrap_or(Outcome::Select))
            }
            Gesture::Resizing { anchor, last, .. } => {
                capture.release(anchor.pointer_id);
                last
            }
        }
    }

    /// Drops the gesture without any outcome, e.g. when capture was lost or
    /// the element went away. Returns whether a drag or resize was interrupted.
    pub fn abort(&mut self) -> bool {
        let was_editing = self.is_editing();
        if !matches!(self.gesture, Gesture::Idle) {
            debug!("gesture aborted: {:?}", self.state());
        }
        self.gesture = Gesture::Idle;
        was_editing
    }

    fn activate(&mut self, at: Instant) -> Outcome {
        match self.last_select {
            Some(prev) if at.saturating_duration_since(prev) <= DOUBLE_ACTIVATION_WINDOW => {
                self.last_select = None;
                Outcome::DetailRequest
            }
            _ => {
                self.last_select = Some(at);
                Outcome::Select
            }
        }
    }
}
