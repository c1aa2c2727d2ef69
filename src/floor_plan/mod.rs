//! Interactive table layout editor.
//!
//! UI-toolkit agnostic: the host feeds pointer events and renders
//! [`FloorPlan::tables`]; persistence goes through [`crate::gateway`].

pub mod editor;
pub mod interaction;
pub mod surface;

pub use editor::{Direction, TableEditor, NUDGE_STEP};
pub use interaction::{
    CaptureError, GestureState, InteractionController, Outcome, PointerCapture, PointerEvent,
    PointerId, PressContext, PressTarget, ResizeHandle, DOUBLE_ACTIVATION_WINDOW,
};
pub use surface::{CommitStatus, FloorPlan, Notice, PendingCommit};
