//! The floor plan of one hall.
//!
//! [`FloorPlan`] owns the tables shown for a hall, an interaction controller
//! per table, the edit-mode flag, the selection, the editor panel and a
//! queue of user-visible notices. Move and resize gestures are previewed
//! locally and committed once, on pointer-up, through a [`TableGateway`].
//!
//! Every table keeps two copies: `confirmed` (last record the backend
//! returned) and `shown` (what the user sees, including optimistic values).
//! A failed commit restores `shown` from `confirmed`. Each commit carries a
//! per-surface sequence number and only the newest commit of a table may
//! touch `shown`. Answers to older commits are dropped, except a late
//! success arriving after the newest commit already failed: the backend
//! holds that record, so it is shown.

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use super::editor::TableEditor;
use super::interaction::{
    GestureState, InteractionController, Outcome, PointerCapture, PointerEvent, PressContext,
    PressTarget,
};
use crate::gateway::{GatewayError, TableGateway};
use crate::models::{Geometry, Table, TablePatch};
use crate::services::tables::{build_views, TableView};

#[derive(Debug)]
struct Slot {
    confirmed: Table,
    shown: Table,
    controller: InteractionController,
    latest_commit: u64,
    // Sequence of the commit `confirmed` came from
    confirmed_commit: u64,
    // The newest commit has its answer
    latest_settled: bool,
    // Geometry shown when the running drag/resize started
    gesture_origin: Option<Geometry>,
}

impl Slot {
    fn new(table: Table) -> Self {
        Self {
            confirmed: table.clone(),
            shown: table,
            controller: InteractionController::new(),
            latest_commit: 0,
            confirmed_commit: 0,
            latest_settled: true,
            gesture_origin: None,
        }
    }

    // Keeps a running drag/resize preview on screen when a record arrives
    fn show(&mut self, table: Table) {
        let preview = self.shown.geometry();
        self.shown = table;
        if self.controller.is_editing() {
            self.set_geometry(preview);
        }
    }

    // Drops the gesture and puts back the geometry it started from
    fn cancel_gesture(&mut self) {
        let interrupted = self.controller.abort();
        if let Some(origin) = self.gesture_origin.take() {
            if interrupted {
                self.set_geometry(origin);
            }
        }
    }

    fn set_geometry(&mut self, g: Geometry) {
        self.shown.x = g.x;
        self.shown.y = g.y;
        self.shown.width = g.width;
        self.shown.height = g.height;
    }
}

/// A transient message for the user, e.g. a failed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub table_id: i32,
    pub message: String,
}

/// A commit that has been applied optimistically and awaits the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub table_id: i32,
    pub patch: TablePatch,
    seq: u64,
}

impl PendingCommit {
    pub fn sequence(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// Backend accepted; the returned record is now shown.
    Confirmed,
    /// A newer commit for the same table decides what is shown; this answer was dropped.
    Superseded,
    /// Backend refused or was unreachable; the last confirmed values are back.
    RolledBack,
}

fn failure_message(patch: &TablePatch) -> &'static str {
    let moves = patch.x.is_some() || patch.y.is_some();
    let resizes = patch.width.is_some() || patch.height.is_some();
    let other = patch.capacity.is_some() || patch.status.is_some() || patch.shape.is_some();
    match (moves, resizes, other) {
        (true, false, false) => "Не удалось переместить стол",
        (false, true, false) => "Не удалось изменить размер стола",
        _ => "Не удалось обновить стол",
    }
}

#[derive(Debug, Default)]
pub struct FloorPlan {
    hall_id: Option<String>,
    slots: BTreeMap<i32, Slot>,
    edit_mode: bool,
    selected: Option<i32>,
    detail: Option<i32>,
    editor: Option<TableEditor>,
    notices: Vec<Notice>,
    commit_seq: u64,
}

impl FloorPlan {
    pub fn new(hall_id: Option<String>, tables: Vec<Table>) -> Self {
        let mut plan = Self {
            hall_id,
            ..Default::default()
        };
        plan.replace_tables(tables);
        plan
    }

    pub async fn load(
        gateway: &dyn TableGateway,
        hall_id: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let tables = gateway.list_tables(hall_id).await?;
        info!("Floor plan loaded: {} tables (hall {:?})", tables.len(), hall_id);
        Ok(Self::new(hall_id.map(str::to_string), tables))
    }

    /// Re-reads the hall, e.g. after something else changed the tables.
    pub async fn reload(&mut self, gateway: &dyn TableGateway) -> Result<(), GatewayError> {
        let tables = gateway.list_tables(self.hall_id.as_deref()).await?;
        self.replace_tables(tables);
        Ok(())
    }

    /// Swaps in a fresh set of records. Tables that stay keep their
    /// controller, so a gesture in progress survives a refresh.
    pub fn replace_tables(&mut self, tables: Vec<Table>) {
        let mut old = std::mem::take(&mut self.slots);
        for table in tables {
            let slot = match old.remove(&table.id) {
                Some(mut slot) => {
                    slot.confirmed = table.clone();
                    slot.show(table);
                    slot
                }
                None => Slot::new(table),
            };
            self.slots.insert(slot.confirmed.id, slot);
        }

        if self.selected.is_some_and(|id| !self.slots.contains_key(&id)) {
            self.selected = None;
        }
        if self.detail.is_some_and(|id| !self.slots.contains_key(&id)) {
            self.detail = None;
        }
        if let Some(editor) = &self.editor {
            if !self.slots.contains_key(&editor.table_id()) {
                self.editor = None;
            }
        }
    }

    pub fn hall_id(&self) -> Option<&str> {
        self.hall_id.as_deref()
    }

    /// Tables as currently displayed, including in-flight values.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.slots.values().map(|slot| &slot.shown)
    }

    pub fn table(&self, id: i32) -> Option<&Table> {
        self.slots.get(&id).map(|slot| &slot.shown)
    }

    /// Last record the backend confirmed for this table.
    pub fn confirmed(&self, id: i32) -> Option<&Table> {
        self.slots.get(&id).map(|slot| &slot.confirmed)
    }

    pub fn gesture_state(&self, id: i32) -> Option<GestureState> {
        self.slots.get(&id).map(|slot| slot.controller.state())
    }

    /* ---------- edit mode & selection ---------- */

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, on: bool) {
        if self.edit_mode == on {
            return;
        }
        self.edit_mode = on;
        // Running drags and resizes end without a commit
        for slot in self.slots.values_mut() {
            slot.cancel_gesture();
        }
        // Unsaved editor drafts are discarded, never committed
        self.editor = None;
        self.detail = None;
        debug!("edit mode {}", if on { "on" } else { "off" });
    }

    pub fn toggle_edit_mode(&mut self) {
        self.set_edit_mode(!self.edit_mode);
    }

    pub fn selected(&self) -> Option<&Table> {
        self.selected.and_then(|id| self.table(id))
    }

    /// Selects a table. In edit mode this opens the editor panel for it.
    pub fn select_table(&mut self, id: i32) -> bool {
        let Some(slot) = self.slots.get(&id) else {
            return false;
        };
        if self.edit_mode {
            self.editor = Some(TableEditor::open(&slot.shown));
        } else {
            self.selected = Some(id);
        }
        true
    }

    /// Opens the detail view of a table. Not available in edit mode.
    pub fn request_detail(&mut self, id: i32) -> Option<&Table> {
        if self.edit_mode || !self.slots.contains_key(&id) {
            return None;
        }
        self.detail = Some(id);
        self.table(id)
    }

    pub fn detail(&self) -> Option<&Table> {
        self.detail.and_then(|id| self.table(id))
    }

    /// The open detail view with its reservations on `date`; the earliest
    /// active one is the current reservation.
    pub async fn load_detail(
        &self,
        date: &str,
        gateway: &dyn TableGateway,
    ) -> Result<Option<TableView>, GatewayError> {
        let Some(table) = self.detail().cloned() else {
            return Ok(None);
        };
        let reservations = gateway.reservations(table.id, date).await?;
        Ok(build_views(vec![table], &reservations).pop())
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn editor(&self) -> Option<&TableEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut TableEditor> {
        self.editor.as_mut()
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    // Resize handles are drawn on the selected table and on the one being edited
    fn handles_visible(&self, id: i32) -> bool {
        self.selected == Some(id) || self.editor.as_ref().map(TableEditor::table_id) == Some(id)
    }

    /* ---------- pointer routing ---------- */

    pub fn pointer_down(
        &mut self,
        id: i32,
        target: PressTarget,
        event: PointerEvent,
        capture: &mut dyn PointerCapture,
    ) {
        let ctx = PressContext {
            edit_mode: self.edit_mode,
            selected: self.handles_visible(id),
        };
        if let Some(slot) = self.slots.get_mut(&id) {
            let geometry = slot.shown.geometry();
            slot.controller.pointer_down(ctx, target, event, geometry, capture);
            if slot.controller.is_editing() {
                slot.gesture_origin = Some(geometry);
            }
        }
    }

    /// Feeds a move to the table's controller and previews the result.
    pub fn pointer_move(&mut self, id: i32, event: PointerEvent) -> Option<Outcome> {
        let slot = self.slots.get_mut(&id)?;
        let outcome = slot.controller.pointer_move(event)?;
        match outcome {
            Outcome::Move { x, y } => {
                slot.shown.x = x;
                slot.shown.y = y;
            }
            Outcome::Resize { width, height } => {
                slot.shown.width = width;
                slot.shown.height = height;
            }
            Outcome::Select | Outcome::DetailRequest => {}
        }
        Some(outcome)
    }

    /// Ends the gesture on a table. Selections are handled here; a move or
    /// resize comes back as a commit for the caller to [`persist`](Self::persist).
    pub fn pointer_up(
        &mut self,
        id: i32,
        event: PointerEvent,
        capture: &mut dyn PointerCapture,
    ) -> Option<PendingCommit> {
        let slot = self.slots.get_mut(&id)?;
        let outcome = slot.controller.pointer_up(event, capture);
        if !slot.controller.is_editing() {
            slot.gesture_origin = None;
        }
        let outcome = outcome?;
        match outcome {
            Outcome::Move { x, y } => self.begin_commit(id, TablePatch::position(x, y)),
            Outcome::Resize { width, height } => {
                self.begin_commit(id, TablePatch::size(width, height))
            }
            Outcome::Select => {
                self.select_table(id);
                None
            }
            Outcome::DetailRequest => {
                self.request_detail(id);
                None
            }
        }
    }

    /// Pointer capture was lost or the element is going away: drop the
    /// gesture and its preview without committing anything.
    pub fn pointer_cancel(&mut self, id: i32) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.cancel_gesture();
        }
    }

    /* ---------- commits ---------- */

    /// Clamps the patch, shows it right away and hands back the commit to send.
    pub fn begin_commit(&mut self, id: i32, patch: TablePatch) -> Option<PendingCommit> {
        let patch = patch.clamped();
        if patch.is_empty() {
            return None;
        }
        let slot = self.slots.get_mut(&id)?;
        self.commit_seq += 1;
        slot.latest_commit = self.commit_seq;
        slot.latest_settled = false;
        patch.apply_to(&mut slot.shown);
        Some(PendingCommit {
            table_id: id,
            patch,
            seq: self.commit_seq,
        })
    }

    /// Applies the backend's answer to a commit.
    pub fn finish_commit(
        &mut self,
        pending: PendingCommit,
        result: Result<Table, GatewayError>,
    ) -> CommitStatus {
        let Some(slot) = self.slots.get_mut(&pending.table_id) else {
            return CommitStatus::Superseded;
        };
        let newest = pending.seq == slot.latest_commit;

        match result {
            Ok(table) => {
                let fresher = pending.seq >= slot.confirmed_commit;
                if fresher {
                    slot.confirmed = table.clone();
                    slot.confirmed_commit = pending.seq;
                }
                if newest {
                    slot.latest_settled = true;
                    slot.show(table);
                    CommitStatus::Confirmed
                } else if fresher && slot.latest_settled {
                    // Newest commit failed and rolled back past this one
                    debug!("late answer for table {} is the stored record", pending.table_id);
                    slot.show(table);
                    CommitStatus::Confirmed
                } else {
                    debug!("dropping stale answer for table {}", pending.table_id);
                    CommitStatus::Superseded
                }
            }
            Err(e) if newest => {
                warn!("commit for table {} failed: {}", pending.table_id, e);
                slot.latest_settled = true;
                let confirmed = slot.confirmed.clone();
                slot.show(confirmed);
                self.notices.push(Notice {
                    table_id: pending.table_id,
                    message: failure_message(&pending.patch).to_string(),
                });
                CommitStatus::RolledBack
            }
            Err(e) => {
                debug!("stale commit for table {} failed: {}", pending.table_id, e);
                CommitStatus::Superseded
            }
        }
    }

    /// Sends a pending commit and applies the answer. No retry on failure.
    pub async fn persist(
        &mut self,
        pending: PendingCommit,
        gateway: &dyn TableGateway,
    ) -> CommitStatus {
        let result = gateway.update_table(pending.table_id, &pending.patch).await;
        self.finish_commit(pending, result)
    }

    pub async fn commit_move(
        &mut self,
        id: i32,
        x: i32,
        y: i32,
        gateway: &dyn TableGateway,
    ) -> Option<CommitStatus> {
        let pending = self.begin_commit(id, TablePatch::position(x, y))?;
        Some(self.persist(pending, gateway).await)
    }

    pub async fn commit_resize(
        &mut self,
        id: i32,
        width: i32,
        height: i32,
        gateway: &dyn TableGateway,
    ) -> Option<CommitStatus> {
        let pending = self.begin_commit(id, TablePatch::size(width, height))?;
        Some(self.persist(pending, gateway).await)
    }

    /// Saves the editor draft as one update. The panel closes on success
    /// and stays open on failure.
    pub async fn save_editor(&mut self, gateway: &dyn TableGateway) -> Option<CommitStatus> {
        let editor = self.editor.as_ref()?;
        let pending = self.begin_commit(editor.table_id(), editor.patch())?;
        let status = self.persist(pending, gateway).await;
        if status == CommitStatus::Confirmed {
            self.editor = None;
        }
        Some(status)
    }

    /* ---------- notices ---------- */

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
