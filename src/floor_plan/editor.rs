use crate::models::table::{clamp_capacity, clamp_coordinate};
use crate::models::{Table, TablePatch};

/// Pixels moved by one nudge button press.
pub const NUDGE_STEP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Side panel for editing one table by buttons instead of dragging.
///
/// Holds a draft that is only sent when saved; closing the panel drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEditor {
    table_id: i32,
    original: (i32, i32, i32),
    x: i32,
    y: i32,
    capacity: i32,
}

impl TableEditor {
    pub fn open(table: &Table) -> Self {
        Self {
            table_id: table.id,
            original: (table.x, table.y, table.capacity),
            x: table.x,
            y: table.y,
            capacity: table.capacity,
        }
    }

    pub fn table_id(&self) -> i32 {
        self.table_id
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn capacity(&self) -> i32 {
        self.capacity
    }

    pub fn nudge(&mut self, direction: Direction) {
        match direction {
            Direction::Up => self.y = clamp_coordinate(self.y - NUDGE_STEP),
            Direction::Down => self.y += NUDGE_STEP,
            Direction::Left => self.x = clamp_coordinate(self.x - NUDGE_STEP),
            Direction::Right => self.x += NUDGE_STEP,
        }
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = clamp_coordinate(x);
        self.y = clamp_coordinate(y);
    }

    pub fn change_capacity(&mut self, delta: i32) {
        self.capacity = clamp_capacity(self.capacity.saturating_add(delta));
    }

    pub fn set_capacity(&mut self, capacity: i32) {
        self.capacity = clamp_capacity(capacity);
    }

    pub fn has_changes(&self) -> bool {
        (self.x, self.y, self.capacity) != self.original
    }

    pub fn patch(&self) -> TablePatch {
        TablePatch {
            x: Some(self.x),
            y: Some(self.y),
            capacity: Some(self.capacity),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TableShape, TableStatus};

    fn table(capacity: i32) -> Table {
        Table {
            id: 9,
            number: 9,
            hall_id: "bar".to_string(),
            capacity,
            x: 5,
            y: 30,
            width: 60,
            height: 60,
            status: TableStatus::Available,
            shape: TableShape::Square,
        }
    }

    #[test]
    fn capacity_floor_and_ceiling() {
        let mut editor = TableEditor::open(&table(1));
        editor.change_capacity(-1);
        assert_eq!(editor.capacity(), 1);
        assert!(!editor.has_changes());

        let mut editor = TableEditor::open(&table(20));
        editor.change_capacity(1);
        assert_eq!(editor.capacity(), 20);
    }

    #[test]
    fn nudges_stop_at_the_origin() {
        let mut editor = TableEditor::open(&table(4));
        editor.nudge(Direction::Left);
        editor.nudge(Direction::Up);
        editor.nudge(Direction::Up);
        editor.nudge(Direction::Up);
        editor.nudge(Direction::Up);
        assert_eq!(editor.position(), (0, 0));
        editor.nudge(Direction::Right);
        editor.nudge(Direction::Down);
        assert_eq!(editor.position(), (10, 10));
        assert!(editor.has_changes());
    }

    #[test]
    fn patch_carries_position_and_capacity() {
        let mut editor = TableEditor::open(&table(4));
        editor.change_capacity(2);
        let patch = editor.patch();
        assert_eq!(patch.capacity, Some(6));
        assert_eq!((patch.x, patch.y), (Some(5), Some(30)));
        assert_eq!(patch.width, None);
    }
}
