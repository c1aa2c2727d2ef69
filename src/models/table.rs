use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Smallest width/height a table may have on the floor plan, in pixels.
pub const MIN_TABLE_SIZE: i32 = 40;
pub const MIN_CAPACITY: i32 = 1;
pub const MAX_CAPACITY: i32 = 20;
pub const DEFAULT_TABLE_SIZE: i32 = 60;

pub fn clamp_coordinate(value: i32) -> i32 {
    value.max(0)
}

pub fn clamp_size(value: i32) -> i32 {
    value.max(MIN_TABLE_SIZE)
}

pub fn clamp_capacity(value: i32) -> i32 {
    value.clamp(MIN_CAPACITY, MAX_CAPACITY)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Reserved,
    Occupied,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Available => "available",
            TableStatus::Reserved => "reserved",
            TableStatus::Occupied => "occupied",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(TableStatus::Available),
            "reserved" => Ok(TableStatus::Reserved),
            "occupied" => Ok(TableStatus::Occupied),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableShape {
    #[default]
    Round,
    Square,
    Rectangular,
}

impl TableShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableShape::Round => "round",
            TableShape::Square => "square",
            TableShape::Rectangular => "rectangular",
        }
    }
}

impl FromStr for TableShape {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round" => Ok(TableShape::Round),
            "square" => Ok(TableShape::Square),
            "rectangular" => Ok(TableShape::Rectangular),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

/// Position and size of a table on the layout surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: i32,
    pub number: i32,
    pub hall_id: String,
    pub capacity: i32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub status: TableStatus,
    pub shape: TableShape,
}

impl Table {
    pub fn geometry(&self) -> Geometry {
        Geometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

fn default_table_size() -> i32 {
    DEFAULT_TABLE_SIZE
}

// POST /api/tables
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTable {
    #[validate(range(min = 1))]
    pub number: i32,
    #[validate(length(min = 1))]
    pub hall_id: String,
    #[validate(range(min = 1, max = 20))]
    pub capacity: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub x: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub y: i32,
    #[serde(default = "default_table_size")]
    #[validate(range(min = 40))]
    pub width: i32,
    #[serde(default = "default_table_size")]
    #[validate(range(min = 40))]
    pub height: i32,
    #[serde(default)]
    pub shape: TableShape,
    #[serde(default)]
    pub status: TableStatus,
}

impl NewTable {
    pub fn into_table(self, id: i32) -> Table {
        Table {
            id,
            number: self.number,
            hall_id: self.hall_id,
            capacity: self.capacity,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            status: self.status,
            shape: self.shape,
        }
    }
}

/// Partial update of a table. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TablePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 40))]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 40))]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 20))]
    pub capacity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TableStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<TableShape>,
}

impl TablePatch {
    pub fn position(x: i32, y: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn size(width: i32, height: i32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn status(status: TableStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Pulls every numeric field into its allowed range.
    pub fn clamped(mut self) -> Self {
        self.x = self.x.map(clamp_coordinate);
        self.y = self.y.map(clamp_coordinate);
        self.width = self.width.map(clamp_size);
        self.height = self.height.map(clamp_size);
        self.capacity = self.capacity.map(clamp_capacity);
        self
    }

    pub fn apply_to(&self, table: &mut Table) {
        if let Some(x) = self.x {
            table.x = x;
        }
        if let Some(y) = self.y {
            table.y = y;
        }
        if let Some(width) = self.width {
            table.width = width;
        }
        if let Some(height) = self.height {
            table.height = height;
        }
        if let Some(capacity) = self.capacity {
            table.capacity = capacity;
        }
        if let Some(status) = self.status {
            table.status = status;
        }
        if let Some(shape) = self.shape {
            table.shape = shape;
        }
    }
}
