use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::FromRow;

use super::{Storage, StorageError};
use crate::database::Database;
use crate::models::{
    NewReservation, NewTable, Reservation, ReservationPatch, ReservationStatus, Table, TablePatch,
};

const TABLE_COLUMNS: &str = "id, number, hall_id, capacity, x, y, width, height, status, shape";
const RESERVATION_COLUMNS: &str = "id, table_id, customer_name, customer_phone, guests, date, time, \
     duration, comment, status, created_at";

// Row shapes as stored; enum columns are plain TEXT
#[derive(Debug, FromRow)]
struct TableRow {
    id: i32,
    number: i32,
    hall_id: String,
    capacity: i32,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    status: String,
    shape: String,
}

impl TryFrom<TableRow> for Table {
    type Error = StorageError;

    fn try_from(row: TableRow) -> Result<Self, Self::Error> {
        let corrupt = |e: crate::models::table::UnknownVariant| {
            StorageError::Corrupt(format!("table {}: {}", row.id, e))
        };
        Ok(Table {
            id: row.id,
            number: row.number,
            capacity: row.capacity,
            x: row.x,
            y: row.y,
            width: row.width,
            height: row.height,
            status: row.status.parse().map_err(corrupt)?,
            shape: row.shape.parse().map_err(corrupt)?,
            hall_id: row.hall_id,
        })
    }
}

#[derive(Debug, FromRow)]
struct ReservationRow {
    id: i32,
    table_id: i32,
    customer_name: String,
    customer_phone: String,
    guests: i32,
    date: String,
    time: String,
    duration: i32,
    comment: Option<String>,
    status: String,
    created_at: NaiveDateTime,
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = StorageError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let status: ReservationStatus = row
            .status
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("reservation {}: {}", row.id, e)))?;
        Ok(Reservation {
            id: row.id,
            table_id: row.table_id,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            guests: row.guests,
            date: row.date,
            time: row.time,
            duration: row.duration,
            comment: row.comment,
            status,
            created_at: row.created_at,
        })
    }
}

fn into_tables(rows: Vec<TableRow>) -> Result<Vec<Table>, StorageError> {
    rows.into_iter().map(Table::try_from).collect()
}

fn into_reservations(rows: Vec<ReservationRow>) -> Result<Vec<Reservation>, StorageError> {
    rows.into_iter().map(Reservation::try_from).collect()
}

/// Postgres-backed store. Expects `tables` and `reservations` to exist already.
#[derive(Clone)]
pub struct PgStorage {
    db: Database,
}

impl PgStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn list_tables(&self, hall_id: Option<&str>) -> Result<Vec<Table>, StorageError> {
        let rows = sqlx::query_as::<_, TableRow>(&format!(
            "SELECT {TABLE_COLUMNS} FROM tables
             WHERE ($1::TEXT IS NULL OR hall_id = $1)
             ORDER BY number"
        ))
        .bind(hall_id)
        .fetch_all(&self.db.pool)
        .await?;
        into_tables(rows)
    }

    async fn get_table(&self, id: i32) -> Result<Option<Table>, StorageError> {
        sqlx::query_as::<_, TableRow>(&format!("SELECT {TABLE_COLUMNS} FROM tables WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db.pool)
            .await?
            .map(Table::try_from)
            .transpose()
    }

    async fn create_table(&self, new: NewTable) -> Result<Table, StorageError> {
        let number = new.number;
        let res = sqlx::query_as::<_, TableRow>(&format!(
            "INSERT INTO tables (number, hall_id, capacity, x, y, width, height, status, shape)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {TABLE_COLUMNS}"
        ))
        .bind(new.number)
        .bind(&new.hall_id)
        .bind(new.capacity)
        .bind(new.x)
        .bind(new.y)
        .bind(new.width)
        .bind(new.height)
        .bind(new.status.as_str())
        .bind(new.shape.as_str())
        .fetch_one(&self.db.pool)
        .await;

        match res {
            Ok(row) => Table::try_from(row),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StorageError::DuplicateNumber(number))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_table(&self, id: i32, patch: &TablePatch) -> Result<Option<Table>, StorageError> {
        // Single statement, so concurrent patches never interleave field by field
        sqlx::query_as::<_, TableRow>(&format!(
            "UPDATE tables SET
                x = COALESCE($2, x),
                y = COALESCE($3, y),
                width = COALESCE($4, width),
                height = COALESCE($5, height),
                capacity = COALESCE($6, capacity),
                status = COALESCE($7, status),
                shape = COALESCE($8, shape)
             WHERE id = $1
             RETURNING {TABLE_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.x)
        .bind(patch.y)
        .bind(patch.width)
        .bind(patch.height)
        .bind(patch.capacity)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.shape.map(|s| s.as_str()))
        .fetch_optional(&self.db.pool)
        .await?
        .map(Table::try_from)
        .transpose()
    }

    async fn list_reservations(&self, date: Option<&str>) -> Result<Vec<Reservation>, StorageError> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE ($1::TEXT IS NULL OR date = $1)
             ORDER BY date, time, id"
        ))
        .bind(date)
        .fetch_all(&self.db.pool)
        .await?;
        into_reservations(rows)
    }

    async fn reservations_for_table(&self, table_id: i32) -> Result<Vec<Reservation>, StorageError> {
        let rows = sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations
             WHERE table_id = $1
             ORDER BY date, time, id"
        ))
        .bind(table_id)
        .fetch_all(&self.db.pool)
        .await?;
        into_reservations(rows)
    }

    async fn get_reservation(&self, id: i32) -> Result<Option<Reservation>, StorageError> {
        sqlx::query_as::<_, ReservationRow>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?
        .map(Reservation::try_from)
        .transpose()
    }

    async fn create_reservation(&self, new: NewReservation) -> Result<Reservation, StorageError> {
        // The slot check and the insert run as one statement
        let row = sqlx::query_as::<_, ReservationRow>(&format!(
            "INSERT INTO reservations
                (table_id, customer_name, customer_phone, guests, date, time, duration, comment, status)
             SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9
             WHERE $9 <> 'active' OR NOT EXISTS (
                SELECT 1 FROM reservations
                WHERE table_id = $1 AND date = $5 AND time = $6 AND status = 'active'
             )
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(new.table_id)
        .bind(&new.customer_name)
        .bind(&new.customer_phone)
        .bind(new.guests)
        .bind(&new.date)
        .bind(&new.time)
        .bind(new.duration)
        .bind(&new.comment)
        .bind(new.status.as_str())
        .fetch_optional(&self.db.pool)
        .await?;

        match row {
            Some(row) => Reservation::try_from(row),
            None => Err(StorageError::SlotTaken {
                table_id: new.table_id,
                date: new.date,
                time: new.time,
            }),
        }
    }

    async fn update_reservation(
        &self,
        id: i32,
        patch: &ReservationPatch,
    ) -> Result<Option<Reservation>, StorageError> {
        sqlx::query_as::<_, ReservationRow>(&format!(
            "UPDATE reservations SET
                customer_name = COALESCE($2, customer_name),
                customer_phone = COALESCE($3, customer_phone),
                guests = COALESCE($4, guests),
                date = COALESCE($5, date),
                time = COALESCE($6, time),
                duration = COALESCE($7, duration),
                comment = COALESCE($8, comment),
                status = COALESCE($9, status)
             WHERE id = $1
             RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.customer_name)
        .bind(&patch.customer_phone)
        .bind(patch.guests)
        .bind(&patch.date)
        .bind(&patch.time)
        .bind(patch.duration)
        .bind(&patch.comment)
        .bind(patch.status.map(|s| s.as_str()))
        .fetch_optional(&self.db.pool)
        .await?
        .map(Reservation::try_from)
        .transpose()
    }

    async fn delete_reservation(&self, id: i32) -> Result<Option<Reservation>, StorageError> {
        sqlx::query_as::<_, ReservationRow>(&format!(
            "DELETE FROM reservations WHERE id = $1 RETURNING {RESERVATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?
        .map(Reservation::try_from)
        .transpose()
    }
}
