//! Persistence of tables and reservations.
//!
//! Two backends implement [`Storage`]:
//! - [`MemoryStorage`]: maps behind a tokio `RwLock`, optionally seeded with a demo floor plan.
//! - [`PgStorage`]: Postgres through the sqlx pool from [`crate::database::Database`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{NewReservation, NewTable, Reservation, ReservationPatch, Table, TablePatch};

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("table number {0} is already in use")]
    DuplicateNumber(i32),
    #[error("table {table_id} already has an active reservation at {date} {time}")]
    SlotTaken {
        table_id: i32,
        date: String,
        time: String,
    },
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Tables ordered by number, optionally restricted to one hall.
    async fn list_tables(&self, hall_id: Option<&str>) -> Result<Vec<Table>, StorageError>;

    async fn get_table(&self, id: i32) -> Result<Option<Table>, StorageError>;

    async fn create_table(&self, new: NewTable) -> Result<Table, StorageError>;

    /// Applies the patch atomically and returns the full record, `None` if the id is unknown.
    async fn update_table(&self, id: i32, patch: &TablePatch) -> Result<Option<Table>, StorageError>;

    /// Reservations ordered by date and time, optionally for one date.
    async fn list_reservations(&self, date: Option<&str>) -> Result<Vec<Reservation>, StorageError>;

    async fn reservations_for_table(&self, table_id: i32) -> Result<Vec<Reservation>, StorageError>;

    async fn get_reservation(&self, id: i32) -> Result<Option<Reservation>, StorageError>;

    /// Inserts the reservation unless the slot is taken ([`StorageError::SlotTaken`]).
    async fn create_reservation(&self, new: NewReservation) -> Result<Reservation, StorageError>;

    async fn update_reservation(
        &self,
        id: i32,
        patch: &ReservationPatch,
    ) -> Result<Option<Reservation>, StorageError>;

    async fn delete_reservation(&self, id: i32) -> Result<Option<Reservation>, StorageError>;
}
