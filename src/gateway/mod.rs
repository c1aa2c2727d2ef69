//! Persistence gateway used by the floor plan surface.
//!
//! The surface reads the tables of a hall, pushes partial updates for one
//! table, and fetches a table's reservations for its detail view. [`HttpTableGateway`] talks to the REST API,
//! [`StorageGateway`] goes straight to a [`crate::storage::Storage`].

pub mod breaker;
pub mod http;
pub mod local;

use async_trait::async_trait;

use crate::models::{Reservation, Table, TablePatch};

pub use breaker::{CircuitBreaker, CircuitState};
pub use http::HttpTableGateway;
pub use local::StorageGateway;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("table {0} not found")]
    NotFound(i32),
    #[error("circuit breaker is open, backend temporarily unavailable")]
    Unavailable,
    #[error("backend answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait TableGateway: Send + Sync {
    async fn list_tables(&self, hall_id: Option<&str>) -> Result<Vec<Table>, GatewayError>;

    /// Applies `patch` to table `id` and returns the full stored record.
    async fn update_table(&self, id: i32, patch: &TablePatch) -> Result<Table, GatewayError>;

    /// Reservations of one table on `date`, ordered by time.
    async fn reservations(
        &self,
        table_id: i32,
        date: &str,
    ) -> Result<Vec<Reservation>, GatewayError>;
}
