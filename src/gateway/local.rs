use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use super::{GatewayError, TableGateway};
use crate::models::{Reservation, Table, TablePatch};
use crate::storage::Storage;

/// Gateway that skips HTTP and writes to the store directly.
#[derive(Clone)]
pub struct StorageGateway {
    storage: Arc<dyn Storage>,
}

impl StorageGateway {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl TableGateway for StorageGateway {
    async fn list_tables(&self, hall_id: Option<&str>) -> Result<Vec<Table>, GatewayError> {
        self.storage
            .list_tables(hall_id)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))
    }

    async fn update_table(&self, id: i32, patch: &TablePatch) -> Result<Table, GatewayError> {
        patch.validate().map_err(|e| GatewayError::Status {
            status: 400,
            message: e.to_string(),
        })?;
        self.storage
            .update_table(id, patch)
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?
            .ok_or(GatewayError::NotFound(id))
    }

    async fn reservations(
        &self,
        table_id: i32,
        date: &str,
    ) -> Result<Vec<Reservation>, GatewayError> {
        let all = self
            .storage
            .list_reservations(Some(date))
            .await
            .map_err(|e| GatewayError::Storage(e.to_string()))?;
        Ok(all.into_iter().filter(|r| r.table_id == table_id).collect())
    }
}
