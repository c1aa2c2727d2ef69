use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::info;

use super::{Storage, StorageError};
use crate::models::reservation::slot_taken;
use crate::models::{
    NewReservation, NewTable, Reservation, ReservationPatch, Table, TablePatch, TableShape,
    TableStatus,
};

#[derive(Default)]
struct Inner {
    tables: BTreeMap<i32, Table>,
    reservations: BTreeMap<i32, Reservation>,
    next_table_id: i32,
    next_reservation_id: i32,
}

impl Inner {
    fn insert_table(&mut self, new: NewTable) -> Result<Table, StorageError> {
        if self.tables.values().any(|t| t.number == new.number) {
            return Err(StorageError::DuplicateNumber(new.number));
        }
        self.next_table_id += 1;
        let table = new.into_table(self.next_table_id);
        self.tables.insert(table.id, table.clone());
        Ok(table)
    }
}

/// In-process store used when no `DATABASE_URL` is configured, and by the tests.
#[derive(Default)]
pub struct MemoryStorage {
    inner: RwLock<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a small floor plan for every hall.
    pub fn seeded() -> Self {
        let mut inner = Inner::default();
        let layout: [(&str, i32, i32, i32, i32, i32, TableShape); 12] = [
            ("white", 1, 4, 60, 120, 60, TableShape::Round),
            ("white", 2, 4, 180, 120, 60, TableShape::Round),
            ("white", 3, 6, 300, 120, 100, TableShape::Rectangular),
            ("white", 4, 2, 60, 240, 50, TableShape::Square),
            ("white", 5, 8, 200, 240, 120, TableShape::Rectangular),
            ("bar", 6, 2, 60, 100, 50, TableShape::Round),
            ("bar", 7, 2, 160, 100, 50, TableShape::Round),
            ("bar", 8, 4, 260, 100, 60, TableShape::Square),
            ("vaulted", 9, 6, 100, 140, 100, TableShape::Rectangular),
            ("vaulted", 10, 4, 260, 140, 60, TableShape::Round),
            ("fourth", 11, 4, 120, 160, 60, TableShape::Square),
            ("banquet", 12, 20, 80, 120, 240, TableShape::Rectangular),
        ];
        for (hall, number, capacity, x, y, width, shape) in layout {
            let height = if shape == TableShape::Rectangular { 60 } else { width };
            let new = NewTable {
                number,
                hall_id: hall.to_string(),
                capacity,
                x,
                y,
                width,
                height,
                shape,
                status: TableStatus::Available,
            };
            inner
                .insert_table(new)
                .expect("seed table numbers must be unique");
        }
        info!("Seeded in-memory storage with {} tables", inner.tables.len());
        Self {
            inner: RwLock::new(inner),
        }
    }
}

fn by_slot(a: &Reservation, b: &Reservation) -> std::cmp::Ordering {
    (&a.date, &a.time, a.id).cmp(&(&b.date, &b.time, b.id))
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list_tables(&self, hall_id: Option<&str>) -> Result<Vec<Table>, StorageError> {
        let inner = self.inner.read().await;
        let mut tables: Vec<Table> = inner
            .tables
            .values()
            .filter(|t| hall_id.map_or(true, |h| t.hall_id == h))
            .cloned()
            .collect();
        tables.sort_by_key(|t| t.number);
        Ok(tables)
    }

    async fn get_table(&self, id: i32) -> Result<Option<Table>, StorageError> {
        Ok(self.inner.read().await.tables.get(&id).cloned())
    }

    async fn create_table(&self, new: NewTable) -> Result<Table, StorageError> {
        self.inner.write().await.insert_table(new)
    }

    async fn update_table(&self, id: i32, patch: &TablePatch) -> Result<Option<Table>, StorageError> {
        let mut inner = self.inner.write().await;
        Ok(inner.tables.get_mut(&id).map(|table| {
            patch.apply_to(table);
            table.clone()
        }))
    }

    async fn list_reservations(&self, date: Option<&str>) -> Result<Vec<Reservation>, StorageError> {
        let inner = self.inner.read().await;
        let mut list: Vec<Reservation> = inner
            .reservations
            .values()
            .filter(|r| date.map_or(true, |d| r.date == d))
            .cloned()
            .collect();
        list.sort_by(by_slot);
        Ok(list)
    }

    async fn reservations_for_table(&self, table_id: i32) -> Result<Vec<Reservation>, StorageError> {
        let inner = self.inner.read().await;
        let mut list: Vec<Reservation> = inner
            .reservations
            .values()
            .filter(|r| r.table_id == table_id)
            .cloned()
            .collect();
        list.sort_by(by_slot);
        Ok(list)
    }

    async fn get_reservation(&self, id: i32) -> Result<Option<Reservation>, StorageError> {
        Ok(self.inner.read().await.reservations.get(&id).cloned())
    }

    async fn create_reservation(&self, new: NewReservation) -> Result<Reservation, StorageError> {
        let mut inner = self.inner.write().await;
        // Check and insert under one write lock.
        if new.status == crate::models::ReservationStatus::Active
            && slot_taken(inner.reservations.values(), new.table_id, &new.date, &new.time)
        {
            return Err(StorageError::SlotTaken {
                table_id: new.table_id,
                date: new.date,
                time: new.time,
            });
        }
        inner.next_reservation_id += 1;
        let reservation = new.into_reservation(inner.next_reservation_id, Utc::now().naive_utc());
        inner.reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn update_reservation(
        &self,
        id: i32,
        patch: &ReservationPatch,
    ) -> Result<Option<Reservation>, StorageError> {
        let mut inner = self.inner.write().await;
        Ok(inner.reservations.get_mut(&id).map(|r| {
            patch.apply_to(r);
            r.clone()
        }))
    }

    async fn delete_reservation(&self, id: i32) -> Result<Option<Reservation>, StorageError> {
        Ok(self.inner.write().await.reservations.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReservationStatus;

    fn booking(table_id: i32, time: &str) -> NewReservation {
        NewReservation {
            table_id,
            customer_name: "Дана".to_string(),
            customer_phone: "+77030000000".to_string(),
            guests: 2,
            date: "2026-10-19".to_string(),
            time: time.to_string(),
            duration: 120,
            comment: None,
            status: ReservationStatus::Active,
        }
    }

    #[tokio::test]
    async fn seeded_store_filters_by_hall() {
        let store = MemoryStorage::seeded();
        let bar = store.list_tables(Some("bar")).await.unwrap();
        assert_eq!(bar.iter().map(|t| t.number).collect::<Vec<_>>(), vec![6, 7, 8]);
        assert_eq!(store.list_tables(None).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn update_returns_full_record() {
        let store = MemoryStorage::seeded();
        let updated = store
            .update_table(1, &TablePatch::position(80, 70))
            .await
            .unwrap()
            .unwrap();
        assert_eq!((updated.x, updated.y, updated.width), (80, 70, 60));
        assert!(store.update_table(999, &TablePatch::position(0, 0)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_table_number_is_rejected() {
        let store = MemoryStorage::seeded();
        let err = store
            .create_table(NewTable {
                number: 1,
                hall_id: "white".to_string(),
                capacity: 2,
                x: 0,
                y: 0,
                width: 60,
                height: 60,
                shape: TableShape::Round,
                status: TableStatus::Available,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::DuplicateNumber(1)));
    }

    #[tokio::test]
    async fn second_booking_of_same_slot_is_rejected() {
        let store = MemoryStorage::seeded();
        store.create_reservation(booking(2, "19:00")).await.unwrap();
        let err = store.create_reservation(booking(2, "19:00")).await.unwrap_err();
        assert!(matches!(err, StorageError::SlotTaken { table_id: 2, .. }));
        store.create_reservation(booking(2, "21:00")).await.unwrap();
        store.create_reservation(booking(3, "19:00")).await.unwrap();
    }

    #[tokio::test]
    async fn reservations_are_sorted_by_slot() {
        let store = MemoryStorage::new();
        store.create_reservation(booking(1, "21:00")).await.unwrap();
        store.create_reservation(booking(1, "18:30")).await.unwrap();
        let times: Vec<String> = store
            .reservations_for_table(1)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.time)
            .collect();
        assert_eq!(times, vec!["18:30", "21:00"]);
    }
}
