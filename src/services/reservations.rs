//! Reservation lifecycle.
//!
//! Besides storing reservations, this keeps the table status in step:
//! an active reservation marks its table `reserved`, and the table goes back
//! to `available` once it has no active reservation left. `occupied` is only
//! ever set by hand and is never overwritten here.

use tracing::{info, warn};
use validator::Validate;

use crate::error::AppError;
use crate::models::reservation::{parse_date, parse_time};
use crate::models::{NewReservation, Reservation, ReservationPatch, TablePatch, TableStatus};
use crate::storage::Storage;

fn check_date(date: &str) -> Result<(), AppError> {
    parse_date(date)
        .map(|_| ())
        .ok_or_else(|| AppError::BadRequest(format!("Неверная дата: {}", date)))
}

fn check_time(time: &str) -> Result<(), AppError> {
    parse_time(time)
        .map(|_| ())
        .ok_or_else(|| AppError::BadRequest(format!("Неверное время: {}", time)))
}

pub async fn create(storage: &dyn Storage, new: NewReservation) -> Result<Reservation, AppError> {
    new.validate()?;
    check_date(&new.date)?;
    check_time(&new.time)?;

    let table = storage
        .get_table(new.table_id)
        .await?
        .ok_or(AppError::NotFound("Стол не найден"))?;

    let reservation = match storage.create_reservation(new).await {
        Ok(r) => r,
        Err(e) => {
            warn!("create_reservation rejected for table {}: {}", table.id, e);
            return Err(e.into());
        }
    };

    if reservation.is_active() && table.status == TableStatus::Available {
        storage
            .update_table(table.id, &TablePatch::status(TableStatus::Reserved))
            .await?;
    }

    info!(
        "Reservation {} created for table {} at {} {}",
        reservation.id, reservation.table_id, reservation.date, reservation.time
    );
    Ok(reservation)
}

pub async fn update(
    storage: &dyn Storage,
    id: i32,
    patch: ReservationPatch,
) -> Result<Reservation, AppError> {
    patch.validate()?;
    if let Some(date) = &patch.date {
        check_date(date)?;
    }
    if let Some(time) = &patch.time {
        check_time(time)?;
    }

    let before = storage
        .get_reservation(id)
        .await?
        .ok_or(AppError::NotFound("Бронирование не найдено"))?;
    let after = storage
        .update_reservation(id, &patch)
        .await?
        .ok_or(AppError::NotFound("Бронирование не найдено"))?;

    match (before.is_active(), after.is_active()) {
        (true, false) => release_table(storage, after.table_id).await?,
        (false, true) => reserve_table(storage, after.table_id).await?,
        _ => {}
    }
    Ok(after)
}

pub async fn delete(storage: &dyn Storage, id: i32) -> Result<(), AppError> {
    let removed = storage
        .delete_reservation(id)
        .await?
        .ok_or(AppError::NotFound("Бронирование не найдено"))?;
    if removed.is_active() {
        release_table(storage, removed.table_id).await?;
    }
    info!("Reservation {} deleted", id);
    Ok(())
}

async fn reserve_table(storage: &dyn Storage, table_id: i32) -> Result<(), AppError> {
    if let Some(table) = storage.get_table(table_id).await? {
        if table.status == TableStatus::Available {
            storage
                .update_table(table_id, &TablePatch::status(TableStatus::Reserved))
                .await?;
        }
    }
    Ok(())
}

async fn release_table(storage: &dyn Storage, table_id: i32) -> Result<(), AppError> {
    let still_booked = storage
        .reservations_for_table(table_id)
        .await?
        .iter()
        .any(|r| r.is_active());
    if still_booked {
        return Ok(());
    }
    if let Some(table) = storage.get_table(table_id).await? {
        if table.status == TableStatus::Reserved {
            storage
                .update_table(table_id, &TablePatch::status(TableStatus::Available))
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReservationStatus;
    use crate::storage::MemoryStorage;

    fn booking(table_id: i32, time: &str) -> NewReservation {
        NewReservation {
            table_id,
            customer_name: "Нурлан".to_string(),
            customer_phone: "+77070000000".to_string(),
            guests: 3,
            date: "2026-10-19".to_string(),
            time: time.to_string(),
            duration: 120,
            comment: Some("у окна".to_string()),
            status: ReservationStatus::Active,
        }
    }

    async fn status_of(store: &MemoryStorage, id: i32) -> TableStatus {
        store.get_table(id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn booking_reserves_and_cancelling_releases() {
        let store = MemoryStorage::seeded();
        let first = create(&store, booking(1, "18:00")).await.unwrap();
        let second = create(&store, booking(1, "21:00")).await.unwrap();
        assert_eq!(status_of(&store, 1).await, TableStatus::Reserved);

        let cancel = ReservationPatch {
            status: Some(ReservationStatus::Cancelled),
            ..Default::default()
        };
        update(&store, first.id, cancel).await.unwrap();
        assert_eq!(status_of(&store, 1).await, TableStatus::Reserved);

        delete(&store, second.id).await.unwrap();
        assert_eq!(status_of(&store, 1).await, TableStatus::Available);
    }

    #[tokio::test]
    async fn occupied_table_is_left_alone() {
        let store = MemoryStorage::seeded();
        store
            .update_table(2, &TablePatch::status(TableStatus::Occupied))
            .await
            .unwrap();
        let r = create(&store, booking(2, "19:00")).await.unwrap();
        assert_eq!(status_of(&store, 2).await, TableStatus::Occupied);
        delete(&store, r.id).await.unwrap();
        assert_eq!(status_of(&store, 2).await, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn rejects_unknown_table_and_bad_time() {
        let store = MemoryStorage::seeded();
        assert!(matches!(
            create(&store, booking(404, "19:00")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            create(&store, booking(1, "7pm")).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn same_slot_conflicts() {
        let store = MemoryStorage::seeded();
        create(&store, booking(3, "20:00")).await.unwrap();
        assert!(matches!(
            create(&store, booking(3, "20:00")).await,
            Err(AppError::Conflict(_))
        ));
    }
}
