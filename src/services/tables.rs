use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::error::AppError;
use crate::models::{hall, NewTable, Reservation, Table, TablePatch};
use crate::storage::Storage;

/// A table as the floor plan shows it for one date.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    #[serde(flatten)]
    pub table: Table,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_reservation: Option<Reservation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub today_reservations: Vec<Reservation>,
}

/// Attaches the reservations of `date` to their tables.
///
/// `reservations` is expected to hold one date only, sorted by time; the
/// current reservation is the earliest active one.
pub fn build_views(tables: Vec<Table>, reservations: &[Reservation]) -> Vec<TableView> {
    tables
        .into_iter()
        .map(|table| {
            let today: Vec<Reservation> = reservations
                .iter()
                .filter(|r| r.table_id == table.id)
                .cloned()
                .collect();
            let current_reservation = today.iter().find(|r| r.is_active()).cloned();
            TableView {
                table,
                current_reservation,
                today_reservations: today,
            }
        })
        .collect()
}

pub async fn list_views(
    storage: &dyn Storage,
    hall_id: Option<&str>,
    date: Option<&str>,
) -> Result<Vec<TableView>, AppError> {
    let tables = storage.list_tables(hall_id).await?;
    let reservations = match date {
        Some(date) => storage.list_reservations(Some(date)).await?,
        None => Vec::new(),
    };
    Ok(build_views(tables, &reservations))
}

pub async fn create(storage: &dyn Storage, new: NewTable) -> Result<Table, AppError> {
    new.validate()?;
    if !hall::is_known(&new.hall_id) {
        return Err(AppError::BadRequest(format!("Неизвестный зал: {}", new.hall_id)));
    }
    let table = storage.create_table(new).await?;
    info!("Created table {} (number {}) in hall {}", table.id, table.number, table.hall_id);
    Ok(table)
}

pub async fn update(storage: &dyn Storage, id: i32, patch: TablePatch) -> Result<Table, AppError> {
    patch.validate()?;
    let table = storage
        .update_table(id, &patch)
        .await?
        .ok_or(AppError::NotFound("Стол не найден"))?;
    info!("Updated table {}: {:?}", id, patch);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReservationStatus, TableShape, TableStatus};
    use chrono::NaiveDateTime;

    fn table(id: i32) -> Table {
        Table {
            id,
            number: id,
            hall_id: "white".to_string(),
            capacity: 4,
            x: 0,
            y: 0,
            width: 60,
            height: 60,
            status: TableStatus::Available,
            shape: TableShape::Round,
        }
    }

    fn reservation(id: i32, table_id: i32, time: &str, status: ReservationStatus) -> Reservation {
        Reservation {
            id,
            table_id,
            customer_name: "Асель".to_string(),
            customer_phone: "+77050000000".to_string(),
            guests: 2,
            date: "2026-10-19".to_string(),
            time: time.to_string(),
            duration: 120,
            comment: None,
            status,
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn current_reservation_is_first_active_of_the_day() {
        let reservations = vec![
            reservation(1, 1, "12:00", ReservationStatus::Completed),
            reservation(2, 1, "18:00", ReservationStatus::Active),
            reservation(3, 1, "21:00", ReservationStatus::Active),
        ];
        let views = build_views(vec![table(1), table(2)], &reservations);
        assert_eq!(views[0].current_reservation.as_ref().map(|r| r.id), Some(2));
        assert_eq!(views[0].today_reservations.len(), 3);
        assert!(views[1].current_reservation.is_none());
        assert!(views[1].today_reservations.is_empty());
    }

    #[test]
    fn view_serializes_flat() {
        let views = build_views(vec![table(5)], &[]);
        let json = serde_json::to_value(&views[0]).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["width"], 60);
        assert!(json.get("current_reservation").is_none());
    }
}
