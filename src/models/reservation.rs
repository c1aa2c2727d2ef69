use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

use super::table::UnknownVariant;

pub const DEFAULT_DURATION_MINUTES: i32 = 120;
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ReservationStatus::Active),
            "completed" => Ok(ReservationStatus::Completed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i32,
    pub table_id: i32,
    pub customer_name: String,
    pub customer_phone: String,
    pub guests: i32,
    pub date: String,
    pub time: String,
    pub duration: i32,
    pub comment: Option<String>,
    pub status: ReservationStatus,
    pub created_at: NaiveDateTime,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }
}

fn default_duration() -> i32 {
    DEFAULT_DURATION_MINUTES
}

// POST /api/reservations
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewReservation {
    #[validate(range(min = 1))]
    pub table_id: i32,
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[validate(length(min = 1))]
    pub customer_phone: String,
    #[validate(range(min = 1))]
    pub guests: i32,
    pub date: String,
    pub time: String,
    #[serde(default = "default_duration")]
    #[validate(range(min = 1))]
    pub duration: i32,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub status: ReservationStatus,
}

impl NewReservation {
    pub fn into_reservation(self, id: i32, created_at: NaiveDateTime) -> Reservation {
        Reservation {
            id,
            table_id: self.table_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            guests: self.guests,
            date: self.date,
            time: self.time,
            duration: self.duration,
            comment: self.comment,
            status: self.status,
            created_at,
        }
    }
}

// PATCH /api/reservations/{id}
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ReservationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub customer_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub guests: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
}

impl ReservationPatch {
    pub fn apply_to(&self, reservation: &mut Reservation) {
        if let Some(name) = &self.customer_name {
            reservation.customer_name = name.clone();
        }
        if let Some(phone) = &self.customer_phone {
            reservation.customer_phone = phone.clone();
        }
        if let Some(guests) = self.guests {
            reservation.guests = guests;
        }
        if let Some(date) = &self.date {
            reservation.date = date.clone();
        }
        if let Some(time) = &self.time {
            reservation.time = time.clone();
        }
        if let Some(duration) = self.duration {
            reservation.duration = duration;
        }
        if let Some(comment) = &self.comment {
            reservation.comment = Some(comment.clone());
        }
        if let Some(status) = self.status {
            reservation.status = status;
        }
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, TIME_FORMAT).ok()
}

/// A slot is taken when the same table already holds an active reservation
/// with exactly the same date and time strings.
pub fn slot_taken<'a, I>(existing: I, table_id: i32, date: &str, time: &str) -> bool
where
    I: IntoIterator<Item = &'a Reservation>,
{
    existing
        .into_iter()
        .any(|r| r.table_id == table_id && r.is_active() && r.date == date && r.time == time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reservation(id: i32, time: &str, status: ReservationStatus) -> Reservation {
        Reservation {
            id,
            table_id: 3,
            customer_name: "Айгерим".to_string(),
            customer_phone: "+77010000000".to_string(),
            guests: 2,
            date: "2026-10-19".to_string(),
            time: time.to_string(),
            duration: DEFAULT_DURATION_MINUTES,
            comment: None,
            status,
            created_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn slot_taken_matches_exact_time_only() {
        let existing = vec![reservation(1, "19:00", ReservationStatus::Active)];
        assert!(slot_taken(&existing, 3, "2026-10-19", "19:00"));
        assert!(!slot_taken(&existing, 3, "2026-10-19", "19:30"));
        assert!(!slot_taken(&existing, 4, "2026-10-19", "19:00"));
        assert!(!slot_taken(&existing, 3, "2026-10-20", "19:00"));
    }

    #[test]
    fn cancelled_reservations_free_the_slot() {
        let existing = vec![reservation(1, "19:00", ReservationStatus::Cancelled)];
        assert!(!slot_taken(&existing, 3, "2026-10-19", "19:00"));
    }

    #[test]
    fn date_and_time_formats() {
        assert!(parse_date("2026-10-19").is_some());
        assert!(parse_date("19.10.2026").is_none());
        assert!(parse_time("09:30").is_some());
        assert!(parse_time("25:00").is_none());
    }

    #[test]
    fn new_reservation_defaults() {
        let new: NewReservation = serde_json::from_value(serde_json::json!({
            "table_id": 3,
            "customer_name": "Ержан",
            "customer_phone": "+77020000000",
            "guests": 4,
            "date": "2026-10-19",
            "time": "20:00"
        }))
        .unwrap();
        assert_eq!(new.duration, DEFAULT_DURATION_MINUTES);
        assert_eq!(new.status, ReservationStatus::Active);
        assert!(new.validate().is_ok());
    }
}
