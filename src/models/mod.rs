pub mod hall;
pub mod reservation;
pub mod table;

pub use hall::Hall;
pub use reservation::{NewReservation, Reservation, ReservationPatch, ReservationStatus};
pub use table::{Geometry, NewTable, Table, TablePatch, TableShape, TableStatus};
