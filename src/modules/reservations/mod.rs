//! The reservation engine: lifecycle state machine, room-stay allocation,
//! calendar projection and the guest capture gate, plus their HTTP surface.

pub mod allocator;
pub mod calendar;
pub mod capture;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod routes;

pub use error::{validate_stay_range, ReservationError};
pub use routes::reservation_routes;

/// Fixed page size for reservation listings.
pub const PAGE_SIZE: i64 = 25;
