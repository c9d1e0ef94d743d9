use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct RoomStay {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub room_id: String,
    pub room_type: String,
    pub rate_plan: String,
    pub check_in: Date,
    pub check_out: Date,
    pub adults: i32,
    pub children: i32,
    pub created_at: OffsetDateTime,
}

/// A room stay joined with its parent reservation's status and code,
/// as read by the allocator's conflict check.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RoomStayBooking {
    pub reservation_id: Uuid,
    pub reservation_code: String,
    pub status: super::ReservationStatus,
    pub check_in: Date,
    pub check_out: Date,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRoomStay {
    #[validate(length(min = 1, message = "Room id must not be empty"))]
    pub room_id: String,
    #[validate(length(min = 1, message = "Room type must not be empty"))]
    pub room_type: String,
    #[validate(length(min = 1, message = "Rate plan must not be empty"))]
    pub rate_plan: String,
    pub check_in: Date,
    pub check_out: Date,
    #[validate(range(min = 1, message = "At least one adult is required"))]
    pub adults: i32,
    #[validate(range(min = 0, message = "Children count must not be negative"))]
    pub children: i32,
}
