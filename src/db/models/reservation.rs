use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "reservation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    PendingConfirmation,
    Tentative,
    Confirmed,
    Guaranteed,
    InHouse,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    /// Cancelled and no-show reservations admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ReservationStatus::Cancelled | ReservationStatus::NoShow)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::PendingConfirmation => "pending_confirmation",
            ReservationStatus::Tentative => "tentative",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Guaranteed => "guaranteed",
            ReservationStatus::InHouse => "in_house",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::NoShow => "no_show",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "reservation_channel", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReservationChannel {
    Direct,
    WalkIn,
    Phone,
    BookingCom,
    Expedia,
    OtherOta,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub org_id: Uuid,
    pub code: String,
    pub guest_name: String,
    pub guest_contact: Option<String>,
    pub channel: ReservationChannel,
    pub status: ReservationStatus,
    pub check_in: Date,
    pub check_out: Date,
    pub adults: i32,
    pub children: i32,
    pub notes: Option<String>,
    pub balance_due: i64,
    pub currency: String,
    pub group_block_id: Option<Uuid>,
    pub prearrival_token: Option<Uuid>,
    pub checked_in_at: Option<OffsetDateTime>,
    pub checked_out_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewReservation {
    pub org_id: Uuid,
    #[validate(length(min = 1, message = "Guest name must not be empty"))]
    pub guest_name: String,
    pub guest_contact: Option<String>,
    pub channel: ReservationChannel,
    pub status: ReservationStatus,
    pub check_in: Date,
    pub check_out: Date,
    #[validate(range(min = 1, message = "At least one adult is required"))]
    pub adults: i32,
    #[validate(range(min = 0, message = "Children count must not be negative"))]
    pub children: i32,
    pub notes: Option<String>,
    pub currency: String,
    pub group_block_id: Option<Uuid>,
    pub prearrival_token: Option<Uuid>,
}
