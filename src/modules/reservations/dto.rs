//! Request/response DTOs for the reservation surface. Loose form payloads
//! become tagged structs validated once at the boundary, before anything
//! reaches the state machine.

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;
use validator::Validate;

use super::capture::{CapturePresence, GateStatus};
use crate::db::{
    ActivityEvent, ChargeLine, Guest, NewGuest, NewRoomStay, Payment, Reservation,
    ReservationChannel, ReservationStatus, RoomStay,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuestMode {
    /// Guest details are supplied inline.
    New,
    /// Identity is copied from a guest already on file.
    Existing,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub guest_mode: GuestMode,
    pub guest_name: Option<String>,
    pub guest_mobile: Option<String>,
    pub guest_email: Option<String>,
    /// Required when `guest_mode` is `existing`.
    pub existing_guest_id: Option<Uuid>,
    pub channel: ReservationChannel,
    /// Staff may create a stay as `tentative` or `confirmed`; anything else
    /// is rejected.
    pub status: Option<ReservationStatus>,
    pub check_in: Date,
    pub check_out: Date,
    #[validate(range(min = 1, message = "At least one adult is required"))]
    pub adults: i32,
    #[validate(range(min = 0, message = "Children count must not be negative"))]
    pub children: i32,
    pub notes: Option<String>,
    pub currency: Option<String>,
    pub group_block_id: Option<Uuid>,
    #[serde(default)]
    #[validate(nested)]
    pub rooms: Vec<NewRoomStay>,
    #[serde(default)]
    #[validate(nested)]
    pub extra_guests: Vec<NewGuest>,
    /// Inline base64 biometric payloads for the main guest.
    pub bio_face_data: Option<String>,
    pub bio_id_front_data: Option<String>,
    pub bio_id_back_data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationListQuery {
    pub status: Option<ReservationStatus>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub q: Option<String>,
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReservationListResponse {
    pub page: i64,
    pub page_size: i64,
    pub items: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub ym: String,
    pub status: Option<ReservationStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckInRequest {
    #[serde(default)]
    pub override_capture: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNotesRequest {
    #[validate(length(max = 4000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CaptureUploadRequest {
    pub kind: crate::db::CaptureKind,
    #[validate(length(min = 1, message = "Image payload must not be empty"))]
    pub data: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PrearrivalRequest {
    #[validate(length(min = 1, message = "Guest name must not be empty"))]
    pub guest_name: String,
    #[validate(email(message = "Guest email must be valid"))]
    pub guest_email: String,
    pub channel: Option<ReservationChannel>,
    pub check_in: Date,
    pub check_out: Date,
    #[validate(range(min = 1, message = "At least one adult is required"))]
    pub adults: i32,
    #[validate(range(min = 0, message = "Children count must not be negative"))]
    pub children: i32,
}

#[derive(Debug, Serialize)]
pub struct PrearrivalResponse {
    pub reservation: Reservation,
    pub link: String,
    pub email_subject: String,
    pub email_body: String,
}

#[derive(Debug, Serialize)]
pub struct GuestView {
    #[serde(flatten)]
    pub guest: Guest,
    pub captures: CapturePresence,
}

#[derive(Debug, Serialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub rooms: Vec<RoomStay>,
    pub guests: Vec<GuestView>,
    pub capture_gate: GateStatus,
    pub charges: Vec<ChargeLine>,
    pub payments: Vec<Payment>,
    pub activity: Vec<ActivityEvent>,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub reservation: Reservation,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub transitioned: usize,
    pub codes: Vec<String>,
}
