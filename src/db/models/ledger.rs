use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use time::{Date, OffsetDateTime};
use validator::Validate;

// Ledger rows are append-only: inserted once, never mutated.

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ChargeLine {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub charge_date: Date,
    pub code: String,
    pub description: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub note: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub event_code: String,
    pub note: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewChargeLine {
    pub charge_date: Date,
    #[validate(length(min = 1, message = "Charge code must not be empty"))]
    pub code: String,
    pub description: Option<String>,
    /// Minor units (e.g. cents); sign follows the posting direction.
    pub amount: i64,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewPayment {
    #[validate(range(min = 1, message = "Payment amount must be positive"))]
    pub amount: i64,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    pub note: Option<String>,
}
