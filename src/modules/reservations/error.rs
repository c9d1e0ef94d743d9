use thiserror::Error;
use time::Date;

use crate::db::ReservationStatus;

/// Routine, recoverable outcomes of front-desk operations. Each maps to a
/// user-visible rejection at the request boundary; none of them leaves a
/// partial mutation behind.
#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Check-out date must be after check-in date")]
    InvalidDateRange,

    #[error("Cannot {action} a reservation in status '{}'", .from.as_str())]
    InvalidTransition {
        from: ReservationStatus,
        action: &'static str,
    },

    #[error("Guest capture incomplete: {captured} of {expected} guests on file")]
    CaptureIncomplete { captured: i64, expected: i64 },

    #[error("Room {room_id} is already booked by reservation {conflicting_code} for overlapping nights")]
    RoomConflict {
        room_id: String,
        conflicting_code: String,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for ReservationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ReservationError::Validation(errors.to_string())
    }
}

/// Stays are half-open `[check_in, check_out)`: at least one night, so the
/// range must be strictly increasing. Every handler accepting a date range
/// funnels through this check.
pub fn validate_stay_range(check_in: Date, check_out: Date) -> Result<(), ReservationError> {
    if check_in >= check_out {
        return Err(ReservationError::InvalidDateRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn stay_range_must_be_strictly_increasing() {
        validate_stay_range(date!(2025 - 04 - 01), date!(2025 - 04 - 02)).unwrap();

        // Zero-length and inverted ranges both fail with the same error.
        for (check_in, check_out) in [
            (date!(2025 - 04 - 02), date!(2025 - 04 - 02)),
            (date!(2025 - 04 - 03), date!(2025 - 04 - 02)),
        ] {
            assert!(matches!(
                validate_stay_range(check_in, check_out),
                Err(ReservationError::InvalidDateRange)
            ));
        }
    }
}
