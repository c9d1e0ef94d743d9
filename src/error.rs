use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::modules::reservations::ReservationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Reservation(#[from] ReservationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // A unique-constraint hit (e.g. a reservation code collision on the
        // same org and day) is an operator-visible conflict, not a fault.
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::Database(DatabaseError::Duplicate);
            }
        }
        AppError::Database(DatabaseError::Sqlx(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(err) => match err {
                DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                DatabaseError::Duplicate => (StatusCode::CONFLICT, "Resource already exists"),
                // Genuine datastore faults are the only 5xx surface.
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::Reservation(err) => match err {
                ReservationError::InvalidDateRange => (StatusCode::BAD_REQUEST, "Invalid date range"),
                ReservationError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "Invalid reservation transition")
                }
                ReservationError::CaptureIncomplete { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "Guest capture incomplete")
                }
                ReservationError::RoomConflict { .. } => (StatusCode::CONFLICT, "Room conflict"),
                ReservationError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
                ReservationError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            },
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
            AppError::InternalServerError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_rows_surface_as_conflict() {
        let response = AppError::Database(DatabaseError::Duplicate).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn plain_datastore_faults_stay_internal() {
        let response = AppError::from(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
