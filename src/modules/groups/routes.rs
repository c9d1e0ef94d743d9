use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::*;
use crate::app_state::AppState;

pub fn group_routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route("/groups/{id}/status", post(set_group_status))
        .route("/groups/{id}/reservations", get(group_reservations))
}
