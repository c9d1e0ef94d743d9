use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::*;
use crate::app_state::AppState;

pub fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/calendar", get(calendar_view))
        .route("/reservations/prearrival", post(send_prearrival))
        .route("/reservations/no-show-sweep", post(no_show_sweep))
        .route("/reservations/{id}", get(get_reservation))
        .route("/reservations/{id}/confirm", post(confirm_reservation))
        .route("/reservations/{id}/guarantee", post(guarantee_reservation))
        .route("/reservations/{id}/check-in", post(check_in_reservation))
        .route("/reservations/{id}/check-out", post(check_out_reservation))
        .route("/reservations/{id}/cancel", post(cancel_reservation))
        .route("/reservations/{id}/no-show", post(mark_no_show))
        .route("/reservations/{id}/notes", post(update_notes))
        .route("/reservations/{id}/rooms", post(attach_room))
        .route("/reservations/{id}/guests", post(add_guest))
        .route(
            "/reservations/{id}/guests/{guest_id}/captures",
            post(upload_capture),
        )
        .route("/reservations/{id}/charges", post(post_charge))
        .route("/reservations/{id}/payments", post(post_payment))
}
