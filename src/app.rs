use axum::{middleware, routing::get, Json, Router};
use serde_json::json;

use crate::{
    app_state::AppState, middleware::tracing::observability_middleware,
    modules::groups::group_routes, modules::reservations::reservation_routes,
};

pub fn create_router(state: AppState) -> Router {
    let api = reservation_routes().merge(group_routes());

    let media_dir = state.env.media.dir.clone();

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .nest("/api", api)
        .nest_service(
            "/captures",
            tower_http::services::ServeDir::new(media_dir),
        )
        .layer(middleware::from_fn(observability_middleware))
        .with_state(state)
}

async fn hello() -> &'static str {
    "PMS Backend says hello!\n"
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    let telemetry_health = crate::telemetry::telemetry_health_check();

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
            "telemetry": telemetry_health
        }
    }))
}
