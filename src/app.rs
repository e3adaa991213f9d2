use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/topics",
            get(handlers::list_topics)
                .post(handlers::create_topic)
                .delete(handlers::clear_topics),
        )
        .route(
            "/api/topics/:id",
            get(handlers::get_topic)
                .patch(handlers::update_topic)
                .delete(handlers::delete_topic),
        )
        .route("/api/summaries", get(handlers::list_summaries))
        .route("/api/topics/:id/heatmap", get(handlers::get_heatmap))
        .route("/api/topics/:id/entries/:date", put(handlers::set_entry))
        .route("/api/export", get(handlers::export_topics))
        .route("/api/import", post(handlers::import_topics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
