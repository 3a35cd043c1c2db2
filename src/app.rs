use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/timeline/seek", post(handlers::seek_form))
        .route("/timeline/toggle", post(handlers::toggle_form))
        .route("/timeline/layers", post(handlers::layers_form))
        .route("/api/view", get(handlers::get_view))
        .route("/api/seek", post(handlers::seek))
        .route("/api/play", post(handlers::play))
        .route("/api/pause", post(handlers::pause))
        .route("/api/toggle", post(handlers::toggle))
        .route("/api/layers", post(handlers::set_layers))
        .with_state(state)
}
