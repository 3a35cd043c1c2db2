use crate::errors::{AppError, TimelineError};
use crate::models::{LayerForm, LayerRequest, SeekForm, SeekRequest, ViewResponse};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.sync.view().await;
    Html(render_index(&view))
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    Json(state.sync.view().await)
}

pub async fn seek(
    State(state): State<AppState>,
    Json(payload): Json<SeekRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    let view = match (payload.index, payload.date) {
        (Some(index), _) => state.sync.seek(index).await?,
        (None, Some(date)) => state.sync.select_date(date.trim()).await?,
        (None, None) => return Err(TimelineError::MissingTarget.into()),
    };
    Ok(Json(view))
}

pub async fn play(State(state): State<AppState>) -> Result<Json<ViewResponse>, AppError> {
    Ok(Json(state.sync.play().await?))
}

pub async fn pause(State(state): State<AppState>) -> Result<Json<ViewResponse>, AppError> {
    Ok(Json(state.sync.pause().await?))
}

pub async fn toggle(State(state): State<AppState>) -> Result<Json<ViewResponse>, AppError> {
    Ok(Json(state.sync.toggle().await?))
}

pub async fn set_layers(
    State(state): State<AppState>,
    Json(payload): Json<LayerRequest>,
) -> Result<Json<ViewResponse>, AppError> {
    if payload.actual.is_none() && payload.predicted.is_none() {
        return Err(AppError::bad_request("expected 'actual' or 'predicted'"));
    }
    Ok(Json(state.sync.set_layers(payload).await?))
}

pub async fn seek_form(
    State(state): State<AppState>,
    Form(form): Form<SeekForm>,
) -> Result<Redirect, AppError> {
    state.sync.seek(form.index).await?;
    Ok(Redirect::to("/"))
}

pub async fn toggle_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.sync.toggle().await?;
    Ok(Redirect::to("/"))
}

pub async fn layers_form(
    State(state): State<AppState>,
    Form(form): Form<LayerForm>,
) -> Result<Redirect, AppError> {
    let request = LayerRequest {
        actual: Some(form.actual.is_some()),
        predicted: Some(form.predicted.is_some()),
    };
    state.sync.set_layers(request).await?;
    Ok(Redirect::to("/"))
}
