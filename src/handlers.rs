use crate::errors::AppError;
use crate::heatmap::{month_grids, project, Layout};
use crate::models::{
    EntryUpdate, HeatmapResponse, ImportResponse, NewTopic, Topic, TopicPatch, TopicSummary,
};
use crate::state::AppState;
use crate::stats::summarize;
use crate::ui::render_index;
use crate::validation::parse_date;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::warn;

const EXPORT_FILENAME: &str = "heatmap-data.json";

#[derive(Debug, Default, Deserialize)]
pub struct HeatmapQuery {
    #[serde(default)]
    pub layout: Layout,
    pub today: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub today: Option<String>,
}

pub async fn index() -> Html<String> {
    Html(render_index(local_today()))
}

pub async fn list_topics(State(state): State<AppState>) -> Json<Vec<Topic>> {
    let store = state.store.lock().await;
    Json(store.list().to_vec())
}

pub async fn list_summaries(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<Vec<TopicSummary>>, AppError> {
    let Query(query) = query?;
    let today = resolve_today(query.today.as_deref())?;
    let store = state.store.lock().await;
    Ok(Json(summarize(store.list(), today)))
}

pub async fn get_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Topic>, AppError> {
    let store = state.store.lock().await;
    Ok(Json(store.get(&id)?.clone()))
}

pub async fn create_topic(
    State(state): State<AppState>,
    payload: Result<Json<NewTopic>, JsonRejection>,
) -> Result<(StatusCode, Json<Topic>), AppError> {
    let Json(new) = payload?;
    let mut store = state.store.lock().await;
    let topic = store.create(new).await?;
    Ok((StatusCode::CREATED, Json(topic)))
}

pub async fn update_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TopicPatch>, JsonRejection>,
) -> Result<Json<Topic>, AppError> {
    let Json(patch) = payload?;
    let mut store = state.store.lock().await;
    Ok(Json(store.update(&id, patch).await?))
}

pub async fn delete_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_topics(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    store.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_entry(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, String)>,
    payload: Result<Json<EntryUpdate>, JsonRejection>,
) -> Result<Json<Topic>, AppError> {
    let Json(update) = payload?;
    let date = parse_date(&date)?;
    let mut store = state.store.lock().await;
    Ok(Json(store.set_entry(&id, date, update.value).await?))
}

pub async fn get_heatmap(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<HeatmapQuery>, QueryRejection>,
) -> Result<Json<HeatmapResponse>, AppError> {
    let Query(query) = query?;
    let today = resolve_today(query.today.as_deref())?;

    let store = state.store.lock().await;
    let topic = store.get(&id)?;
    let projection = project(&topic.data, today);
    let (cells, years) = match query.layout {
        Layout::Strip => (Some(projection.cells), None),
        Layout::Months => (None, Some(month_grids(&topic.data, today, &projection.scale))),
    };

    Ok(Json(HeatmapResponse {
        topic_id: topic.id.clone(),
        name: topic.name.clone(),
        unit: topic.unit.clone(),
        today,
        max_value: projection.scale.max_value(),
        stats: projection.stats,
        cells,
        years,
    }))
}

pub async fn export_topics(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().await;
    let disposition = format!("attachment; filename=\"{EXPORT_FILENAME}\"");
    (
        [(header::CONTENT_DISPOSITION, disposition)],
        Json(store.export_all()),
    )
}

pub async fn import_topics(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(AppError::bad_request_from)? {
        if field.name() == Some("file") {
            upload = Some(field.bytes().await.map_err(AppError::bad_request_from)?);
            break;
        }
    }
    let Some(bytes) = upload else {
        return Err(AppError::bad_request("No file provided"));
    };

    let payload: serde_json::Value = serde_json::from_slice(&bytes).map_err(|err| {
        warn!("rejected import: {err}");
        AppError::bad_request(format!("import file is not valid JSON: {err}"))
    })?;

    let mut store = state.store.lock().await;
    let topics = store.import_all(&payload).await?;
    Ok(Json(ImportResponse {
        message: "Data imported successfully".to_string(),
        topics,
    }))
}

fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        Some(raw) => Ok(parse_date(raw)?),
        None => Ok(local_today()),
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
