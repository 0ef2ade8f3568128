/*
 * Responsibility
 * - /topics handlers
 * - Path ids are public ids (decoded by the PublicTopicId extractor)
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::topics::{TopicRequest, TopicResponse},
        extractors::public_id::PublicTopicId,
    },
    error::AppError,
    repos::topic_repo::{self, TopicRow},
    services::id_codec::IdCodec,
    state::AppState,
};

pub(crate) fn to_response(codec: &IdCodec, row: TopicRow) -> Result<TopicResponse, AppError> {
    Ok(TopicResponse {
        id: codec.encode(row.id)?,
        description: row.description,
    })
}

fn to_responses(codec: &IdCodec, rows: Vec<TopicRow>) -> Result<Vec<TopicResponse>, AppError> {
    rows.into_iter().map(|row| to_response(codec, row)).collect()
}

pub async fn list_topics(
    State(state): State<AppState>,
) -> Result<Json<Vec<TopicResponse>>, AppError> {
    let rows = topic_repo::list(&state.db).await?;
    Ok(Json(to_responses(&state.id_codec, rows)?))
}

pub async fn get_topic(
    State(state): State<AppState>,
    topic_id: PublicTopicId,
) -> Result<Json<TopicResponse>, AppError> {
    let row = topic_repo::get(&state.db, topic_id.id)
        .await?
        .ok_or(AppError::not_found("topic"))?;

    Ok(Json(to_response(&state.id_codec, row)?))
}

pub async fn search_topics(
    State(state): State<AppState>,
    Path(description): Path<String>,
) -> Result<Json<Vec<TopicResponse>>, AppError> {
    let rows = topic_repo::search_by_description(&state.db, &description).await?;
    Ok(Json(to_responses(&state.id_codec, rows)?))
}

pub async fn create_topic(
    State(state): State<AppState>,
    Json(req): Json<TopicRequest>,
) -> Result<(StatusCode, Json<TopicResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let row = topic_repo::create(&state.db, req.description.trim()).await?;
    Ok((StatusCode::CREATED, Json(to_response(&state.id_codec, row)?)))
}

pub async fn update_topic(
    State(state): State<AppState>,
    topic_id: PublicTopicId,
    Json(req): Json<TopicRequest>,
) -> Result<Json<TopicResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let row = topic_repo::update(&state.db, topic_id.id, req.description.trim())
        .await?
        .ok_or(AppError::not_found("topic"))?;

    Ok(Json(to_response(&state.id_codec, row)?))
}

pub async fn delete_topic(
    State(state): State<AppState>,
    topic_id: PublicTopicId,
) -> Result<StatusCode, AppError> {
    if topic_repo::delete(&state.db, topic_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("topic"))
    }
}
