/*
 * Responsibility
 * - /posts handlers
 * - Path ids and the body's topic_id are public ids; decoded before any query
 * - A post always references an existing topic (unknown topic -> 400)
 */
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    api::v1::{
        dto::posts::{PostRequest, PostResponse},
        extractors::public_id::PublicPostId,
        handlers::topics,
    },
    error::AppError,
    repos::{
        error::RepoError,
        post_repo::{self, PostRow},
        topic_repo::{self, TopicRow},
    },
    services::id_codec::IdCodec,
    state::AppState,
};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Optional paging for `GET /posts`. Without `page` and `size` every post is returned.
#[derive(Debug, Default, Deserialize)]
pub struct Page {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl Page {
    fn limit_offset(&self) -> (Option<i64>, i64) {
        if self.page.is_none() && self.size.is_none() {
            return (None, 0);
        }
        let size = self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = self.page.unwrap_or(0).max(0);
        (Some(size), page.saturating_mul(size))
    }
}

fn unknown_topic() -> AppError {
    AppError::bad_request("UNKNOWN_TOPIC", "topic does not exist")
}

// The topic can disappear between the existence check and the write.
fn write_error(e: RepoError) -> AppError {
    match e {
        RepoError::MissingReference => unknown_topic(),
        other => other.into(),
    }
}

fn to_response(codec: &IdCodec, row: PostRow) -> Result<PostResponse, AppError> {
    let topic = topics::to_response(
        codec,
        TopicRow {
            id: row.topic_id,
            description: row.topic_description,
        },
    )?;

    Ok(PostResponse {
        id: codec.encode(row.id)?,
        title: row.title,
        text: row.text,
        updated_at: row.updated_at,
        topic,
    })
}

fn to_responses(codec: &IdCodec, rows: Vec<PostRow>) -> Result<Vec<PostResponse>, AppError> {
    rows.into_iter().map(|row| to_response(codec, row)).collect()
}

/// Validates the body and resolves its topic to an existing internal id.
async fn checked_topic(state: &AppState, req: &PostRequest) -> Result<i64, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("VALIDATION", msg))?;

    let topic_id = state.id_codec.decode(req.topic_id.trim())?;
    if !topic_repo::exists(&state.db, topic_id).await? {
        return Err(unknown_topic());
    }
    Ok(topic_id)
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let (limit, offset) = page.limit_offset();
    let rows = post_repo::list(&state.db, limit, offset).await?;
    Ok(Json(to_responses(&state.id_codec, rows)?))
}

pub async fn get_post(
    State(state): State<AppState>,
    post_id: PublicPostId,
) -> Result<Json<PostResponse>, AppError> {
    let row = post_repo::get(&state.db, post_id.id)
        .await?
        .ok_or(AppError::not_found("post"))?;

    Ok(Json(to_response(&state.id_codec, row)?))
}

pub async fn search_posts(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let rows = post_repo::search_by_title(&state.db, &title).await?;
    Ok(Json(to_responses(&state.id_codec, rows)?))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(req): Json<PostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let topic_id = checked_topic(&state, &req).await?;

    let row = post_repo::create(&state.db, req.title.trim(), req.text.trim(), topic_id)
        .await
        .map_err(write_error)?;
    tracing::info!(post_id = row.id, topic_id, "post created");

    Ok((StatusCode::CREATED, Json(to_response(&state.id_codec, row)?)))
}

pub async fn update_post(
    State(state): State<AppState>,
    post_id: PublicPostId,
    Json(req): Json<PostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    let topic_id = checked_topic(&state, &req).await?;

    let row = post_repo::update(
        &state.db,
        post_id.id,
        req.title.trim(),
        req.text.trim(),
        topic_id,
    )
    .await
    .map_err(write_error)?
    .ok_or(AppError::not_found("post"))?;

    Ok(Json(to_response(&state.id_codec, row)?))
}

pub async fn delete_post(
    State(state): State<AppState>,
    post_id: PublicPostId,
) -> Result<StatusCode, AppError> {
    if post_repo::delete(&state.db, post_id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("post"))
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::post};
    use tower::ServiceExt;

    use super::*;

    fn page(page: Option<i64>, size: Option<i64>) -> Page {
        Page { page, size }
    }

    #[test]
    fn no_paging_params_returns_everything() {
        assert_eq!(Page::default().limit_offset(), (None, 0));
    }

    #[test]
    fn paging_is_opt_in_and_bounded() {
        assert_eq!(page(Some(2), Some(5)).limit_offset(), (Some(5), 10));
        assert_eq!(page(Some(1), None).limit_offset(), (Some(10), 10));
        assert_eq!(page(None, Some(3)).limit_offset(), (Some(3), 0));
        assert_eq!(page(Some(-3), Some(1000)).limit_offset(), (Some(100), 0));
    }

    #[test]
    fn topic_deleted_mid_write_is_unknown_topic() {
        assert!(matches!(
            write_error(RepoError::MissingReference),
            AppError::BadRequest { code: "UNKNOWN_TOPIC", .. }
        ));
        assert!(matches!(
            write_error(RepoError::Db(sqlx::Error::RowNotFound)),
            AppError::Internal
        ));
    }

    #[tokio::test]
    async fn create_rejects_malformed_topic_id() {
        let app = Router::new()
            .route("/posts", post(create_post))
            .with_state(AppState::for_tests());

        let response = app
            .oneshot(
                Request::post("/posts")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"title":"Hello","text":"a long enough body","topic_id":"!!"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "INVALID_PUBLIC_ID");
    }
}
