/*
 * Responsibility
 * - posts CRUD, always returned together with their topic
 * - updated_at is maintained here, not by callers
 */
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::repos::contains_pattern;
use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub updated_at: DateTime<Utc>,
    pub topic_id: i64,
    pub topic_description: String,
}

const SELECT_POST: &str = r#"
    SELECT
        p.id, p.title, p.text, p.updated_at,
        p.topic_id, t.description AS topic_description
    FROM posts p
    JOIN topics t ON t.id = p.topic_id
"#;

/// `limit: None` returns every post (`LIMIT NULL` is no limit).
pub async fn list(db: &PgPool, limit: Option<i64>, offset: i64) -> RepoResult<Vec<PostRow>> {
    let sql = format!("{SELECT_POST} ORDER BY p.id DESC LIMIT $1 OFFSET $2");
    let rows = sqlx::query_as::<_, PostRow>(&sql)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> RepoResult<Option<PostRow>> {
    let sql = format!("{SELECT_POST} WHERE p.id = $1");
    let row = sqlx::query_as::<_, PostRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;

    Ok(row)
}

/// Case-insensitive literal substring match on the title.
pub async fn search_by_title(db: &PgPool, needle: &str) -> RepoResult<Vec<PostRow>> {
    let sql = format!(r"{SELECT_POST} WHERE p.title ILIKE $1 ESCAPE '\' ORDER BY p.id DESC");
    let rows = sqlx::query_as::<_, PostRow>(&sql)
        .bind(contains_pattern(needle))
        .fetch_all(db)
        .await?;

    Ok(rows)
}

pub async fn create(db: &PgPool, title: &str, text: &str, topic_id: i64) -> RepoResult<PostRow> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO posts (title, text, topic_id)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(text)
    .bind(topic_id)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    // Just inserted; a miss here is a DB error.
    get(db, id)
        .await?
        .ok_or(RepoError::Db(sqlx::Error::RowNotFound))
}

pub async fn update(
    db: &PgPool,
    id: i64,
    title: &str,
    text: &str,
    topic_id: i64,
) -> RepoResult<Option<PostRow>> {
    let updated = sqlx::query(
        r#"
        UPDATE posts
        SET
            title = $2,
            text = $3,
            topic_id = $4,
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(text)
    .bind(topic_id)
    .execute(db)
    .await
    .map_err(RepoError::from_sqlx)?;

    if updated.rows_affected() == 0 {
        return Ok(None);
    }
    get(db, id).await
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(db)
    .await?;

    Ok(result.rows_affected() > 0)
}
