/*
 * Responsibility
 * - topics CRUD
 * - deleting a topic cascades to its posts (FK ON DELETE CASCADE)
 */
use sqlx::{FromRow, PgPool};

use crate::repos::contains_pattern;
use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct TopicRow {
    pub id: i64,
    pub description: String,
}

pub async fn list(db: &PgPool) -> RepoResult<Vec<TopicRow>> {
    let rows = sqlx::query_as::<_, TopicRow>(
        r#"
        SELECT id, description
        FROM topics
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> RepoResult<Option<TopicRow>> {
    let row = sqlx::query_as::<_, TopicRow>(
        r#"
        SELECT id, description
        FROM topics
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn exists(db: &PgPool, id: i64) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM topics WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await?;

    Ok(found)
}

/// Case-insensitive literal substring match on the description.
pub async fn search_by_description(db: &PgPool, needle: &str) -> RepoResult<Vec<TopicRow>> {
    let rows = sqlx::query_as::<_, TopicRow>(
        r#"
        SELECT id, description
        FROM topics
        WHERE description ILIKE $1 ESCAPE '\'
        ORDER BY id
        "#,
    )
    .bind(contains_pattern(needle))
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn create(db: &PgPool, description: &str) -> RepoResult<TopicRow> {
    let row = sqlx::query_as::<_, TopicRow>(
        r#"
        INSERT INTO topics (description)
        VALUES ($1)
        RETURNING id, description
        "#,
    )
    .bind(description)
    .fetch_one(db)
    .await?;

    Ok(row)
}

pub async fn update(db: &PgPool, id: i64, description: &str) -> RepoResult<Option<TopicRow>> {
    let row = sqlx::query_as::<_, TopicRow>(
        r#"
        UPDATE topics
        SET description = $2
        WHERE id = $1
        RETURNING id, description
        "#,
    )
    .bind(id)
    .bind(description)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn delete(db: &PgPool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM topics WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;

    Ok(result.rows_affected() > 0)
}
