/*
 * Responsibility
 * - SQLx access to the users table
 * - identifier is unique; duplicates surface as RepoError::Conflict
 */
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub identifier: String,
    pub password_hash: String,
    pub photo: Option<String>,
    pub authorities: Vec<String>,
}

pub async fn list(db: &PgPool) -> RepoResult<Vec<UserRow>> {
    let rows = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, identifier, password_hash, photo, authorities
        FROM users
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, identifier, password_hash, photo, authorities
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn find_by_identifier(db: &PgPool, identifier: &str) -> RepoResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, name, identifier, password_hash, photo, authorities
        FROM users
        WHERE identifier = $1
        "#,
    )
    .bind(identifier)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn create(
    db: &PgPool,
    name: &str,
    identifier: &str,
    password_hash: &str,
    photo: Option<&str>,
) -> RepoResult<UserRow> {
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (name, identifier, password_hash, photo)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, identifier, password_hash, photo, authorities
        "#,
    )
    .bind(name)
    .bind(identifier)
    .bind(password_hash)
    .bind(photo)
    .fetch_one(db)
    .await
    .map_err(RepoError::from_sqlx)
}

/// Partial update. `None` leaves a column alone; `photo` is tri-state.
pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    name: Option<&str>,
    identifier: Option<&str>,
    password_hash: Option<&str>,
    photo: Option<Option<&str>>,
) -> RepoResult<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET
            name = COALESCE($2, name),
            identifier = COALESCE($3, identifier),
            password_hash = COALESCE($4, password_hash),
            photo = CASE
                WHEN $5 = false THEN photo
                ELSE $6
            END
        WHERE id = $1
        RETURNING id, name, identifier, password_hash, photo, authorities
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(identifier)
    .bind(password_hash)
    .bind(photo.is_some())
    .bind(photo.flatten())
    .fetch_optional(db)
    .await
    .map_err(RepoError::from_sqlx)
}
