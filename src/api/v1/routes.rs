/*
 * Responsibility
 * - v1 URL layout (nested under /api/v1 by app.rs)
 * - Which of these need a token is decided by the allow-list in
 *   middleware/auth, not here
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    posts::{create_post, delete_post, get_post, list_posts, search_posts, update_post},
    topics::{create_topic, delete_topic, get_topic, list_topics, search_topics, update_topic},
    users::{get_user, list_users, login, register, update_self},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/all", get(list_users))
        .route("/users/update", put(update_self))
        .route("/users/{user_id}", get(get_user))
        .route("/topics", get(list_topics).post(create_topic))
        .route("/topics/description/{description}", get(search_topics))
        .route(
            "/topics/{id}",
            get(get_topic).put(update_topic).delete(delete_topic),
        )
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/title/{title}", get(search_posts))
        .route(
            "/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}
