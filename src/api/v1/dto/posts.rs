/*
 * Responsibility
 * - Posts request/response DTO
 * - ids going out are encoded public ids (internal ids never leak)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::topics::TopicResponse;

const TITLE_LEN: std::ops::RangeInclusive<usize> = 5..=100;
const TEXT_LEN: std::ops::RangeInclusive<usize> = 10..=1000;

/// Body of both POST /posts and PUT /posts/{id}.
#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub title: String,
    pub text: String,
    /// Public id of an existing topic.
    pub topic_id: String,
}

impl PostRequest {
    /// Lengths are checked on the trimmed values, which is what gets stored.
    pub fn validate(&self) -> Result<(), &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("title is required");
        }
        if !TITLE_LEN.contains(&title.chars().count()) {
            return Err("title must be 5 to 100 characters");
        }
        let text = self.text.trim();
        if text.is_empty() {
            return Err("text is required");
        }
        if !TEXT_LEN.contains(&text.chars().count()) {
            return Err("text must be 10 to 1000 characters");
        }
        if self.topic_id.trim().is_empty() {
            return Err("topic_id is required");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: String, // encoded
    pub title: String,
    pub text: String,
    pub updated_at: DateTime<Utc>,
    pub topic: TopicResponse,
}
