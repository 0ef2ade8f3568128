use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct TopicRequest {
    pub description: String,
}

impl TopicRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.description.trim().is_empty() {
            return Err("description is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct TopicResponse {
    pub id: String, // encoded
    pub description: String,
}
