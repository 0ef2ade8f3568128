/*
 * Responsibility
 * - One tag type + alias per resource that is addressed by a public id
 * - No decode logic here (see core)
 */
use super::core::PublicId;

// Everything `pub` here is re-exported through mod.rs.

// posts
pub enum PostTag {}
pub type PublicPostId = PublicId<PostTag>;

// topics
pub enum TopicTag {}
pub type PublicTopicId = PublicId<TopicTag>;
