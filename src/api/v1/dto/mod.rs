pub mod posts;
pub mod topics;
pub mod users;
