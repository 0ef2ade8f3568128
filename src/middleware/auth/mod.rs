pub mod access;
pub mod authorize;

pub use authorize::AllowList;
