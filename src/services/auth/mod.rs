/*
 * Responsibility
 * - Bearer token issue/verify (token)
 * - Per-request authentication decision (authenticator)
 * - Principal lookup seam (principal), password hashing (password)
 */
pub mod authenticator;
pub mod factory;
pub mod password;
pub mod principal;
pub mod token;

pub use authenticator::{Authenticator, Outcome};
pub use factory::build_authenticator;
pub use principal::{PgPrincipalStore, Principal};
pub use token::{TokenError, TokenService};
