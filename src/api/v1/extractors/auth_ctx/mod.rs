/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Give handlers the context (AuthCtx) of an authenticated request
 * - axum-specific code stays in core, the type itself in types
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
