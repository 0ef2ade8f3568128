/*
 * Responsibility
 * - The authenticated-request context as seen by handlers
 * - The access middleware inserts it into request extensions; handlers only
 *   ever receive this type
 *
 * Notes
 * - Token verification lives in services/auth and middleware/auth
 * - Lives for one request; never stored anywhere else
 */

use uuid::Uuid;

use crate::services::auth::Principal;

/// Context attached to an authenticated request.
///
/// - `user_id` is the internal user id
/// - `identifier` is the token subject that matched the principal
/// - `authorities` are copied from the principal as-is (may be empty)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: Uuid,
    pub identifier: String,
    pub authorities: Vec<String>,
}

impl AuthCtx {
    pub fn from_principal(principal: Principal) -> Self {
        Self {
            user_id: principal.id,
            identifier: principal.identifier,
            authorities: principal.authorities,
        }
    }
}
