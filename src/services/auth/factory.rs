/// Factory: build the token service and request authenticator from `Config`.
use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::auth::{Authenticator, PgPrincipalStore, TokenService};

pub fn build_authenticator(config: &Config, pool: PgPool) -> Arc<Authenticator> {
    let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_validity));
    let principals = Arc::new(PgPrincipalStore::new(pool));

    Arc::new(Authenticator::new(tokens, principals))
}
