/*
 * Responsibility
 * - Tracing + panic hook
 * - Config -> pool + migrations -> services -> AppState
 * - Router assembly and layer order
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    api::{self, v1::handlers::health::health},
    config::Config,
    middleware::{
        self,
        auth::{AllowList, access, authorize},
    },
    services::{auth::build_authenticator, id_codec::IdCodec},
    state::AppState,
};

fn init_tracing() {
    // RUST_LOG wins, e.g. RUST_LOG=info,blog_api=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr may not be collected; tracing is.
        tracing::error!(?info, "panic");

        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        app_env = ?config.app_env,
        addr = %config.addr,
        token_validity_ms = config.token_validity.as_millis() as u64,
        "starting blog api"
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("connecting to postgres")?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("running migrations")?;

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;
    let auth = build_authenticator(config, db.clone());

    Ok(AppState::new(db, id_codec, auth))
}

/// Layer order, outermost first: http, security headers, CORS, access
/// (authenticate), authorize (allow-list gate), handlers.
fn build_router(state: AppState, config: &Config) -> Router {
    let auth = state.auth.clone();

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api::v1::routes())
        .with_state(state);

    let router = authorize::apply(router, Arc::new(AllowList::default()));
    let router = access::apply(router, auth);
    let router = middleware::cors::apply(router, config);
    let router = middleware::security_headers::apply(router);

    middleware::http::apply(router)
}
