use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod engine;
mod events;
mod models;
mod routes;
mod schema;
mod store;

use config::AppConfig;
use engine::MatchEngine;
use events::RabbitNotifier;
use store::PgMatchStore;

use amora_shared::clients::rabbitmq::RabbitMqClient;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub struct AppState {
    pub config: AppConfig,
    pub rabbitmq: RabbitMqClient,
    pub engine: MatchEngine,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    amora_shared::middleware::init_tracing("amora-matching");

    let config = AppConfig::load()?;
    let port = config.port;

    let metrics_handle = amora_shared::middleware::init_metrics();

    // Database pool
    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    let db = Pool::builder().max_size(10).build(manager)?;

    // Infrastructure clients
    let rabbitmq = RabbitMqClient::connect(&config.rabbitmq_url).await?;

    let engine = MatchEngine::new(
        Arc::new(PgMatchStore::new(db)),
        Arc::new(RabbitNotifier::new(rabbitmq.clone())),
    );

    let state = Arc::new(AppState {
        config,
        rabbitmq,
        engine,
        metrics_handle,
    });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/feed", get(routes::feed::get_feed))
        .route("/search", get(routes::feed::search_users))
        .route("/like", post(routes::actions::like_user))
        .route("/pass", post(routes::actions::pass_user))
        .route("/matches", get(routes::matches::get_matches))
        .route("/liked-me", get(routes::matches::get_liked_me))
        .route("/boost", post(routes::boost::boost_profile))
        .route("/streak", post(routes::streak::update_streak))
        .route("/streak/seen", post(routes::streak::mark_streak_seen))
        .route("/profile", patch(routes::profile::update_profile))
        .route("/quiz", post(routes::profile::submit_quiz))
        .layer(axum::middleware::from_fn(
            amora_shared::middleware::metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "amora-matching starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
