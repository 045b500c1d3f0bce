mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::config::Config;
use crate::db::db::DBClient;
use crate::routes::create_router;
use crate::service::{
    background_jobs::start_earnings_release_job, bid_service::BidService,
    case_service::CaseService, consultation_service::ConsultationService,
    earnings_service::EarningsService, escrow_service::EscrowService,
    notification_service::NotificationService,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub case_service: Arc<CaseService>,
    pub bid_service: Arc<BidService>,
    pub escrow_service: Arc<EscrowService>,
    pub earnings_service: Arc<EarningsService>,
    pub consultation_service: Arc<ConsultationService>,
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client = Arc::new(db_client);

        let notification_service = Arc::new(NotificationService::new(db_client.clone()));
        let earnings_service = Arc::new(EarningsService::new(
            db_client.clone(),
            notification_service.clone(),
            &config,
        ));
        let case_service = Arc::new(CaseService::new(db_client.clone()));
        let bid_service = Arc::new(BidService::new(
            db_client.clone(),
            notification_service.clone(),
        ));
        let escrow_service = Arc::new(EscrowService::new(
            db_client.clone(),
            notification_service.clone(),
            &config,
        ));
        let consultation_service = Arc::new(ConsultationService::new(
            db_client.clone(),
            earnings_service.clone(),
            notification_service.clone(),
        ));

        Self {
            env: config,
            db_client,
            case_service,
            bid_service,
            escrow_service,
            earnings_service,
            consultation_service,
            notification_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Failed to run migrations: {:?}", err);
        std::process::exit(1);
    }

    let db_client = DBClient::new(pool);
    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    tokio::spawn(start_earnings_release_job(
        app_state.earnings_service.clone(),
    ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ]);

    let app = create_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind port {}: {:?}", config.port, e);
            std::process::exit(1);
        });

    tracing::info!("Server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {:?}", err);
    }
}
