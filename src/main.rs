use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use explore_service::error::AppError;
use explore_service::handlers::explore_feed;
use explore_service::metrics::{serve_metrics, MetricsMiddleware};
use explore_service::store::PostgresStore;
use explore_service::{Config, FeedAggregator};

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "explore-service",
    }))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_line_number(true)
                .with_file(true),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting explore-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Database migration failed: {:#}", e);
        eprintln!("ERROR: Failed to run migrations: {}", e);
        std::process::exit(1);
    }
    info!("Database migrations applied");

    let store = Arc::new(PostgresStore::new(pool));
    let aggregator = web::Data::new(FeedAggregator::new(store));

    let port = config.app.port;
    info!("HTTP server listening on 0.0.0.0:{}", port);

    HttpServer::new(move || {
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::BadRequest(format!("Invalid request body: {}", err)).into()
        });

        App::new()
            .app_data(aggregator.clone())
            .app_data(json_config)
            .wrap(Cors::permissive())
            .wrap(MetricsMiddleware)
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(serve_metrics))
            .service(web::scope("/api/v1/feed").service(explore_feed))
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}
