//! Dual-mode entrypoint: Lambda or local dev server.
//!
//! Detects Lambda runtime via `AWS_LAMBDA_RUNTIME_API` env var.
//! - Lambda: `lambda_http::run(app)`, API Gateway v2 to HTTP
//! - Local: `axum::serve(listener, app)`, plain TCP server

use std::env;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use todo_gate::config::Config;
use todo_gate::session::middleware::CookieLayer;
use todo_gate::todo::AnyStore;
use todo_gate::todo::dynamodb::DynamoDbStore;
use todo_gate::todo::memory::InMemoryStore;
use todo_gate::{AppState, create_app};

#[tokio::main]
async fn main() {
    let is_lambda = env::var("AWS_LAMBDA_RUNTIME_API").is_ok();

    // JSON for Lambda, pretty for local
    if is_lambda {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        let _ = dotenvy::dotenv();
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .init();
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if config.session_secret == "change-me-in-production" {
        tracing::warn!("SESSION_SECRET not set, using the development default");
    }

    let http_client = reqwest::Client::new();

    let todos: AnyStore = if config.todo_backend == "dynamodb" {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let dynamo_client = match config.dynamodb_endpoint.as_deref() {
            Some(endpoint) => {
                let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config)
                    .endpoint_url(endpoint)
                    .build();
                aws_sdk_dynamodb::Client::from_conf(dynamo_config)
            }
            None => aws_sdk_dynamodb::Client::new(&sdk_config),
        };
        tracing::info!(
            "Using DynamoDB todo backend (table: {})",
            config.dynamodb_table
        );
        AnyStore::DynamoDb(DynamoDbStore::new(
            dynamo_client,
            config.dynamodb_table.clone(),
        ))
    } else {
        tracing::info!("Using in-memory todo backend");
        AnyStore::Memory(InMemoryStore::new())
    };

    let cookie_layer = Arc::new(CookieLayer {
        secret: config.session_secret.clone(),
        https_only: config.session_https_only,
        cookie_domain: config.cookie_domain.clone(),
    });

    let state = Arc::new(AppState {
        config: config.clone(),
        http_client,
        todos: Arc::new(todos),
        cookie_layer,
    });

    let app = create_app(state);

    if is_lambda {
        tracing::info!("Starting in Lambda mode");
        if let Err(e) = lambda_http::run(app).await {
            tracing::error!("Lambda runtime error: {}", e);
            std::process::exit(1);
        }
    } else {
        let addr = format!("0.0.0.0:{}", config.port);
        tracing::info!("Starting local server on {}", addr);
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!("Failed to bind {}: {}", addr, e);
                std::process::exit(1);
            }
        };
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
            std::process::exit(1);
        }
    }
}
