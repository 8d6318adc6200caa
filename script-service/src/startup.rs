//! Application startup and lifecycle management.

use crate::config::ScriptConfig;
use crate::handlers;
use crate::middleware::auth_middleware;
use crate::services::providers::openai::{OpenAiSettings, OpenAiTextProvider};
use crate::services::providers::TextProvider;
use crate::services::{GenerationClient, MongoScriptStore, ScriptStore, TokenService};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, security_headers_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state. Every external dependency is injected here.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScriptStore>,
    pub generator: GenerationClient,
    pub tokens: TokenService,
}

pub fn build_router(state: AppState) -> Router {
    // Listing by owner and deleting by id share a path shape; only the GET
    // is guarded.
    let scripts_by_key = get(handlers::list_scripts_by_email)
        .route_layer(from_fn_with_state(state.clone(), auth_middleware))
        .delete(handlers::delete_script);

    Router::new()
        .route("/", get(handlers::liveness))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/jwt", post(handlers::issue_token))
        .route(
            "/scripts",
            get(handlers::list_scripts).post(handlers::create_script),
        )
        .route("/scripts/:key", scripts_by_key)
        .route("/specific-scripts/:id", get(handlers::get_script))
        .route("/edit-scripts/:id", put(handlers::edit_script))
        .with_state(state)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connect to MongoDB, wire the providers and bind the listener.
    pub async fn build(config: ScriptConfig) -> Result<Self, AppError> {
        let store = MongoScriptStore::connect(
            &config.mongodb.uri,
            &config.mongodb.database,
            &config.mongodb.collection,
        )
        .await?;

        store.health_check().await?;
        tracing::info!("Script service connected to MongoDB");

        store.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let provider = OpenAiTextProvider::new(OpenAiSettings {
            api_key: config.openai.api_key.clone(),
            base_url: config.openai.base_url.clone(),
            model: config.openai.model.clone(),
            timeout: Duration::from_secs(config.openai.timeout_secs),
        })
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e.to_string())))?;
        let provider: Arc<dyn TextProvider> = Arc::new(provider);

        tracing::info!(
            model = %config.openai.model,
            base_url = %config.openai.base_url,
            "Initialized chat completions provider"
        );

        let tokens = TokenService::new(&config.jwt).map_err(AppError::ConfigError)?;

        let state = AppState {
            store: Arc::new(store),
            generator: GenerationClient::new(provider, config.openai.word_limit),
            tokens,
        };

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Script service running on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl+C or SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
