//! Documentation of the cautela (material checkout) gateway.
//!
//! # General Infrastructure
//! - Browser talks only to this gateway
//! - Gateway talks to the cautela backend, which owns all loans, signatures and users
//! - Nothing is persisted here, every list is a fresh snapshot from the backend
//! - Backend base URL comes from `CAUTELA_API_URL`
//!
//!
//!
//! # Flow
//!
//! 1. Admin logs in, backend issues a JWT
//! 2. Admin registers a loan (cautela), backend answers with a signing link
//! 3. Link is shared (copied or as a QR code) with the responsible party
//! 4. Responsible party opens the link, draws a signature and takes a photo
//! 5. Loan goes from `pendente` to `cautelado`
//! 6. For durable material, admin later asks for a return link (descautela)
//! 7. Same signing flow closes the loan as `descautelado`
//! 8. History lists every signature event for a loan
//!
//!
//!
//! # Why a Gateway
//!
//! The admin screen used to pull every loan and filter in the browser. The
//! gateway runs that same pipeline (`query` crate) next to the backend, so
//! the browser gets back only what it will render.
//!
//! It is also the one place where request bodies are checked and stale
//! sessions are turned away before they cost a backend round trip.
//!
//!
//!
//! # Routes
//!
//! | Route | Session | |
//! |---|---|---|
//! | `GET /health` | no | liveness |
//! | `POST /auth/login` | no | forwarded |
//! | `POST /auth/logout` | yes | forwarded |
//! | `GET /cautelas` | yes | snapshot + `busca`/`status`/`tipo`/`ordenacao` |
//! | `POST /cautelas` | yes | validated, forwarded |
//! | `GET /cautelas/{id}` | no | signing page lookup |
//! | `POST /cautelas/{id}/descautelar` | yes | return link |
//! | `GET /cautelas/{id}/historico` | yes | history + `busca`/`status`/`ordenacao` |
//! | `POST /assinaturas/{uuid}` | no | signature + photo, validated, up to `MAX_BODY_BYTES` |
//! | `GET/POST /users` | yes | user admin |
//! | `PUT/DELETE /users/{id}` | yes | user admin |
//! | `PUT /users/{id}/password` | yes | password reset |
//!
//!
//!
//! # Setup
//!
//! Run against a local backend.
//! ```sh
//! CAUTELA_API_URL=http://localhost:3001/api RUST_LOG=info cargo run -p cautela
//! ```
//!
//! Extra upstream payload logging.
//! ```sh
//! cargo run -p cautela --features verbose
//! ```
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post, put},
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod payloads;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;
pub mod upstream;

use config::Config;
use routes::*;
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(state.config.cors_max_age);

    let signature_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/health", get(health_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/cautelas", get(list_loans_handler).post(create_loan_handler))
        .route("/cautelas/{id}", get(get_loan_handler))
        .route("/cautelas/{id}/descautelar", post(check_in_handler))
        .route("/cautelas/{id}/historico", get(history_handler))
        .route(
            "/assinaturas/{uuid}",
            post(sign_handler).layer(signature_limit),
        )
        .route("/users", get(list_users_handler).post(create_user_handler))
        .route("/users/{id}", put(update_user_handler).delete(delete_user_handler))
        .route("/users/{id}/password", put(change_password_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config)?;
    info!("Forwarding to {}", state.upstream.base_url());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
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
}
