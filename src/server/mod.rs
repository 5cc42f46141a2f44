//! HTTP surface: router, login gate and server loop.

mod invoices;
mod login;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::actions::INVOICES_PATH;
use crate::auth::policy::login_redirect;
use crate::auth::{Access, SessionKeys, authorize};
use crate::config::Config;
use crate::db::InvoiceStore;
use crate::error::AppError;
use crate::invalidation::Invalidator;
use crate::ui::Renderer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvoiceStore>,
    pub invalidator: Invalidator,
    pub renderer: Arc<Renderer>,
    pub sessions: Arc<SessionKeys>,
}

impl AppState {
    pub fn new(store: Arc<dyn InvoiceStore>, config: &Config) -> Result<Self> {
        Ok(Self {
            store,
            invalidator: Invalidator::new(),
            renderer: Arc::new(Renderer::new()?),
            sessions: Arc::new(
                SessionKeys::new(&config.auth_secret, config.session_ttl_secs)
                    .with_secure(config.session_cookie_secure),
            ),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(login::landing))
        .route("/login", get(login::login_page).post(login::login))
        .route("/dashboard", get(dashboard))
        .route("/dashboard/logout", post(login::logout))
        .route(INVOICES_PATH, get(invoices::list))
        .route(
            "/dashboard/invoices/create",
            get(invoices::create_page).post(invoices::create),
        )
        .route(
            "/dashboard/invoices/:id/edit",
            get(invoices::edit_page).post(invoices::update),
        )
        .route("/dashboard/invoices/:id/delete", post(invoices::delete))
        .route("/dashboard/invoices/events", get(invoices::events))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), auth_gate))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs before every page: decides from the session cookie alone whether the
/// request proceeds, goes to the login page, or goes to the dashboard.
async fn auth_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = state.sessions.from_headers(request.headers());
    let path = request.uri().path();

    match authorize(session.is_some(), path) {
        Access::Allow => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        Access::Deny => {
            let target = request
                .uri()
                .path_and_query()
                .map_or(path, |pq| pq.as_str());
            debug!(target, "unauthenticated request sent to login");
            Redirect::to(&login_redirect(target)).into_response()
        }
        Access::Redirect(location) => Redirect::to(&location).into_response(),
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn dashboard() -> Redirect {
    Redirect::to(INVOICES_PATH)
}

async fn not_found() -> AppError {
    AppError::NotFound
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}
