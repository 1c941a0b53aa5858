use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
    typed_header::TypedHeaderRejection,
};

use std::sync::Arc;

use crate::{accounts, events, methods, packages, statistics};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolve Basic credentials into an [`engine::Account`] and stash it in the
/// request extensions. The engine resolver is the only identity check; the
/// server never looks at credential storage itself.
async fn auth(
    auth_header: Result<TypedHeader<Authorization<Basic>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // A missing or malformed header is an authentication failure, not a bad
    // request; answer 401 instead of the extractor's default rejection.
    let Ok(auth_header) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let account = state
        .engine
        .resolve_account(auth_header.username(), auth_header.password())
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

/// Build the full route tree. Public so tests and embedders can drive it
/// directly with `tower::ServiceExt::oneshot`.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/accounts", get(accounts::list))
        .route("/accounts/me", get(accounts::me))
        .route(
            "/accounts/{id}",
            patch(accounts::update).delete(accounts::remove),
        )
        .route("/packages", post(packages::create).get(packages::list))
        .route("/packages/events", get(events::subscribe))
        .route("/packages/{id}", get(packages::get))
        .route("/packages/{id}/cancel", post(packages::cancel))
        .route("/packages/{id}/status", patch(packages::set_status))
        .route("/methods", get(methods::list).post(methods::create))
        .route("/methods/{id}", delete(methods::remove))
        .route("/methods/{id}/rate", patch(methods::update_rate))
        .route("/statistics", get(statistics::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        // Signup joins after the auth layer: the only open route.
        .route("/accounts", post(accounts::signup))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
