//! Application router.
//!
//! Routes are nested under `/api/`, with blob serving at `/files` and
//! `/public`. Protected routes sit behind the bearer-session middleware;
//! sign-up, sign-in, account deletion (service-key-gated), and blob serving
//! are open.

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    // Protected routes: session middleware reads ApiContext from extensions,
    // handlers take it as state.
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route("/auth/session", get(endpoints::auth::session))
        .route("/auth/change-password", post(endpoints::auth::change_password))
        .route("/documents", post(endpoints::documents::upload))
        .route("/documents", get(endpoints::documents::list))
        .route("/documents/:id", delete(endpoints::documents::delete))
        .route("/documents/:id/result", get(endpoints::documents::result))
        .route(
            "/documents/:id/regenerate",
            post(endpoints::documents::regenerate),
        )
        .route("/results", get(endpoints::documents::results))
        .route("/progress", get(endpoints::documents::progress))
        .route("/dashboard", get(endpoints::dashboard::summary))
        .route("/ocr", post(endpoints::ocr::extract))
        .route("/profile", get(endpoints::profiles::get))
        .route("/profile", put(endpoints::profiles::update))
        .route("/exports/:format", get(endpoints::exports::download))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_session))
        .layer(axum::Extension(ctx.clone()));

    let open = Router::new()
        .route("/auth/signup", post(endpoints::auth::signup))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/delete-account", post(endpoints::auth::delete_account))
        .with_state(ctx.clone());

    let blobs = Router::new()
        .route("/files/:token", get(endpoints::files::signed))
        .route("/public/*key", get(endpoints::files::public))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected)
        .nest("/api", open)
        .merge(blobs)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
