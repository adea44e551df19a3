pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod observer;
pub mod permissions;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::SecurityConfig;
use crate::handlers::{categories, comments, followers, likes, posts, products, profiles, root};
pub use crate::state::AppState;

/// Build the full router for the given state
pub fn app(state: AppState) -> Router {
    let max_body_bytes = state.settings.api.max_request_size_bytes;
    let cors = cors_layer(&state.settings.security);
    let media_root = state.settings.media.root.clone();
    let media_url = state.settings.media.url.trim_end_matches('/').to_string();

    let router = Router::new()
        .route("/", get(root::root))
        .route("/health", get(root::health));

    let router = [
        ("/auth/registration", post(handlers::auth::registration_post)),
        ("/auth/login", post(handlers::auth::login_post)),
        ("/auth/user", get(handlers::auth::user_get)),
        ("/posts", get(posts::list).post(posts::create)),
        (
            "/posts/:id",
            get(posts::retrieve).put(posts::update).patch(posts::update).delete(posts::destroy),
        ),
        ("/comments", get(comments::list).post(comments::create)),
        (
            "/comments/:id",
            get(comments::retrieve)
                .put(comments::update)
                .patch(comments::update)
                .delete(comments::destroy),
        ),
        ("/likes", get(likes::list).post(likes::create)),
        ("/likes/:id", get(likes::retrieve).delete(likes::destroy)),
        ("/followers", get(followers::list).post(followers::create)),
        ("/followers/:id", get(followers::retrieve).delete(followers::destroy)),
        ("/profiles", get(profiles::list)),
        ("/profiles/:id", get(profiles::retrieve).put(profiles::update).patch(profiles::update)),
        ("/products", get(products::list).post(products::create)),
        (
            "/products/:id",
            get(products::retrieve)
                .put(products::update)
                .patch(products::update)
                .delete(products::destroy),
        ),
        ("/categories", get(categories::list).post(categories::create)),
        (
            "/categories/:id",
            get(categories::retrieve)
                .put(categories::update)
                .patch(categories::update)
                .delete(categories::destroy),
        ),
    ]
    .into_iter()
    .fold(router, |router, (path, handler)| slash_optional(router, path, handler));

    // Uploaded images are served locally unless MEDIA_URL points elsewhere
    let router = if media_url.starts_with('/') && media_url.len() > 1 {
        router.nest_service(&media_url, ServeDir::new(media_root))
    } else {
        router
    };

    router
        .layer(axum::middleware::from_fn(middleware::requester_middleware))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Register `path` and `path/` with the same handlers
fn slash_optional(router: Router<AppState>, path: &str, handler: MethodRouter<AppState>) -> Router<AppState> {
    router
        .route(path, handler.clone())
        .route(&format!("{}/", path), handler)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any)
    }
}
