use axum::{http::HeaderValue, middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Environment;
use crate::handlers;
use crate::middleware::{auth_layout_middleware, require_user_middleware};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        // Public
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        // Dashboard pages behind the auth layout
        .merge(dashboard_routes(state.clone()))
        // Protected API
        .merge(api_routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn dashboard_routes(state: AppState) -> Router<AppState> {
    use handlers::dashboard;

    Router::new()
        .route("/dashboard/session", get(dashboard::session))
        .route("/dashboard/overview", get(dashboard::overview))
        .route("/dashboard/transactions", get(dashboard::transactions))
        .route_layer(middleware::from_fn_with_state(state, auth_layout_middleware))
}

fn api_routes(state: AppState) -> Router<AppState> {
    use handlers::{categories, overview, transactions};

    Router::new()
        .route("/api/categories", get(categories::list).post(categories::create))
        .route(
            "/api/categories/:id",
            get(categories::get)
                .put(categories::put)
                .patch(categories::patch)
                .delete(categories::delete),
        )
        .route("/api/transactions", get(transactions::list).post(transactions::create))
        .route("/api/overview", get(overview::get))
        .route_layer(middleware::from_fn_with_state(state, require_user_middleware))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if state.config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new().allow_origin(origins).allow_credentials(true)
}
