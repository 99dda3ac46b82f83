//! API route definitions.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;
use crate::handlers::{admin, events, health, subscriptions, sync};
use crate::middleware::identity_middleware;
use crate::state::AppState;

/// Creates the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.config.cors);

    // Public routes (no identity required)
    let public_routes = Router::new().route("/health", get(health::health_check));

    // Identity-bearing routes (subscriber and service surfaces)
    let protected_routes = Router::new()
        // Subscription routes
        .route(
            "/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route("/subscriptions/{id}", put(subscriptions::update_subscription))
        .route(
            "/subscriptions/{id}/disable",
            post(subscriptions::disable_subscription),
        )
        // Notification sync routes
        .route(
            "/notifications",
            get(sync::poll).delete(sync::clear_notifications),
        )
        .route("/notifications/read-all", post(sync::mark_all_read))
        .route("/notifications/{id}/read", post(sync::mark_read))
        // Inbound event surface
        .route("/events", post(events::ingest_event))
        .layer(middleware::from_fn(identity_middleware));

    // Admin routes (identity required, admin role checked per handler)
    let admin_routes = Router::new()
        .route("/subscribers/{id}", put(admin::upsert_subscriber))
        .route("/subscribers/{id}/quota", put(admin::update_quota))
        .route(
            "/subscribers/{id}/subscriptions",
            post(admin::create_subscription),
        )
        .route("/stats", get(admin::stats))
        .layer(middleware::from_fn(identity_middleware));

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .nest("/api/v1/admin", admin_routes)
        .layer(cors)
        .with_state(state)
}

/// Builds the CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age_secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use herald_core::subscriber::{InMemoryDirectory, SubscriberDirectory};
    use herald_engine::{AlertService, SenderRegistry, ServiceConfig};

    fn state() -> Arc<AppState> {
        let directory = Arc::new(InMemoryDirectory::new());
        let service = Arc::new(AlertService::new(
            Arc::clone(&directory) as Arc<dyn SubscriberDirectory>,
            SenderRegistry::new(),
            ServiceConfig::default(),
        ));
        Arc::new(AppState::new(ApiConfig::default(), service, directory))
    }

    #[test]
    fn test_create_router() {
        let _router = create_router(state());
    }

    #[test]
    fn test_build_cors_layer_disabled() {
        let config = CorsConfig {
            enabled: false,
            ..CorsConfig::default()
        };
        let _cors = build_cors_layer(&config);
    }
}
