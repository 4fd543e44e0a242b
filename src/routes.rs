use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, put},
    Extension, Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::handlers::{health, registers};
use crate::state::AppState;
use crate::types::RegisterKind;

pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .route("/api/test", get(health::health));

    for kind in RegisterKind::ALL {
        router = router.nest(&format!("/api/{}", kind.path_segment()), register_routes(kind));
    }

    let mut router = router
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .with_state(state.clone());

    // Global middleware
    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn register_routes(kind: RegisterKind) -> Router<AppState> {
    Router::new()
        .route("/", get(registers::list).post(registers::create))
        // Static segment wins over the :worker_id capture
        .route("/alerts", get(registers::alerts))
        .route(
            "/:worker_id",
            put(registers::update).delete(registers::delete),
        )
        .route("/:worker_id/complete-alert", put(registers::complete_alert))
        .route("/:worker_id/incomplete-alert", put(registers::incomplete_alert))
        .layer(Extension(kind))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    // A wildcard cannot be listed and cannot be combined with credentials
    if security.cors_origins.iter().any(|origin| origin.trim() == "*") {
        return base.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    base.allow_origin(origins).allow_credentials(true)
}
