use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::IdentityVerifier;
use crate::config::{ApiConfig, SecurityConfig};
use crate::handlers::{self, todos};
use crate::middleware::{json_content_type, jwt_auth_middleware};
use crate::services::TodoService;

/// Dependencies shared by every request. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub service: TodoService,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(service: TodoService, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { service, verifier }
    }
}

impl FromRef<AppState> for TodoService {
    fn from_ref(state: &AppState) -> Self {
        state.service.clone()
    }
}

/// The full route table. Every response is JSON-typed.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(handlers::health))
        // Protected
        .merge(todo_routes(state.verifier.clone()))
        .layer(middleware::from_fn(json_content_type))
        .with_state(state)
}

fn todo_routes(verifier: Arc<dyn IdentityVerifier>) -> Router<AppState> {
    Router::new()
        .route(
            "/todos",
            get(todos::list).post(todos::create).put(todos::update),
        )
        .route("/todos/:id", delete(todos::delete))
        .route_layer(middleware::from_fn_with_state(verifier, jwt_auth_middleware))
}

/// Wrap the router in the transport layers selected by configuration.
pub fn with_http_layers(router: Router, api: &ApiConfig, security: &SecurityConfig) -> Router {
    let router = router.layer(
        ServiceBuilder::new()
            .layer(DefaultBodyLimit::max(api.max_request_size_bytes))
            .layer(cors_layer(security)),
    );

    if api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
