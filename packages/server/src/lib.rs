pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{Http, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fragments API",
        version = "1.0.0",
        description = "Store small text and image fragments per user and fetch them converted"
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Fragments", description = "Fragment storage and conversion"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::LOCATION])
        .max_age(Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(routes::api_routes())
        .split_for_parts();

    let body_limit = DefaultBodyLimit::max(state.config.server.max_body_size);
    let cors = cors_layer(&state.config.server.cors);

    router
        .fallback(handlers::health::not_found)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
