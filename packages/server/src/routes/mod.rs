mod v1;

use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health_check))
        .nest("/v1", v1::routes())
}
