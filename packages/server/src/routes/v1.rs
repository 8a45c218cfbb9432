use utoipa_axum::{router::OpenApiRouter, routes};

use crate::handlers::fragment;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(fragment::list_fragments, fragment::create_fragment))
        .routes(routes!(
            fragment::get_fragment,
            fragment::update_fragment,
            fragment::delete_fragment
        ))
        .routes(routes!(fragment::get_fragment_info))
}
