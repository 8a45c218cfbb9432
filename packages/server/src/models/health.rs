use serde::Serialize;

/// Service identity returned by the unauthenticated health check.
#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(example = "fragments-server")]
    pub name: &'static str,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// Host the process runs on, `unknown` when not reported.
    #[schema(example = "ip-172-31-0-12")]
    pub hostname: String,
}
