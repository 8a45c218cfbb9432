use common::{Fragment, FragmentListing};
use serde::{Deserialize, Serialize};

/// Query parameters for listing fragments.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ListFragmentsParams {
    /// `1` (or `true`) returns full metadata records instead of ids.
    #[param(example = "1")]
    pub expand: Option<String>,
}

impl ListFragmentsParams {
    pub fn expand(&self) -> bool {
        matches!(self.expand.as_deref(), Some("1" | "true"))
    }
}

/// Response DTO for a single fragment's metadata.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FragmentResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    pub fragment: Fragment,
}

impl From<Fragment> for FragmentResponse {
    fn from(fragment: Fragment) -> Self {
        Self {
            status: "ok",
            fragment,
        }
    }
}

/// Response DTO for listing fragments, ids or expanded records.
#[derive(Serialize, utoipa::ToSchema)]
pub struct FragmentListResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    pub fragments: FragmentListing,
}

/// Bare success acknowledgement.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}
