use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use common::convert::{self, Conversion};
use common::{Fragment, MediaType, NewFragment};
use tracing::{info, instrument};

use crate::config::ServerConfig;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::body::RawBody;
use crate::models::fragment::{
    FragmentListResponse, FragmentResponse, ListFragmentsParams, StatusResponse,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/fragments",
    tag = "Fragments",
    operation_id = "listFragments",
    summary = "List the caller's fragments",
    description = "Returns fragment ids in creation order, or full metadata records with `expand=1`.",
    params(ListFragmentsParams),
    responses(
        (status = 200, description = "Fragment ids or records", body = FragmentListResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
    ),
    security(("basic" = []), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.owner_id))]
pub async fn list_fragments(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListFragmentsParams>,
) -> Result<Json<FragmentListResponse>, AppError> {
    let fragments = state
        .store
        .list_by_owner(&auth_user.owner_id, params.expand())
        .await?;

    Ok(Json(FragmentListResponse {
        status: "ok",
        fragments,
    }))
}

#[utoipa::path(
    post,
    path = "/fragments",
    tag = "Fragments",
    operation_id = "createFragment",
    summary = "Create a fragment",
    description = "Stores the raw request body as a new fragment. The `Content-Type` header \
        declares the fragment type and must be one of the supported types.",
    request_body(content_type = "application/octet-stream", description = "Raw fragment payload"),
    responses(
        (status = 201, description = "Fragment created", body = FragmentResponse,
            headers(("Location" = String, description = "URL of the new fragment"))),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 413, description = "Body exceeds the configured limit", body = ErrorBody),
        (status = 415, description = "Missing, malformed or unsupported Content-Type", body = ErrorBody),
    ),
    security(("basic" = []), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers, body), fields(owner_id = %auth_user.owner_id, len = body.len()))]
pub async fn create_fragment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<impl IntoResponse, AppError> {
    let (content_type, _) = declared_type(&headers)?;

    let mut fragment = Fragment::new(NewFragment::new(&auth_user.owner_id, content_type))?;
    state.store.set_data(&mut fragment, &body).await?;
    state.store.save(&mut fragment).await?;

    let location = fragment_location(&state.config.server, &headers, fragment.id());
    info!(id = fragment.id(), size = fragment.size(), "Created fragment");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(FragmentResponse::from(fragment)),
    ))
}

#[utoipa::path(
    get,
    path = "/fragments/{id}",
    tag = "Fragments",
    operation_id = "getFragment",
    summary = "Fetch a fragment's payload",
    description = "Returns the stored bytes with the declared `Content-Type`. Appending an \
        extension (`{id}.html`, `{id}.txt`, `{id}.png`, ...) converts the payload to that type \
        when the fragment's type allows it.",
    params(("id" = String, Path, description = "Fragment id, optionally suffixed with `.ext`")),
    responses(
        (status = 200, description = "Fragment payload"),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 404, description = "Fragment not found", body = ErrorBody),
        (status = 415, description = "Conversion to the requested type is not supported", body = ErrorBody),
        (status = 500, description = "Stored payload could not be converted", body = ErrorBody),
    ),
    security(("basic" = []), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.owner_id))]
pub async fn get_fragment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let (id, extension) = split_extension(&raw_id);
    let fragment = state.store.find_by_id(&auth_user.owner_id, id).await?;

    let Some(extension) = extension else {
        let data = state.store.get_data(&auth_user.owner_id, id).await?;
        let content_type = fragment.content_type().to_string();
        return Ok(([(header::CONTENT_TYPE, content_type)], data).into_response());
    };

    let (target, conversion) = convert::resolve(fragment.mime_type(), extension)?;
    let data = state.store.get_data(&auth_user.owner_id, id).await?;
    let converted = run_conversion(conversion, data).await?;

    Ok(([(header::CONTENT_TYPE, target.as_str())], converted).into_response())
}

#[utoipa::path(
    get,
    path = "/fragments/{id}/info",
    tag = "Fragments",
    operation_id = "getFragmentInfo",
    summary = "Fetch a fragment's metadata",
    params(("id" = String, Path, description = "Fragment id")),
    responses(
        (status = 200, description = "Fragment metadata", body = FragmentResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 404, description = "Fragment not found", body = ErrorBody),
    ),
    security(("basic" = []), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.owner_id))]
pub async fn get_fragment_info(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FragmentResponse>, AppError> {
    let fragment = state.store.find_by_id(&auth_user.owner_id, &id).await?;
    Ok(Json(fragment.into()))
}

#[utoipa::path(
    put,
    path = "/fragments/{id}",
    tag = "Fragments",
    operation_id = "updateFragment",
    summary = "Replace a fragment's payload",
    description = "The `Content-Type` must name the same base type the fragment was created with.",
    params(("id" = String, Path, description = "Fragment id")),
    request_body(content_type = "application/octet-stream", description = "Replacement payload"),
    responses(
        (status = 200, description = "Fragment updated", body = FragmentResponse),
        (status = 400, description = "Content-Type differs from the fragment's type", body = ErrorBody),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 404, description = "Fragment not found", body = ErrorBody),
        (status = 413, description = "Body exceeds the configured limit", body = ErrorBody),
    ),
    security(("basic" = []), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user, headers, body), fields(owner_id = %auth_user.owner_id, len = body.len()))]
pub async fn update_fragment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    RawBody(body): RawBody,
) -> Result<Json<FragmentResponse>, AppError> {
    let mut fragment = state.store.find_by_id(&auth_user.owner_id, &id).await?;

    let same_type = declared_type(&headers)
        .is_ok_and(|(_, media_type)| media_type == fragment.mime_type());
    if !same_type {
        return Err(AppError::Validation(format!(
            "fragment type cannot be changed after creation (expected {})",
            fragment.mime_type()
        )));
    }

    state.store.set_data(&mut fragment, &body).await?;
    state.store.save(&mut fragment).await?;
    info!(id = fragment.id(), size = fragment.size(), "Updated fragment");

    Ok(Json(fragment.into()))
}

#[utoipa::path(
    delete,
    path = "/fragments/{id}",
    tag = "Fragments",
    operation_id = "deleteFragment",
    summary = "Delete a fragment",
    params(("id" = String, Path, description = "Fragment id")),
    responses(
        (status = 200, description = "Fragment deleted", body = StatusResponse),
        (status = 401, description = "Missing or invalid credentials", body = ErrorBody),
        (status = 404, description = "Fragment not found", body = ErrorBody),
    ),
    security(("basic" = []), ("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(owner_id = %auth_user.owner_id))]
pub async fn delete_fragment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    state.store.delete(&auth_user.owner_id, &id).await?;
    info!(id, "Deleted fragment");
    Ok(Json(StatusResponse::ok()))
}

/// Raw `Content-Type` header and its parsed base type.
fn declared_type(headers: &HeaderMap) -> Result<(String, MediaType), AppError> {
    let raw = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::UnsupportedMediaType("missing Content-Type".into()))?;
    let media_type = MediaType::parse(raw)?;
    Ok((raw.to_string(), media_type))
}

/// Split `abc.html` into `("abc", Some("html"))`.
fn split_extension(raw: &str) -> (&str, Option<&str>) {
    match raw.rsplit_once('.') {
        Some((id, ext)) if !id.is_empty() => (id, Some(ext)),
        _ => (raw, None),
    }
}

/// Image re-encoding is CPU-bound and runs on the blocking pool.
async fn run_conversion(conversion: Conversion, data: Vec<u8>) -> Result<Vec<u8>, AppError> {
    if !conversion.is_blocking() {
        return Ok(conversion.apply(&data)?);
    }
    let converted = tokio::task::spawn_blocking(move || conversion.apply(&data))
        .await
        .map_err(|e| AppError::Internal(format!("Conversion task failed: {e}")))??;
    Ok(converted)
}

fn fragment_location(config: &ServerConfig, headers: &HeaderMap, id: &str) -> String {
    let base = match config.api_url.as_deref() {
        Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
        _ => {
            let host = headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{}:{}", config.host, config.port));
            format!("http://{host}")
        }
    };
    format!("{base}/v1/fragments/{id}")
}
