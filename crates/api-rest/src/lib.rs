//! # API REST
//!
//! REST surface for the provider directory.
//!
//! Handles:
//! - `POST /api/search-provider`, the registry lookup proxy
//! - `GET /health`
//! - OpenAPI/Swagger documentation
//!
//! Every response carries permissive cross-origin headers. Uses `api-shared` for wire types.

#![warn(rust_2018_idioms)]

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{ErrorRes, HealthRes, HealthService, ProviderSearchReq};
use directory_registry::{ProviderLookup, RegistryCandidate};

pub const SEARCH_PROVIDER_ROUTE: &str = "/api/search-provider";

const METHOD_NOT_ALLOWED: &str = "Method not allowed";
const SERVICE_UNAVAILABLE: &str = "Search service unavailable";

/// Shared state for the REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub lookup: ProviderLookup,
}

impl AppState {
    pub fn new(lookup: ProviderLookup) -> Self {
        Self { lookup }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, search_provider),
    components(schemas(HealthRes, ProviderSearchReq, ErrorRes, RegistryCandidate))
)]
pub struct ApiDoc;

type ApiError = (StatusCode, Json<ErrorRes>);

/// Build the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            SEARCH_PROVIDER_ROUTE,
            post(search_provider)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/api/search-provider",
    request_body = ProviderSearchReq,
    responses(
        (status = 200, description = "Matching registry candidates; empty when the name is too short", body = [RegistryCandidate]),
        (status = 405, description = "Method not allowed", body = ErrorRes),
        (status = 500, description = "Registry unavailable", body = ErrorRes)
    )
)]
/// Look up individual providers in the NPI registry by name.
///
/// The body is read as raw bytes so that an empty body behaves like `{}` and a body that is not
/// valid JSON is reported the same way as any other lookup failure.
async fn search_provider(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<RegistryCandidate>>, ApiError> {
    let req: ProviderSearchReq = if body.is_empty() {
        ProviderSearchReq::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(error = %e, "search-provider body is not valid JSON");
            unavailable()
        })?
    };

    match state
        .lookup
        .search(req.name.as_deref(), req.kind.as_deref())
        .await
    {
        Ok(candidates) => Ok(Json(candidates)),
        Err(e) => {
            tracing::error!(error = %e, "provider registry lookup failed");
            Err(unavailable())
        }
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorRes::new(METHOD_NOT_ALLOWED)),
    )
}

fn unavailable() -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorRes::new(SERVICE_UNAVAILABLE)),
    )
}
