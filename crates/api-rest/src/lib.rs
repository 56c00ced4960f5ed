//! # API REST
//!
//! REST API implementation for RxGate.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! Uses `api-shared` for common response types. The pipeline itself lives in
//! `rxgate-core`; this crate only translates between HTTP and the core
//! service.

#![warn(rust_2018_idioms)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    DeleteRes, ErrorRes, GetRes, HealthRes, HealthService, ListRes, PrescriptionDto, SubmitRes,
    ValidateRes,
};
use rxgate_core::{
    constants::{DEFAULT_DATA_DIR, DEFAULT_PAGE_SIZE, DEFAULT_REGISTRY_FILENAME},
    validity_window_from_env_value, CoreConfig, CoreError, FileRecordStore, FileRegistry,
    PageRequest, PlainTextOcr, PrescriptionService, RecordFilter, ShardableUuid, ValidationState,
};
use rxgate_files::FilesService;

/// Application state shared across REST API handlers
///
/// Holds the wired prescription service behind an `Arc` so every handler
/// talks to the same collaborators.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PrescriptionService>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_prescriptions,
        submit_prescription,
        get_prescription,
        validate_prescription,
        delete_prescription,
    ),
    components(schemas(
        HealthRes,
        SubmitRes,
        ValidateRes,
        GetRes,
        ListRes,
        DeleteRes,
        PrescriptionDto,
        api_shared::LineItemDto,
        ErrorRes,
    ))
)]
pub struct ApiDoc;

/// Builds the prescription service from environment configuration.
///
/// Intended to be called once at process startup by a binary; nothing in the
/// request path reads environment variables.
///
/// # Environment Variables
/// - `RXGATE_DATA_DIR`: root data directory (default: "rx_data")
/// - `RXGATE_REGISTRY_FILE`: prescriber registry YAML (default: `<data_dir>/prescribers.yaml`)
/// - `RXGATE_VALIDITY_DAYS`: prescription validity window (default: 30)
pub fn bootstrap() -> anyhow::Result<AppState> {
    let data_dir = std::env::var("RXGATE_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let data_path = PathBuf::from(&data_dir);
    std::fs::create_dir_all(&data_path)?;

    let registry_file = std::env::var("RXGATE_REGISTRY_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_path.join(DEFAULT_REGISTRY_FILENAME));

    let validity_window =
        validity_window_from_env_value(std::env::var("RXGATE_VALIDITY_DAYS").ok())?;

    let cfg = CoreConfig::new(data_path, registry_file, validity_window)?;

    let registry = if cfg.registry_file().is_file() {
        FileRegistry::load(cfg.registry_file())?
    } else {
        tracing::warn!(
            path = %cfg.registry_file().display(),
            "prescriber registry file not found; every prescriber lookup will fail"
        );
        FileRegistry::default()
    };

    let documents = FilesService::new(&cfg.documents_dir())?;
    let records = FileRecordStore::new(cfg.records_dir());

    let service = PrescriptionService::new(
        &cfg,
        Arc::new(PlainTextOcr::new()),
        Arc::new(documents),
        Arc::new(registry),
        Arc::new(records),
    );

    Ok(AppState {
        service: Arc::new(service),
    })
}

/// Builds the REST router with all routes, Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/prescriptions", get(list_prescriptions))
        .route("/prescriptions", post(submit_prescription))
        .route("/prescriptions/:id", get(get_prescription))
        .route("/prescriptions/:id", delete(delete_prescription))
        .route("/prescriptions/:id/validate", post(validate_prescription))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ErrorReply = (StatusCode, Json<ErrorRes>);

/// Maps a core failure to its HTTP status and wire body.
fn error_reply(err: CoreError) -> ErrorReply {
    let status = match &err {
        CoreError::Rejected(_) | CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::RecordNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::warn!(error = %err, status = %status, "request refused");
    }

    (status, Json(ErrorRes::from_core(&err)))
}

fn parse_record_id(id: &str) -> Result<ShardableUuid, ErrorReply> {
    ShardableUuid::parse(id)
        .map_err(|e| error_reply(CoreError::InvalidInput(format!("invalid record id: {}", e))))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

/// Query parameters for the record listing.
#[derive(Debug, Deserialize, IntoParams)]
struct ListQuery {
    /// Restrict to one patient identifier.
    patient_id: Option<String>,
    /// Restrict to one prescriber registration code.
    prescriber_code: Option<String>,
    /// Restrict to one validation state (`pending` or `validated`).
    state: Option<String>,
    /// 1-based page number.
    page: Option<u32>,
    /// Page size, clamped to [1, 100].
    page_size: Option<u32>,
}

#[utoipa::path(
    get,
    path = "/prescriptions",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of prescription records", body = ListRes),
        (status = 400, description = "Invalid filter", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List prescription records
///
/// Returns records matching the query filters, newest first, paginated.
#[axum::debug_handler]
async fn list_prescriptions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListRes>, ErrorReply> {
    let record_state = match query.state.as_deref() {
        None => None,
        Some(raw) => match ValidationState::parse(raw) {
            Some(parsed) => Some(parsed),
            None => {
                return Err(error_reply(CoreError::InvalidInput(format!(
                    "unknown validation state '{}'",
                    raw
                ))));
            }
        },
    };

    let filter = RecordFilter {
        patient_id: query.patient_id,
        prescriber_code: query.prescriber_code,
        state: record_state,
    };
    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    );

    let result = state.service.list(&filter, page).map_err(error_reply)?;

    Ok(Json(ListRes {
        page: result.page,
        page_size: result.page_size,
        total: result.total,
        items: result.items.iter().map(PrescriptionDto::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/prescriptions",
    request_body(content = String, description = "Raw prescription document bytes", content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Prescription submitted", body = SubmitRes),
        (status = 400, description = "Document incomplete", body = ErrorRes),
        (status = 422, description = "Document could not be processed", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Submit a prescription document
///
/// Stores the document, extracts the structured fields and creates a pending
/// record when all required fields are present. A rejected submission creates
/// nothing; the response carries the partially extracted fields.
#[axum::debug_handler]
async fn submit_prescription(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmitRes>), ErrorReply> {
    if body.is_empty() {
        return Err(error_reply(CoreError::InvalidInput(
            "request body is empty; expected document bytes".into(),
        )));
    }

    let record = state.service.submit(&body).map_err(error_reply)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitRes {
            message: "prescription submitted".into(),
            record: PrescriptionDto::from(&record),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/prescriptions/{id}",
    params(("id" = String, Path, description = "Record identifier (32 lowercase hex characters)")),
    responses(
        (status = 200, description = "The prescription record", body = GetRes),
        (status = 400, description = "Invalid identifier", body = ErrorRes),
        (status = 404, description = "Record not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Fetch a single prescription record
///
/// Includes a document download URL when the store can produce one.
#[axum::debug_handler]
async fn get_prescription(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<GetRes>, ErrorReply> {
    let id = parse_record_id(&id)?;
    let (record, download_url) = state.service.get(&id).map_err(error_reply)?;

    Ok(Json(GetRes {
        record: PrescriptionDto::from(&record),
        download_url,
    }))
}

#[utoipa::path(
    post,
    path = "/prescriptions/{id}/validate",
    params(("id" = String, Path, description = "Record identifier (32 lowercase hex characters)")),
    responses(
        (status = 200, description = "Prescription validated", body = ValidateRes),
        (status = 400, description = "Prescription rejected", body = ErrorRes),
        (status = 404, description = "Record not found", body = ErrorRes),
        (status = 422, description = "Stored document could not be processed", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Validate a prescription against its stored document
///
/// Re-extracts the fields from the stored original and runs the full rule
/// set. On success the record moves to `validated` with the freshly
/// extracted fields; on rejection it is left unchanged and the typed reason
/// is returned.
#[axum::debug_handler]
async fn validate_prescription(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ValidateRes>, ErrorReply> {
    let id = parse_record_id(&id)?;
    let record = state.service.validate_by_id(&id).map_err(error_reply)?;

    Ok(Json(ValidateRes {
        message: "prescription validated".into(),
        record: PrescriptionDto::from(&record),
    }))
}

#[utoipa::path(
    delete,
    path = "/prescriptions/{id}",
    params(("id" = String, Path, description = "Record identifier (32 lowercase hex characters)")),
    responses(
        (status = 200, description = "Prescription deleted", body = DeleteRes),
        (status = 400, description = "Invalid identifier", body = ErrorRes),
        (status = 404, description = "Record not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Delete a prescription record and its stored document
#[axum::debug_handler]
async fn delete_prescription(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<DeleteRes>, ErrorReply> {
    let id = parse_record_id(&id)?;
    state.service.delete(&id).map_err(error_reply)?;

    Ok(Json(DeleteRes {
        message: "prescription and document deleted".into(),
        id: id.to_string(),
    }))
}
