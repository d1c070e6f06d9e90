//! HTTP handlers for FIR generation.
//!
//! Each request is independent: validate, compose, render, and send the PDF
//! back as an attachment. Validation failures never reach the renderer pool.

use std::sync::Arc;
use std::time::Instant;

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::http::StatusCode;
use actix_web::{error::InternalError, web, HttpResponse, Responder, ResponseError};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::common_charges;
use super::common::{attachment_filename, SystemClock};
use super::composer::FirComposer;
use super::models::{Charge, IncidentRecord};
use super::pool::RenderPool;
use super::traits::Clock;
use super::validation::validate;
use super::FirError;
use crate::ErrorResponse;

/// Client-visible message for any rendering failure.
pub const RENDER_FAILURE_MESSAGE: &str = "Failed to generate PDF";

pub const DEFAULT_JSON_LIMIT: usize = 256 * 1024;

/// Shared state for the FIR routes.
pub struct FirState {
    pub composer: FirComposer,
    pub pool: RenderPool,
    pub clock: Arc<dyn Clock>,
}

impl FirState {
    pub fn new(pool: RenderPool) -> Self {
        Self {
            composer: FirComposer::new(),
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl ResponseError for FirError {
    fn status_code(&self) -> StatusCode {
        match self {
            FirError::Validation(_) => StatusCode::BAD_REQUEST,
            FirError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            FirError::Validation(err) => err.to_string(),
            FirError::Render(_) => RENDER_FAILURE_MESSAGE.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(&message))
    }
}

#[utoipa::path(
    post,
    path = "/api/generate-fir",
    tag = "FIR",
    request_body = IncidentRecord,
    responses(
        (status = 200, description = "FIR rendered as a PDF attachment", content_type = "application/pdf", body = Vec<u8>),
        (status = 400, description = "Record failed validation", body = ErrorResponse),
        (status = 500, description = "Rendering failed", body = ErrorResponse)
    )
)]
pub async fn generate_fir(
    state: web::Data<FirState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, FirError> {
    let request_id = Uuid::new_v4();
    let started = Instant::now();

    let record = validate(&body).map_err(|err| {
        log::warn!("[{}] FIR rejected: {}", request_id, err);
        err
    })?;
    log::info!(
        "[{}] Generating FIR {} with {} charge(s)",
        request_id,
        record.case_number,
        record.charges.len()
    );

    let filename = attachment_filename(&record.case_number);
    let markup = state.composer.compose(&record, state.clock.as_ref());
    let pdf = state.pool.render(&markup).await.map_err(|err| {
        log::error!(
            "[{}] Error generating PDF ({}): {}",
            request_id,
            err.kind().as_str(),
            err
        );
        err
    })?;

    log::info!(
        "[{}] Generated {} ({} bytes) in {:?}",
        request_id,
        filename,
        pdf.len(),
        started.elapsed()
    );

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(pdf))
}

#[utoipa::path(
    get,
    path = "/api/charges/common",
    tag = "FIR",
    responses(
        (status = 200, description = "Commonly applied BNS sections", body = Vec<Charge>)
    )
)]
pub async fn list_common_charges() -> impl Responder {
    HttpResponse::Ok().json(common_charges())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RendererStatus {
    pub capacity: usize,
    pub available: usize,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub renderer: RendererStatus,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "FIR",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(state: web::Data<FirState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        renderer: RendererStatus {
            capacity: state.pool.capacity(),
            available: state.pool.available(),
            timeout_secs: state.pool.timeout().as_secs(),
        },
    })
}

/// JSON extractor settings; malformed bodies get the same error shape as
/// validation failures.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let message = err.to_string();
            log::warn!("Rejected request body: {}", message);
            InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(ErrorResponse::new(&message)),
            )
            .into()
        })
}

/// Configure FIR routes under the `/api` scope.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/generate-fir").route(web::post().to(generate_fir)))
        .service(web::resource("/charges/common").route(web::get().to(list_common_charges)));
}
