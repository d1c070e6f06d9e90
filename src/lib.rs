use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Compress, Logger};
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod fir;

pub use crate::config::AppConfig;
pub use crate::fir::FirState;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::fir::handlers::generate_fir,
        crate::fir::handlers::list_common_charges,
        crate::fir::handlers::health
    ),
    components(
        schemas(
            fir::models::IncidentRecord,
            fir::models::Complainant,
            fir::models::Incident,
            fir::models::Accused,
            fir::models::Charge,
            fir::models::ChargeCode,
            fir::handlers::HealthResponse,
            fir::handlers::RendererStatus,
            ErrorResponse,
        )
    ),
    tags(
        (name = "FIR", description = "First Information Report generation endpoints.")
    )
)]
pub struct ApiDoc;

/// Register every application route. Shared by the server and the tests.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").configure(fir::config))
        .service(web::resource("/health").route(web::get().to(fir::handlers::health)));
}

/// Build the FIR state backed by the Typst compiler.
pub fn build_state(config: &AppConfig) -> FirState {
    let engine = fir::TypstRenderEngine::new(config.typst_bin.clone())
        .with_font_paths(config.typst_font_paths.clone());
    let pool = fir::RenderPool::new(
        Arc::new(engine),
        config.render_pool_size,
        config.render_timeout,
    );
    FirState::new(pool)
}

pub async fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    let fir_state = web::Data::new(build_state(&config));

    let prometheus = PrometheusMetricsBuilder::new("fir_generator_server")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create Prometheus metrics middleware: {e}"))?;

    log::info!(
        "Renderer pool: {} session(s) of {}, timeout {:?}",
        config.render_pool_size,
        config.typst_bin.display(),
        config.render_timeout
    );
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let origins = config.cors_allowed_origins.clone();
    let json_limit = config.json_limit;

    HttpServer::new(move || {
        let cors = origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(fir_state.clone())
            .app_data(fir::handlers::json_config(json_limit))
            .configure(configure_app)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("server terminated with an error")
}
