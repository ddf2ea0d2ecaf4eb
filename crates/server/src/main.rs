mod config;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use labelcheck_ocr::{LabelPipeline, LineRecognizer, Verifier};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = ServerConfig::load()?;
    let recognizer = build_recognizer(&cfg);
    let pipeline = Arc::new(LabelPipeline::new(
        recognizer,
        Verifier::new(cfg.bare_weight_unit),
    ));

    let app = routes::router(pipeline).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(cfg.max_upload_bytes)),
    );

    info!(addr = %cfg.bind_addr, "label verification service listening");
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}

#[cfg(feature = "tesseract")]
fn build_recognizer(cfg: &ServerConfig) -> Box<dyn LineRecognizer> {
    use labelcheck_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    info!(lang = %cfg.tesseract_lang, "using Tesseract OCR backend");
    Box::new(TesseractRecognizer::new(
        cfg.tesseract_data_path.clone(),
        &cfg.tesseract_lang,
    ))
}

#[cfg(not(feature = "tesseract"))]
fn build_recognizer(_cfg: &ServerConfig) -> Box<dyn LineRecognizer> {
    tracing::warn!(
        "built without an OCR backend; /verify-label will report errors (enable the `tesseract` feature)"
    );
    Box::new(labelcheck_ocr::UnavailableRecognizer)
}
