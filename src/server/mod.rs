//! HTTP front end: the form page at `/` and the JSON endpoint at `/predict`.

pub mod handlers;
pub mod pages;

use crate::core::{AppConfig, Result};
use crate::pipelines::SentimentClassifier;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;

pub use pages::Pages;

/// Shared, read-only state handed to every worker.
pub struct AppState {
    pub classifier: Arc<dyn SentimentClassifier>,
    pub pages: Pages,
}

impl AppState {
    pub fn new(classifier: Arc<dyn SentimentClassifier>) -> Result<Self> {
        Ok(Self {
            classifier,
            pages: Pages::new()?,
        })
    }
}

/// Largest form or JSON body accepted, in bytes.
pub const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Register the routes. Used by [`run`] and by tests against an in-memory app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::FormConfig::default().limit(BODY_LIMIT))
        .app_data(web::JsonConfig::default().limit(BODY_LIMIT));
    cfg.service(
        web::resource("/")
            .route(web::get().to(handlers::index))
            .route(web::post().to(handlers::analyze)),
    )
    .service(web::resource("/predict").route(web::post().to(handlers::predict)));
}

/// Serve until the process receives a shutdown signal.
pub async fn run(config: &AppConfig, classifier: Arc<dyn SentimentClassifier>) -> Result<()> {
    let state = web::Data::new(AppState::new(classifier)?);
    let (host, port) = config.bind_address();

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    });
    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    tracing::info!("Server running at http://{host}:{port}");
    server.bind((host.as_str(), port))?.run().await?;
    Ok(())
}
