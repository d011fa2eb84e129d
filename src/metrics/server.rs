use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use std::sync::Arc;

use super::Metrics;

/// Serve `/metrics` (Prometheus text format) and `/health` (enrollment
/// activity summary). Runs on its own actix system, apart from the service
/// runtime.
pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    HttpServer::new(move || {
        let metrics = metrics.clone();
        App::new().configure(move |cfg| routes(cfg, metrics))
    })
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

fn routes(cfg: &mut web::ServiceConfig, metrics: Arc<Metrics>) {
    cfg.app_data(web::Data::from(metrics))
        .route("/metrics", web::get().to(scrape))
        .route("/health", web::get().to(health));
}

async fn scrape(metrics: web::Data<Metrics>) -> impl Responder {
    match metrics.encode() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn health(metrics: web::Data<Metrics>) -> impl Responder {
    HttpResponse::Ok().json(metrics.summary())
}
