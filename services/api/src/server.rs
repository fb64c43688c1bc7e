use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_survey_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use noise_survey::config::{AppConfig, ServerConfig};
use noise_survey::error::AppError;
use noise_survey::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config.server, args);
    telemetry::init(&config.telemetry)?;

    let readiness = Arc::new(AtomicBool::new(false));
    let app = build_app(&config.server, readiness.clone());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);
    info!(
        environment = %config.environment,
        %addr,
        body_limit = config.server.body_limit_bytes,
        "noise survey rules service ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(readiness))
        .await?;

    info!("noise survey rules service stopped");
    Ok(())
}

fn apply_overrides(server: &mut ServerConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }
}

fn build_app(server: &ServerConfig, readiness: Arc<AtomicBool>) -> Router {
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let state = AppState {
        readiness,
        metrics: Arc::new(prometheus_handle),
    };

    with_survey_routes(server.body_limit_bytes)
        .layer(Extension(state))
        .layer(prometheus_layer)
}

/// Resolves on Ctrl+C or SIGTERM and marks the service as not ready.
async fn shutdown_signal(readiness: Arc<AtomicBool>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("ctrl-c received, draining connections"),
        _ = terminate => info!("terminate signal received, draining connections"),
    }
    readiness.store(false, Ordering::Release);
}
