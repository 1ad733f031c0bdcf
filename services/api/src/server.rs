use crate::cli::ServeArgs;
use crate::infra::{build_notifier, AppState};
use crate::routes::with_enquiry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use enquiry_notifier::config::AppConfig;
use enquiry_notifier::error::AppError;
use enquiry_notifier::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let missing = config.mail.missing_settings();
    if !missing.is_empty() {
        warn!(
            missing = %missing.join(", "),
            "email delivery is not configured; submissions will be rejected"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let notifier = build_notifier(&config.mail)?;

    let app = with_enquiry_routes(notifier, &config.profiles)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    let routes: Vec<&str> = config.profiles.iter().map(|profile| profile.path).collect();
    info!(?config.environment, %addr, ?routes, "enquiry notifier ready");

    axum::serve(listener, app).await?;
    Ok(())
}
