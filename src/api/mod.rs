pub mod error;
pub mod health;
pub mod production_plan;

use axum::{
    routing::{get, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{config::Config, optimizer::ProductionOptimizer};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub optimizer: Arc<ProductionOptimizer>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        let optimizer = Arc::new(cfg.optimizer.build());
        Self {
            cfg: Arc::new(cfg),
            optimizer,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cfg = state.cfg.clone();

    let mut router = Router::new()
        .route("/productionplan", post(production_plan::production_plan))
        .route("/healthz", get(health::healthz))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .with_state(state);

    if cfg.server.enable_cors {
        use tower_http::cors::Any;
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE]);
        router = router.layer(cors);
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(axum::extract::DefaultBodyLimit::max(cfg.server.body_limit_bytes))
                .layer(TimeoutLayer::new(Duration::from_secs(cfg.server.request_timeout_secs))),
        )
        .layer(TraceLayer::new_for_http())
}

#[cfg(feature = "metrics")]
pub fn with_metrics(app: Router) -> Router {
    use axum_prometheus::PrometheusMetricLayer;
    let (layer, handle) = PrometheusMetricLayer::pair();

    let metrics_router =
        Router::new().route("/metrics", get(move || async move { handle.render() }));

    app.layer(layer).merge(metrics_router)
}
