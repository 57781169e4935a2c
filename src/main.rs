use anyhow::Result;
use axum::Router;
use production_planner::{api, config, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    let addr = cfg.server.socket_addr()?;

    if cfg.server.host == "0.0.0.0" {
        warn!("Server binding to 0.0.0.0 - the planner will be reachable from the network");
    }

    let app_state = api::AppState::new(cfg.clone());
    info!(
        %addr,
        strategy = app_state.optimizer.strategy_name(),
        max_nodes = cfg.optimizer.max_nodes,
        time_budget_ms = cfg.optimizer.time_budget_ms,
        "starting production planner"
    );

    #[allow(unused_mut)]
    let mut app: Router = api::router(app_state);

    #[cfg(feature = "metrics")]
    {
        app = api::with_metrics(app);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
