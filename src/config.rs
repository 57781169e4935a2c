use anyhow::{ensure, Result};
use figment::{providers::{Env, Format, Serialized, Toml}, Figment};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use crate::optimizer::{ProductionOptimizer, SearchLimits, StrategyKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
            request_timeout_secs: 10,
            enable_cors: false,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub strategy: StrategyKind,
    pub max_nodes: usize,
    pub time_budget_ms: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        let limits = SearchLimits::default();
        Self {
            strategy: StrategyKind::default(),
            max_nodes: limits.max_nodes,
            time_budget_ms: limits.time_budget.as_millis() as u64,
        }
    }
}

impl OptimizerConfig {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits::new(self.max_nodes, Duration::from_millis(self.time_budget_ms))
    }

    pub fn build(&self) -> ProductionOptimizer {
        ProductionOptimizer::new(self.strategy, self.limits())
    }
}

impl Config {
    /// Defaults, then `config/default.toml`, then `PLANNER__*` variables.
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("config/default.toml"))
                .merge(Env::prefixed("PLANNER__").split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.server.port != 0, "server.port must be non-zero");
        ensure!(
            self.server.request_timeout_secs > 0,
            "server.request_timeout_secs must be positive"
        );
        ensure!(self.optimizer.max_nodes > 0, "optimizer.max_nodes must be positive");
        ensure!(
            self.optimizer.time_budget_ms > 0,
            "optimizer.time_budget_ms must be positive"
        );
        Ok(())
    }
}
