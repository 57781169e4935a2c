//! Production planner
//!
//! Splits a power demand over a fleet of gas-fired, turbojet and wind units
//! at the lowest fuel and emission cost, respecting each unit's minimum and
//! maximum output. [`optimizer::optimize`] is the entry point; [`api`] serves
//! it as `POST /productionplan`.

pub mod api;
pub mod config;
pub mod domain;
pub mod optimizer;
pub mod telemetry;

pub use optimizer::{optimize, DispatchError, ProductionOptimizer};
