//! Dispatch strategies
//!
//! - First feasible: merit-order backtracking, stops at the first plan found
//! - Least cost: branch and bound over commitments, returns the cheapest plan

pub mod first_feasible;
pub mod least_cost;

pub use first_feasible::*;
pub use least_cost::*;
