pub mod backtrack;
pub mod branch_bound;
pub mod constraints;
pub mod cost;
pub mod merit;
pub mod search;
pub mod strategies;
pub mod types;

pub use backtrack::*;
pub use branch_bound::*;
pub use constraints::*;
pub use cost::*;
pub use merit::*;
pub use search::*;
pub use strategies::*;
pub use types::*;
