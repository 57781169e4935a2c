pub mod market;
pub mod plan;
pub mod plant;

pub use market::*;
pub use plan::*;
pub use plant::*;
