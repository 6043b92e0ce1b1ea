pub mod agent;
pub mod analytics;
pub mod product;

pub use agent::*;
pub use analytics::*;
pub use product::*;
