mod callable;
mod health;
mod metrics;

pub use callable::{harder_variant_handler, practice_variant_handler, solve_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;
