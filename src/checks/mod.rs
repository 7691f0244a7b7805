pub mod config;
pub mod registry;
pub mod runner;
pub mod warning;

pub use config::{load_checks, CheckConfig, ResolvedMethods, ALL_MODELS};
pub use registry::{CheckRegistry, ModelRegistry};
pub use runner::CheckRunner;
pub use warning::{Confidence, Warning};
