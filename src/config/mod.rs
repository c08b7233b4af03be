//! Engine configuration: types and TOML loading.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{EngineConfig, FeatureToggles, HistoryConfig, TextConfig};
