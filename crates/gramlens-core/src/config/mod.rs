//! Configuration system for gramlens.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod construction_config;
pub mod facet_config;
pub mod gramlens_config;
pub mod merge_config;
pub mod session_config;
pub mod storage_config;

pub use construction_config::ConstructionConfig;
pub use facet_config::FacetConfig;
pub use gramlens_config::{CliOverrides, GramlensConfig};
pub use merge_config::MergeConfig;
pub use session_config::SessionConfig;
pub use storage_config::StorageConfig;
