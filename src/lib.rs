pub mod config;
pub mod error;
pub mod db;
pub mod graph;
pub mod store;
pub mod consolidate;
pub mod paths;

pub use config::Config;
pub use error::{IntrographError, Result};
pub use graph::{edge_strength, BusinessAnalysis, Edge, Entity, EntityType};
pub use consolidate::{ConsolidationEngine, ConsolidationReport};
pub use paths::{path_insights, InsightsSummary, IntroPath, PathFinder, PathOptions};
