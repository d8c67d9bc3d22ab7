//! Warm-introduction path finding over an in-memory graph snapshot.
//!
//! [`PathFinder`] answers "how do I reach this entity" by searching from every
//! internal-owner seed to a target, scoring each route by its mean edge
//! strength. [`path_insights`] summarises a result set for presentation.

mod finder;
mod insights;

pub use finder::PathFinder;
pub use insights::{path_insights, ConnectionTypeCount, InsightsSummary};

use serde::{Deserialize, Serialize};

use crate::{IntrographError, Result};

/// Search limits and ranking preferences for a path query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathOptions {
    pub max_hops: usize,
    pub max_paths: usize,
    pub min_strength: f64,
    pub prefer_linkedin: bool,
    pub prefer_internal: bool,
}

/// Defaults for `find_intro_paths`.
impl Default for PathOptions {
    fn default() -> Self {
        Self {
            max_hops: 4,
            max_paths: 10,
            min_strength: 0.3,
            prefer_linkedin: true,
            prefer_internal: true,
        }
    }
}

impl PathOptions {
    /// Looser defaults for `find_paths_between`.
    pub fn between() -> Self {
        Self {
            max_hops: 6,
            max_paths: 5,
            min_strength: 0.2,
            prefer_linkedin: false,
            prefer_internal: false,
        }
    }

    /// Reject limits under which no path could ever be returned.
    pub fn validate(&self) -> Result<()> {
        if self.max_hops == 0 {
            return Err(IntrographError::InvalidInput(
                "max_hops must be greater than 0".to_string(),
            ));
        }
        if self.max_paths == 0 {
            return Err(IntrographError::InvalidInput(
                "max_paths must be greater than 0".to_string(),
            ));
        }
        // NaN fails the range check too
        if !(0.0..=1.0).contains(&self.min_strength) {
            return Err(IntrographError::InvalidInput(format!(
                "min_strength must be between 0.0 and 1.0, got {}",
                self.min_strength
            )));
        }
        Ok(())
    }
}

/// One ranked route through the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroPath {
    /// Node ids from the start node to the target.
    pub path: Vec<String>,
    pub names: Vec<String>,
    /// Mean edge strength over the hops.
    pub strength: f64,
    /// Relationship kind of each hop, in walking order.
    pub relationship_kinds: Vec<String>,
    pub hop_count: usize,
    pub internal_owner_nodes: Vec<String>,
    pub linkedin_nodes: Vec<String>,
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(PathOptions::default().validate().is_ok());
        assert!(PathOptions::between().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_strength_rejected() {
        for bad in [1.5, -0.1, f64::NAN] {
            let options = PathOptions { min_strength: bad, ..PathOptions::default() };
            let err = options.validate().unwrap_err();
            assert!(matches!(err, IntrographError::InvalidInput(_)));
            assert!(err.to_string().contains("min_strength"), "{}", err);
        }
        let edge = PathOptions { min_strength: 1.0, ..PathOptions::default() };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let no_hops = PathOptions { max_hops: 0, ..PathOptions::between() };
        assert!(no_hops.validate().unwrap_err().to_string().contains("max_hops"));

        let no_paths = PathOptions { max_paths: 0, ..PathOptions::default() };
        assert!(no_paths.validate().unwrap_err().to_string().contains("max_paths"));
    }
}
