use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::IntroPath;

const TOP_CONNECTION_TYPES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTypeCount {
    pub kind: String,
    pub count: usize,
}

/// Aggregate view over a set of found paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSummary {
    pub total_paths: usize,
    pub average_strength: f64,
    pub shortest_path: usize,
    pub longest_path: usize,
    /// Paths crossing at least one LinkedIn first-degree node.
    pub linkedin_paths: usize,
    /// Paths crossing at least one internal owner.
    pub internal_owner_paths: usize,
    pub top_connection_types: Vec<ConnectionTypeCount>,
}

/// Summarise `paths`. An empty slice gives an all-zero summary.
pub fn path_insights(paths: &[IntroPath]) -> InsightsSummary {
    if paths.is_empty() {
        return InsightsSummary::default();
    }

    let mut kind_counts: HashMap<&str, usize> = HashMap::new();
    for kind in paths.iter().flat_map(|p| p.relationship_kinds.iter()) {
        *kind_counts.entry(kind.as_str()).or_insert(0) += 1;
    }
    let mut top: Vec<ConnectionTypeCount> = kind_counts
        .into_iter()
        .map(|(kind, count)| ConnectionTypeCount {
            kind: kind.to_string(),
            count,
        })
        .collect();
    top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.kind.cmp(&b.kind)));
    top.truncate(TOP_CONNECTION_TYPES);

    let total_strength: f64 = paths.iter().map(|p| p.strength).sum();

    InsightsSummary {
        total_paths: paths.len(),
        average_strength: total_strength / paths.len() as f64,
        shortest_path: paths.iter().map(|p| p.hop_count).min().unwrap_or(0),
        longest_path: paths.iter().map(|p| p.hop_count).max().unwrap_or(0),
        linkedin_paths: paths.iter().filter(|p| !p.linkedin_nodes.is_empty()).count(),
        internal_owner_paths: paths
            .iter()
            .filter(|p| !p.internal_owner_nodes.is_empty())
            .count(),
        top_connection_types: top,
    }
}
