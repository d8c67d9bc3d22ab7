//! Path finder: bounded-hop enumeration plus weighted shortest-path search.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::graph::{edge_strength, Edge, Entity};
use crate::store::GraphSnapshot;

use super::{path_insights, InsightsSummary, IntroPath, PathOptions};

/// Strength and label of one traversed hop.
struct Hop<'a> {
    strength: f64,
    kind: &'a str,
}

/// Min-heap entry for the weighted search.
#[derive(PartialEq)]
struct Frontier<'a> {
    cost: f64,
    node: &'a str,
}

impl Eq for Frontier<'_> {}

impl Ord for Frontier<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(self.node))
    }
}

impl PartialOrd for Frontier<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Read-only search structure built from one graph snapshot.
///
/// Two indexes are kept apart: `edges_by_source` holds stored edges in their
/// original orientation and is used only for strength/kind lookup, while
/// `adjacency` is the symmetric neighbour map used only for traversal.
pub struct PathFinder {
    entities: HashMap<String, Entity>,
    edges_by_source: HashMap<String, Vec<(Edge, f64)>>,
    adjacency: HashMap<String, Vec<String>>,
    evaluated_at: DateTime<Utc>,
}

impl PathFinder {
    /// Build a finder whose edge strengths are evaluated now.
    pub fn new(entities: Vec<Entity>, edges: Vec<Edge>) -> Self {
        Self::with_clock(entities, edges, Utc::now())
    }

    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        Self::new(snapshot.entities, snapshot.edges)
    }

    /// Build a finder whose edge strengths are evaluated at `now`.
    /// Edges with a missing endpoint and self-loops are ignored.
    pub fn with_clock(entities: Vec<Entity>, edges: Vec<Edge>, now: DateTime<Utc>) -> Self {
        let entities: HashMap<String, Entity> =
            entities.into_iter().map(|e| (e.id.clone(), e)).collect();

        let mut edges_by_source: HashMap<String, Vec<(Edge, f64)>> = HashMap::new();
        let mut neighbours: HashMap<String, BTreeSet<String>> = HashMap::new();
        for edge in edges {
            if edge.source == edge.target
                || !entities.contains_key(&edge.source)
                || !entities.contains_key(&edge.target)
            {
                continue;
            }
            neighbours.entry(edge.source.clone()).or_default().insert(edge.target.clone());
            neighbours.entry(edge.target.clone()).or_default().insert(edge.source.clone());
            let strength = edge_strength(&edge, now);
            edges_by_source.entry(edge.source.clone()).or_default().push((edge, strength));
        }

        // Sorted neighbour lists keep enumeration order reproducible
        let adjacency = neighbours
            .into_iter()
            .map(|(node, set)| (node, set.into_iter().collect()))
            .collect();

        Self {
            entities,
            edges_by_source,
            adjacency,
            evaluated_at: now,
        }
    }

    pub fn evaluated_at(&self) -> DateTime<Utc> {
        self.evaluated_at
    }

    /// Ranked introduction routes from every internal owner to `target_id`.
    ///
    /// Returns an empty list when the target is unknown, when there are no
    /// internal owners, or when nothing satisfies the limits.
    pub fn find_intro_paths(&self, target_id: &str, options: &PathOptions) -> Vec<IntroPath> {
        let start = Instant::now();
        let Some((target, _)) = self.entities.get_key_value(target_id) else {
            log::debug!("Intro paths: unknown target {}", target_id);
            return Vec::new();
        };

        let mut seeds: Vec<&str> = self
            .entities
            .values()
            .filter(|e| e.is_internal_owner && e.id != *target)
            .map(|e| e.id.as_str())
            .collect();
        if seeds.is_empty() {
            log::debug!("Intro paths: no internal owners to search from");
            return Vec::new();
        }
        seeds.sort_unstable();

        // Keyed by node sequence: identical routes from either strategy collapse
        let mut pooled: BTreeMap<Vec<String>, IntroPath> = BTreeMap::new();
        let mut candidates = 0usize;
        for seed in &seeds {
            for nodes in self.enumerate_paths(seed, target, options.max_hops) {
                candidates += 1;
                self.keep_if_strong(&nodes, options, &mut pooled);
            }
            if let Some(nodes) = self.strongest_path(seed, target) {
                if nodes.len() - 1 <= options.max_hops {
                    candidates += 1;
                    self.keep_if_strong(&nodes, options, &mut pooled);
                }
            }
        }

        let mut paths: Vec<IntroPath> = pooled.into_values().collect();
        paths.sort_by(|a, b| rank_order(a, b, options));
        paths.truncate(options.max_paths);

        log::debug!(
            "Intro paths to {}: {} seeds, {} candidates, {} returned in {:?}",
            target_id,
            seeds.len(),
            candidates,
            paths.len(),
            start.elapsed()
        );
        paths
    }

    /// Routes between two arbitrary entities, strongest first. Uses only the
    /// bounded-hop enumeration and ignores internal-owner flags.
    pub fn find_paths_between(
        &self,
        source_id: &str,
        target_id: &str,
        options: &PathOptions,
    ) -> Vec<IntroPath> {
        let (Some((source, _)), Some((target, _))) = (
            self.entities.get_key_value(source_id),
            self.entities.get_key_value(target_id),
        ) else {
            return Vec::new();
        };
        if source == target {
            return Vec::new();
        }

        let mut pooled: BTreeMap<Vec<String>, IntroPath> = BTreeMap::new();
        for nodes in self.enumerate_paths(source, target, options.max_hops) {
            self.keep_if_strong(&nodes, options, &mut pooled);
        }

        let mut paths: Vec<IntroPath> = pooled.into_values().collect();
        paths.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then_with(|| a.hop_count.cmp(&b.hop_count))
                .then_with(|| a.path.cmp(&b.path))
        });
        paths.truncate(options.max_paths);
        paths
    }

    pub fn get_path_insights(paths: &[IntroPath]) -> InsightsSummary {
        path_insights(paths)
    }

    fn neighbours(&self, id: &str) -> &[String] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Strongest stored edge between `a` and `b`, in either orientation.
    fn hop(&self, a: &str, b: &str) -> Option<Hop<'_>> {
        let forward = self
            .edges_by_source
            .get(a)
            .into_iter()
            .flatten()
            .filter(|(edge, _)| edge.target == b);
        let backward = self
            .edges_by_source
            .get(b)
            .into_iter()
            .flatten()
            .filter(|(edge, _)| edge.target == a);

        forward
            .chain(backward)
            .max_by(|(x, x_strength), (y, y_strength)| {
                x_strength.total_cmp(y_strength).then_with(|| y.id.cmp(&x.id))
            })
            .map(|(edge, strength)| Hop {
                strength: *strength,
                kind: edge.kind.as_str(),
            })
    }

    fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.entities.get(id).map_or(id, |e| e.name.as_str())
    }

    /// All simple paths from `source` to `target` with at most `max_hops` edges.
    fn enumerate_paths<'a>(
        &'a self,
        source: &'a str,
        target: &str,
        max_hops: usize,
    ) -> Vec<Vec<&'a str>> {
        let mut found = Vec::new();
        let mut queue: VecDeque<(Vec<&'a str>, HashSet<&'a str>)> = VecDeque::new();
        queue.push_back((vec![source], HashSet::from([source])));

        while let Some((path, visited)) = queue.pop_front() {
            let Some(&current) = path.last() else {
                continue;
            };
            if current == target {
                found.push(path);
                continue;
            }
            if path.len() > max_hops {
                continue;
            }
            for next in self.neighbours(current) {
                let next = next.as_str();
                if visited.contains(next) {
                    continue;
                }
                let mut extended = path.clone();
                extended.push(next);
                let mut seen = visited.clone();
                seen.insert(next);
                queue.push_back((extended, seen));
            }
        }

        found
    }

    /// Lowest-cost path where crossing an edge costs `1 - strength`.
    fn strongest_path<'a>(&'a self, source: &'a str, target: &str) -> Option<Vec<&'a str>> {
        let mut dist: HashMap<&'a str, f64> = HashMap::new();
        let mut prev: HashMap<&'a str, &'a str> = HashMap::new();
        let mut settled: HashSet<&'a str> = HashSet::new();
        let mut heap = BinaryHeap::new();

        dist.insert(source, 0.0);
        heap.push(Frontier { cost: 0.0, node: source });

        while let Some(Frontier { cost, node }) = heap.pop() {
            if !settled.insert(node) {
                continue;
            }
            if node == target {
                break;
            }
            for next in self.neighbours(node) {
                let next = next.as_str();
                if settled.contains(next) {
                    continue;
                }
                let Some(hop) = self.hop(node, next) else {
                    continue;
                };
                let candidate = cost + (1.0 - hop.strength);
                if dist.get(next).map_or(true, |&known| candidate < known) {
                    dist.insert(next, candidate);
                    prev.insert(next, node);
                    heap.push(Frontier {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        let mut current = *settled.get(target)?;
        let mut nodes = vec![current];
        while current != source {
            current = *prev.get(current)?;
            nodes.push(current);
        }
        nodes.reverse();
        Some(nodes)
    }

    fn keep_if_strong(
        &self,
        nodes: &[&str],
        options: &PathOptions,
        pooled: &mut BTreeMap<Vec<String>, IntroPath>,
    ) {
        if let Some(path) = self.build_path(nodes) {
            if path.strength >= options.min_strength {
                pooled.entry(path.path.clone()).or_insert(path);
            }
        }
    }

    fn build_path(&self, nodes: &[&str]) -> Option<IntroPath> {
        if nodes.len() < 2 {
            return None;
        }

        let hop_count = nodes.len() - 1;
        let mut total = 0.0;
        let mut kinds = Vec::with_capacity(hop_count);
        let mut steps = Vec::with_capacity(hop_count);
        for pair in nodes.windows(2) {
            let hop = self.hop(pair[0], pair[1])?;
            total += hop.strength;
            kinds.push(hop.kind.to_string());
            steps.push(format!(
                "{} → {} ({})",
                self.name_of(pair[0]),
                self.name_of(pair[1]),
                hop.kind
            ));
        }

        let flagged = |pred: fn(&Entity) -> bool| -> Vec<String> {
            nodes
                .iter()
                .filter(|id| self.entities.get(**id).map_or(false, pred))
                .map(|id| id.to_string())
                .collect()
        };

        Some(IntroPath {
            path: nodes.iter().map(|id| id.to_string()).collect(),
            names: nodes.iter().map(|id| self.name_of(id).to_string()).collect(),
            strength: total / hop_count as f64,
            relationship_kinds: kinds,
            hop_count,
            internal_owner_nodes: flagged(|e| e.is_internal_owner),
            linkedin_nodes: flagged(|e| e.linkedin_first_degree),
            explanation: steps.join("; "),
        })
    }
}

/// LinkedIn first-degree count (if preferred), then strength, then internal
/// owners (if preferred); fewer hops and node order make the result total.
fn rank_order(a: &IntroPath, b: &IntroPath, options: &PathOptions) -> Ordering {
    let linkedin = if options.prefer_linkedin {
        b.linkedin_nodes.len().cmp(&a.linkedin_nodes.len())
    } else {
        Ordering::Equal
    };
    let internal = if options.prefer_internal {
        b.internal_owner_nodes.len().cmp(&a.internal_owner_nodes.len())
    } else {
        Ordering::Equal
    };

    linkedin
        .then_with(|| b.strength.total_cmp(&a.strength))
        .then(internal)
        .then_with(|| a.hop_count.cmp(&b.hop_count))
        .then_with(|| a.path.cmp(&b.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntityType;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn person(id: &str) -> Entity {
        Entity::new(id, id.to_uppercase(), EntityType::Person)
    }

    fn owner(id: &str) -> Entity {
        let mut e = person(id);
        e.is_internal_owner = true;
        e
    }

    fn linked(id: &str) -> Entity {
        let mut e = person(id);
        e.linkedin_first_degree = true;
        e
    }

    fn edge(source: &str, target: &str, kind: &str, strength: f64) -> Edge {
        let mut e = Edge::new(format!("{}-{}-{}", source, target, kind), source, target, kind);
        e.strength_score = Some(strength);
        e
    }

    fn options(max_hops: usize, min_strength: f64) -> PathOptions {
        PathOptions {
            max_hops,
            min_strength,
            ..PathOptions::default()
        }
    }

    fn ids(path: &IntroPath) -> Vec<&str> {
        path.path.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_single_two_hop_path() {
        let finder = PathFinder::with_clock(
            vec![owner("s"), person("a"), person("t")],
            vec![edge("s", "a", "knows", 0.8), edge("a", "t", "works_at", 0.6)],
            now(),
        );

        let paths = finder.find_intro_paths("t", &options(3, 0.3));
        assert_eq!(paths.len(), 1);
        let path = &paths[0];
        assert_eq!(ids(path), vec!["s", "a", "t"]);
        assert!((path.strength - 0.7).abs() < 1e-9);
        assert_eq!(path.hop_count, 2);
        assert_eq!(path.names, vec!["S", "A", "T"]);
        assert_eq!(path.relationship_kinds, vec!["knows", "works_at"]);
        assert_eq!(path.internal_owner_nodes, vec!["s"]);
        assert!(path.linkedin_nodes.is_empty());
        assert_eq!(path.explanation, "S → A (knows); A → T (works_at)");
    }

    #[test]
    fn test_no_seeds_yields_empty() {
        let finder = PathFinder::with_clock(
            vec![person("s"), person("a"), person("t")],
            vec![edge("s", "a", "knows", 0.9), edge("a", "t", "knows", 0.9)],
            now(),
        );
        assert!(finder.find_intro_paths("t", &PathOptions::default()).is_empty());
    }

    #[test]
    fn test_target_as_only_seed_yields_empty() {
        let finder = PathFinder::with_clock(
            vec![owner("t"), person("a")],
            vec![edge("t", "a", "knows", 0.9)],
            now(),
        );
        assert!(finder.find_intro_paths("t", &PathOptions::default()).is_empty());
    }

    #[test]
    fn test_unknown_target_yields_empty() {
        let finder = PathFinder::with_clock(vec![owner("s")], vec![], now());
        assert!(finder.find_intro_paths("ghost", &PathOptions::default()).is_empty());
        assert!(finder
            .find_paths_between("s", "ghost", &PathOptions::between())
            .is_empty());
    }

    #[test]
    fn test_reverse_oriented_edges_keep_their_strength() {
        // Stored t -> a -> s; walked s -> a -> t
        let finder = PathFinder::with_clock(
            vec![owner("s"), person("a"), person("t")],
            vec![edge("a", "s", "reports_to", 0.8), edge("t", "a", "founder", 0.6)],
            now(),
        );

        let paths = finder.find_intro_paths("t", &options(3, 0.3));
        assert_eq!(paths.len(), 1);
        assert!((paths[0].strength - 0.7).abs() < 1e-9);
        assert_eq!(paths[0].relationship_kinds, vec!["reports_to", "founder"]);
    }

    #[test]
    fn test_strongest_parallel_edge_is_used() {
        let finder = PathFinder::with_clock(
            vec![owner("s"), person("t")],
            vec![
                edge("s", "t", "met_once", 0.35),
                edge("t", "s", "cofounded", 0.95),
            ],
            now(),
        );

        let paths = finder.find_intro_paths("t", &PathOptions::default());
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].relationship_kinds, vec!["cofounded"]);
        assert!((paths[0].strength - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_constraints_hold_for_every_path() {
        let entities = vec![
            owner("s1"),
            owner("s2"),
            person("a"),
            person("b"),
            person("c"),
            person("d"),
            person("t"),
        ];
        let edges = vec![
            edge("s1", "a", "knows", 0.9),
            edge("a", "b", "knows", 0.2),
            edge("b", "t", "knows", 0.9),
            edge("a", "c", "knows", 0.6),
            edge("c", "d", "knows", 0.7),
            edge("d", "t", "knows", 0.8),
            edge("s2", "c", "knows", 0.4),
            edge("s2", "t", "knows", 0.1),
            edge("b", "d", "knows", 0.5),
        ];
        let finder = PathFinder::with_clock(entities, edges, now());

        for max_hops in 1..=5 {
            for min_strength in [0.0, 0.3, 0.5, 0.7] {
                let opts = PathOptions {
                    max_hops,
                    min_strength,
                    max_paths: 100,
                    ..PathOptions::default()
                };
                for path in finder.find_intro_paths("t", &opts) {
                    assert!(path.hop_count <= max_hops);
                    assert!(path.strength >= min_strength);
                    assert_eq!(path.hop_count + 1, path.path.len());
                    let unique: HashSet<_> = path.path.iter().collect();
                    assert_eq!(unique.len(), path.path.len(), "path revisits a node");
                    assert_eq!(path.path.last().map(String::as_str), Some("t"));
                }
            }
        }
    }

    #[test]
    fn test_min_strength_filters_weak_routes() {
        let finder = PathFinder::with_clock(
            vec![owner("s"), person("a"), person("t")],
            vec![edge("s", "a", "knows", 0.2), edge("a", "t", "knows", 0.2)],
            now(),
        );
        assert!(finder.find_intro_paths("t", &options(4, 0.3)).is_empty());
        assert_eq!(finder.find_intro_paths("t", &options(4, 0.2)).len(), 1);
    }

    #[test]
    fn test_duplicate_routes_collapse() {
        // Both strategies find s-a-t; it must appear once
        let finder = PathFinder::with_clock(
            vec![owner("s"), person("a"), person("b"), person("t")],
            vec![
                edge("s", "a", "knows", 0.9),
                edge("a", "t", "knows", 0.9),
                edge("s", "b", "knows", 0.5),
                edge("b", "t", "knows", 0.5),
            ],
            now(),
        );

        let paths = finder.find_intro_paths("t", &PathOptions::default());
        assert_eq!(paths.len(), 2);
        assert_eq!(ids(&paths[0]), vec!["s", "a", "t"]);
        assert_eq!(ids(&paths[1]), vec!["s", "b", "t"]);
    }

    #[test]
    fn test_linkedin_preference_reorders() {
        let entities = vec![owner("s"), person("a"), linked("l"), person("t")];
        let edges = vec![
            edge("s", "a", "knows", 0.9),
            edge("a", "t", "knows", 0.9),
            edge("s", "l", "knows", 0.5),
            edge("l", "t", "knows", 0.5),
        ];
        let finder = PathFinder::with_clock(entities, edges, now());

        let preferred = finder.find_intro_paths("t", &PathOptions::default());
        assert_eq!(ids(&preferred[0]), vec!["s", "l", "t"]);
        assert_eq!(preferred[0].linkedin_nodes, vec!["l"]);

        let plain = finder.find_intro_paths(
            "t",
            &PathOptions {
                prefer_linkedin: false,
                ..PathOptions::default()
            },
        );
        assert_eq!(ids(&plain[0]), vec!["s", "a", "t"]);
    }

    #[test]
    fn test_internal_preference_breaks_strength_ties() {
        let entities = vec![owner("s"), owner("o"), person("a"), person("t")];
        let edges = vec![
            edge("s", "a", "knows", 0.6),
            edge("a", "t", "knows", 0.6),
            edge("s", "o", "knows", 0.6),
            edge("o", "t", "knows", 0.6),
        ];
        let finder = PathFinder::with_clock(entities, edges, now());
        let opts = PathOptions {
            max_hops: 2,
            ..PathOptions::default()
        };

        let paths = finder.find_intro_paths("t", &opts);
        // s-o-t has two internal owners and beats s-a-t at equal strength
        assert_eq!(ids(&paths[0]), vec!["s", "o", "t"]);
        assert_eq!(paths[0].internal_owner_nodes, vec!["s", "o"]);
    }

    #[test]
    fn test_max_paths_truncates() {
        let mut entities = vec![owner("s"), person("t")];
        let mut edges = Vec::new();
        for i in 0..6 {
            let mid = format!("m{}", i);
            entities.push(person(&mid));
            edges.push(edge("s", &mid, "knows", 0.5 + i as f64 * 0.05));
            edges.push(edge(&mid, "t", "knows", 0.5));
        }
        let finder = PathFinder::with_clock(entities, edges, now());
        let opts = PathOptions {
            max_paths: 3,
            ..PathOptions::default()
        };

        let paths = finder.find_intro_paths("t", &opts);
        assert_eq!(paths.len(), 3);
        assert_eq!(ids(&paths[0]), vec!["s", "m5", "t"]);
        assert!(paths.windows(2).all(|w| w[0].strength >= w[1].strength));
    }

    #[test]
    fn test_results_are_deterministic() {
        let entities = vec![owner("s1"), owner("s2"), person("a"), person("b"), person("t")];
        let edges = vec![
            edge("s1", "a", "knows", 0.7),
            edge("s2", "a", "knows", 0.7),
            edge("a", "t", "knows", 0.7),
            edge("s1", "b", "knows", 0.7),
            edge("b", "t", "knows", 0.7),
        ];
        let first = PathFinder::with_clock(entities.clone(), edges.clone(), now())
            .find_intro_paths("t", &PathOptions::default());
        let second = PathFinder::with_clock(entities, edges, now())
            .find_intro_paths("t", &PathOptions::default());
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_weighted_search_prefers_strong_detour() {
        let finder = PathFinder::with_clock(
            vec![owner("s"), person("a"), person("t")],
            vec![
                edge("s", "t", "met_once", 0.3),
                edge("s", "a", "knows", 0.9),
                edge("a", "t", "knows", 0.9),
            ],
            now(),
        );
        let nodes = finder.strongest_path("s", "t").unwrap();
        assert_eq!(nodes, vec!["s", "a", "t"]);
        assert!(finder.strongest_path("s", "nowhere").is_none());
    }

    #[test]
    fn test_weighted_result_respects_max_hops() {
        let finder = PathFinder::with_clock(
            vec![owner("s"), person("a"), person("b"), person("t")],
            vec![
                edge("s", "a", "knows", 0.9),
                edge("a", "b", "knows", 0.9),
                edge("b", "t", "knows", 0.9),
            ],
            now(),
        );
        assert!(finder.find_intro_paths("t", &options(2, 0.3)).is_empty());
        assert_eq!(finder.find_intro_paths("t", &options(3, 0.3)).len(), 1);
    }

    #[test]
    fn test_recent_interaction_raises_strength() {
        let mut recent = edge("s", "t", "knows", 0.2);
        recent.last_interaction_date = Some(now() - Duration::days(5));
        let finder = PathFinder::with_clock(vec![owner("s"), person("t")], vec![recent], now());

        let paths = finder.find_intro_paths("t", &PathOptions::default());
        assert_eq!(paths.len(), 1);
        assert!((paths[0].strength - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_dangling_and_self_loop_edges_ignored() {
        let finder = PathFinder::with_clock(
            vec![owner("s"), person("t")],
            vec![
                edge("s", "ghost", "knows", 0.9),
                edge("ghost", "t", "knows", 0.9),
                edge("s", "s", "knows", 0.9),
            ],
            now(),
        );
        assert!(finder.find_intro_paths("t", &PathOptions::default()).is_empty());
    }

    #[test]
    fn test_find_paths_between_ignores_seed_flags() {
        let finder = PathFinder::with_clock(
            vec![person("x"), person("a"), person("b"), person("y")],
            vec![
                edge("x", "a", "knows", 0.4),
                edge("a", "y", "knows", 0.4),
                edge("x", "b", "knows", 0.8),
                edge("b", "y", "knows", 0.8),
                edge("x", "y", "knows", 0.1),
            ],
            now(),
        );

        let paths = finder.find_paths_between("x", "y", &PathOptions::between());
        assert_eq!(paths.len(), 2);
        assert_eq!(ids(&paths[0]), vec!["x", "b", "y"]);
        assert_eq!(ids(&paths[1]), vec!["x", "a", "y"]);
        assert!(finder.find_paths_between("x", "x", &PathOptions::between()).is_empty());
    }

    #[test]
    fn test_between_defaults() {
        let opts = PathOptions::between();
        assert_eq!(opts.max_hops, 6);
        assert_eq!(opts.max_paths, 5);
        assert!((opts.min_strength - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_with_clock_pins_evaluation_time() {
        let finder = PathFinder::with_clock(vec![owner("s")], vec![], now());
        assert_eq!(finder.evaluated_at(), now());
    }
}
