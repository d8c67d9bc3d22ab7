//! Consolidation engine: keeps the stored graph's entity and edge sets canonical.
//!
//! A run has three phases:
//! 1. garbage filtering: entities with malformed or role-label names are deleted outright;
//! 2. duplicate merge: same-type entities sharing a case-insensitive name are merged
//!    into one elected survivor, with their edges migrated onto it;
//! 3. duplicate-edge sweep: remaining edges sharing `(source, target, kind)` are folded.
//!
//! Groups are processed one at a time. A failure inside one group is logged
//! and the run moves on; every step is idempotent, so re-running after a crash
//! finishes the job.

mod garbage;
mod scoring;

pub use garbage::{GarbageFilter, GarbageReason};
pub use scoring::{backfill, candidate_score, elect, Election};

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::graph::{Edge, Entity, EntityType};
use crate::store::{GraphStore, MirrorStore};
use crate::Result;

const DEFAULT_PAGE_SIZE: usize = 500;

/// Outcome counters of one consolidation run.
///
/// Merge counters include work done by a group that later failed; such a
/// group is counted in `failed_groups`, not `merged_groups`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationReport {
    pub garbage_deleted: usize,
    pub merged_groups: usize,
    pub entities_merged: usize,
    pub edges_repointed: usize,
    pub edges_removed: usize,
    pub failed_groups: usize,
    pub failed_deletes: usize,
    pub mirror_failures: usize,
}

impl ConsolidationReport {
    /// True when the run changed nothing in the primary store.
    pub fn is_noop(&self) -> bool {
        self.garbage_deleted == 0
            && self.merged_groups == 0
            && self.entities_merged == 0
            && self.edges_repointed == 0
            && self.edges_removed == 0
    }
}

#[derive(Debug, Default)]
struct MergeOutcome {
    losers: usize,
    repointed: usize,
    removed: usize,
    mirror_failures: usize,
}

pub struct ConsolidationEngine<S: GraphStore> {
    store: S,
    mirror: Option<Box<dyn MirrorStore>>,
    garbage: GarbageFilter,
    page_size: usize,
}

impl<S: GraphStore> ConsolidationEngine<S> {
    pub fn new(store: S) -> Result<Self> {
        Ok(Self {
            store,
            mirror: None,
            garbage: GarbageFilter::new(&[])?,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Keep a secondary graph store in sync with deletions.
    pub fn with_mirror(mut self, mirror: Box<dyn MirrorStore>) -> Self {
        self.mirror = Some(mirror);
        self
    }

    pub fn with_extra_role_labels(mut self, labels: &[String]) -> Result<Self> {
        self.garbage = GarbageFilter::new(labels)?;
        Ok(self)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run all phases once. Only a failure to list entities aborts the run.
    pub async fn run(&self) -> Result<ConsolidationReport> {
        let mut report = ConsolidationReport::default();

        self.delete_garbage(&mut report).await?;
        log::info!(
            "Garbage filtering: {} entities deleted ({} failed)",
            report.garbage_deleted,
            report.failed_deletes
        );

        for entity_type in EntityType::ALL {
            self.merge_duplicates(entity_type, &mut report).await?;
        }
        log::info!(
            "Duplicate merge: {} groups, {} entities absorbed, {} edges re-pointed ({} failed)",
            report.merged_groups,
            report.entities_merged,
            report.edges_repointed,
            report.failed_groups
        );

        let swept = self.sweep_duplicate_edges().await;
        report.edges_removed += swept;
        log::info!(
            "Duplicate-edge sweep: {} edges folded; {} edges removed in total",
            swept,
            report.edges_removed
        );

        if report.mirror_failures > 0 {
            log::warn!(
                "{} mirror deletions failed; the mirror store may lag until the next run",
                report.mirror_failures
            );
        }

        Ok(report)
    }

    async fn delete_garbage(&self, report: &mut ConsolidationReport) -> Result<()> {
        let entities = self.store.all_entities(None, self.page_size).await?;

        for entity in &entities {
            let Some(reason) = self.garbage.classify(&entity.name) else {
                continue;
            };
            match self.store.delete_entity(&entity.id).await {
                Ok(cascaded) => {
                    report.garbage_deleted += 1;
                    log::debug!(
                        "Deleted garbage entity {} {:?} ({}), {} incident edges cascaded",
                        entity.id,
                        entity.name,
                        reason,
                        cascaded
                    );
                    if !self.mirror_delete(&entity.id).await {
                        report.mirror_failures += 1;
                    }
                }
                Err(e) => {
                    report.failed_deletes += 1;
                    log::error!("Failed to delete garbage entity {}: {}", entity.id, e);
                }
            }
        }

        Ok(())
    }

    async fn merge_duplicates(
        &self,
        entity_type: EntityType,
        report: &mut ConsolidationReport,
    ) -> Result<()> {
        let entities = self.store.all_entities(Some(entity_type), self.page_size).await?;

        // BTreeMap: groups are processed in a stable order
        let mut groups: BTreeMap<String, Vec<Entity>> = BTreeMap::new();
        for entity in entities {
            if self.garbage.is_garbage(&entity.name) {
                continue;
            }
            groups.entry(entity.normalized_name()).or_default().push(entity);
        }

        for (name, group) in groups.into_iter().filter(|(_, g)| g.len() > 1) {
            // Filled as work lands, so a group that fails partway still reports it
            let mut outcome = MergeOutcome::default();
            let result = self.merge_group(&group, &mut outcome).await;

            report.entities_merged += outcome.losers;
            report.edges_repointed += outcome.repointed;
            report.edges_removed += outcome.removed;
            report.mirror_failures += outcome.mirror_failures;

            match result {
                Ok(()) => report.merged_groups += 1,
                Err(e) => {
                    report.failed_groups += 1;
                    log::error!(
                        "Skipping {} group {:?} ({} members, {} edges re-pointed so far): {}",
                        entity_type,
                        name,
                        group.len(),
                        outcome.repointed,
                        e
                    );
                }
            }
        }

        Ok(())
    }

    async fn merge_group(&self, group: &[Entity], outcome: &mut MergeOutcome) -> Result<()> {
        let member_ids: HashSet<&str> = group.iter().map(|e| e.id.as_str()).collect();

        let mut scored = Vec::with_capacity(group.len());
        for entity in group {
            let degree = self.degree(&entity.id).await?;
            scored.push((entity, candidate_score(entity, degree)));
        }
        let Some(election) = elect(&scored) else {
            return Ok(());
        };
        let winner_id = election.winner.id.as_str();
        log::debug!(
            "Merging {:?}: survivor {} (score {}), absorbing {:?}",
            election.winner.name,
            winner_id,
            election.winner_score,
            election.losers.iter().map(|e| e.id.as_str()).collect::<Vec<_>>()
        );

        // Fields first, so a crash mid-migration never loses loser attributes
        let mut survivor = election.winner.clone();
        let mut changed = false;
        for loser in &election.losers {
            changed |= backfill(&mut survivor, loser);
        }
        if changed {
            self.store.upsert_entity(&survivor).await?;
        }

        for loser in &election.losers {
            self.migrate_edges(&loser.id, winner_id, &member_ids, outcome).await?;

            let cascaded = self.store.delete_entity(&loser.id).await?;
            if cascaded > 0 {
                log::warn!(
                    "Entity {} still had {} edges at deletion (written during merge?)",
                    loser.id,
                    cascaded
                );
            }
            outcome.losers += 1;
            if !self.mirror_delete(&loser.id).await {
                outcome.mirror_failures += 1;
            }
        }

        Ok(())
    }

    /// Number of distinct edges touching `id`.
    async fn degree(&self, id: &str) -> Result<usize> {
        let outgoing = self.store.edges_from(id).await?;
        let incoming = self.store.edges_to(id).await?;
        let ids: HashSet<String> = outgoing.into_iter().chain(incoming).map(|e| e.id).collect();
        Ok(ids.len())
    }

    /// Move every edge of `loser` onto `winner`. An edge the winner already
    /// has (same counterpart, same kind) is folded into the winner's copy and
    /// deleted; an edge between two group members would become a self-loop and
    /// is deleted. Counts land in `outcome` edge by edge.
    async fn migrate_edges(
        &self,
        loser: &str,
        winner: &str,
        members: &HashSet<&str>,
        outcome: &mut MergeOutcome,
    ) -> Result<()> {
        for edge in self.store.edges_from(loser).await? {
            if members.contains(edge.target.as_str()) {
                outcome.removed += usize::from(self.store.delete_edge(&edge.id).await?);
                continue;
            }
            // Checked immediately before acting
            let existing = self.store.find_edge(winner, &edge.target, &edge.kind).await?;
            match existing {
                Some(existing) => outcome.removed += self.fold_into(existing, &edge).await?,
                None => {
                    let mut moved = edge;
                    moved.source = winner.to_string();
                    self.store.upsert_edge(&moved).await?;
                    outcome.repointed += 1;
                }
            }
        }

        for edge in self.store.edges_to(loser).await? {
            if members.contains(edge.source.as_str()) {
                outcome.removed += usize::from(self.store.delete_edge(&edge.id).await?);
                continue;
            }
            let existing = self.store.find_edge(&edge.source, winner, &edge.kind).await?;
            match existing {
                Some(existing) => outcome.removed += self.fold_into(existing, &edge).await?,
                None => {
                    let mut moved = edge;
                    moved.target = winner.to_string();
                    self.store.upsert_edge(&moved).await?;
                    outcome.repointed += 1;
                }
            }
        }

        Ok(())
    }

    /// Fold `redundant` into `keeper` and delete it. Returns 1 if a row was deleted.
    async fn fold_into(&self, mut keeper: Edge, redundant: &Edge) -> Result<usize> {
        if keeper.id == redundant.id {
            return Ok(0);
        }
        if keeper.absorb(redundant) {
            self.store.upsert_edge(&keeper).await?;
        }
        Ok(usize::from(self.store.delete_edge(&redundant.id).await?))
    }

    /// Collapse edges that share a logical key. Keeps the strongest stored
    /// weight (then smallest id). Returns the number of edges deleted.
    async fn sweep_duplicate_edges(&self) -> usize {
        let edges = match self.store.all_edges().await {
            Ok(edges) => edges,
            Err(e) => {
                log::error!("Skipping duplicate-edge sweep, could not list edges: {}", e);
                return 0;
            }
        };

        let mut by_key: BTreeMap<(String, String, String), Vec<Edge>> = BTreeMap::new();
        for edge in edges {
            by_key
                .entry((edge.source.clone(), edge.target.clone(), edge.kind.clone()))
                .or_default()
                .push(edge);
        }

        let mut removed = 0;
        let duplicated = by_key.into_iter().filter(|(_, copies)| copies.len() > 1);
        for ((source, target, kind), mut copies) in duplicated {
            copies.sort_by(|a, b| {
                b.base_strength()
                    .total_cmp(&a.base_strength())
                    .then_with(|| a.id.cmp(&b.id))
            });
            let mut copies = copies.into_iter();
            let Some(mut keeper) = copies.next() else {
                continue;
            };
            let redundant: Vec<Edge> = copies.collect();

            let mut changed = false;
            for edge in &redundant {
                changed |= keeper.absorb(edge);
            }
            let result: Result<usize> = async {
                if changed {
                    self.store.upsert_edge(&keeper).await?;
                }
                let mut deleted = 0;
                for edge in &redundant {
                    deleted += usize::from(self.store.delete_edge(&edge.id).await?);
                }
                Ok(deleted)
            }
            .await;

            match result {
                Ok(deleted) => removed += deleted,
                Err(e) => log::error!(
                    "Failed to fold duplicate edges {} -[{}]-> {}: {}",
                    source,
                    kind,
                    target,
                    e
                ),
            }
        }

        removed
    }

    /// Best-effort mirror delete. Returns false if the mirror rejected it.
    async fn mirror_delete(&self, id: &str) -> bool {
        let Some(mirror) = &self.mirror else {
            return true;
        };
        match mirror.delete_node(id).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Mirror delete failed for {}: {}", id, e);
                false
            }
        }
    }
}
