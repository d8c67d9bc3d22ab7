//! Graph snapshot loader: reads the full graph into memory for path queries.

use std::collections::HashSet;

use crate::graph::{Edge, Entity};
use crate::store::GraphStore;
use crate::Result;

/// Immutable in-memory copy of the graph taken at query time.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    pub entities: Vec<Entity>,
    pub edges: Vec<Edge>,
}

/// Load every entity and every edge whose endpoints both exist.
pub async fn load_snapshot<S>(store: &S, page_size: usize) -> Result<GraphSnapshot>
where
    S: GraphStore + ?Sized,
{
    let entities = store.all_entities(None, page_size).await?;
    let ids: HashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();

    let mut dangling = 0usize;
    let edges: Vec<Edge> = store
        .all_edges()
        .await?
        .into_iter()
        .filter(|edge| {
            let ok = ids.contains(edge.source.as_str()) && ids.contains(edge.target.as_str());
            if !ok {
                dangling += 1;
            }
            ok
        })
        .collect();

    if dangling > 0 {
        log::warn!("Snapshot dropped {} edge(s) referencing missing entities", dangling);
    }
    log::debug!("Snapshot loaded: {} entities, {} edges", entities.len(), edges.len());

    Ok(GraphSnapshot { entities, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntityType;
    use crate::store::SqliteGraphStore;
    use std::path::Path;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_snapshot_reads_everything() {
        let temp_dir = TempDir::new().unwrap();
        let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
        let store = SqliteGraphStore::open(temp_dir.path().join("graph.db"), &migrations_dir)
            .await
            .unwrap();

        for i in 0..5 {
            let person = Entity::new(format!("p{}", i), format!("P{}", i), EntityType::Person);
            store.upsert_entity(&person).await.unwrap();
        }
        store.upsert_edge(&Edge::new("e1", "p0", "p1", "knows")).await.unwrap();
        store.upsert_edge(&Edge::new("e2", "p1", "p2", "knows")).await.unwrap();

        let snapshot = load_snapshot(&store, 2).await.unwrap();
        assert_eq!(snapshot.entities.len(), 5);
        assert_eq!(snapshot.edges.len(), 2);
    }
}
