//! Storage collaborators for the relationship graph.
//!
//! [`GraphStore`] is the primary store of record; [`MirrorStore`] is the
//! denormalized graph-native copy that consolidation keeps in sync. Both are
//! passed explicitly into the components that need them.

mod mirror;
mod snapshot;
mod sqlite;

pub use mirror::SqliteMirrorStore;
pub use snapshot::{load_snapshot, GraphSnapshot};
pub use sqlite::SqliteGraphStore;

use async_trait::async_trait;

use crate::graph::{Edge, Entity, EntityType};
use crate::Result;

/// How `search_entities` matches the query against entity names (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    Exact,
    Prefix,
    Substring,
}

/// Primary graph store: entities and directed edges.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// One page of entities ordered by id, optionally restricted to a type.
    async fn entities_page(
        &self,
        entity_type: Option<EntityType>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Entity>>;

    /// Every entity (of a type), fetched page by page.
    async fn all_entities(
        &self,
        entity_type: Option<EntityType>,
        page_size: usize,
    ) -> Result<Vec<Entity>> {
        let page_size = page_size.max(1);
        let mut out = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.entities_page(entity_type, offset, page_size).await?;
            let fetched = page.len();
            out.extend(page);
            if fetched < page_size {
                break;
            }
            offset += fetched;
        }
        Ok(out)
    }

    async fn get_entity(&self, id: &str) -> Result<Option<Entity>>;

    /// Insert or replace an entity by id.
    async fn upsert_entity(&self, entity: &Entity) -> Result<()>;

    /// Delete an entity and every edge incident to it.
    /// Returns the number of cascaded edges; deleting a missing id is a no-op.
    async fn delete_entity(&self, id: &str) -> Result<usize>;

    async fn search_entities(
        &self,
        query: &str,
        mode: NameMatch,
        limit: usize,
    ) -> Result<Vec<Entity>>;

    async fn all_edges(&self) -> Result<Vec<Edge>>;

    async fn edges_from(&self, source: &str) -> Result<Vec<Edge>>;

    async fn edges_to(&self, target: &str) -> Result<Vec<Edge>>;

    /// First edge (by id) with the given logical key.
    async fn find_edge(&self, source: &str, target: &str, kind: &str) -> Result<Option<Edge>>;

    /// Insert or replace an edge by id. Re-pointing an edge is an upsert with new endpoints.
    async fn upsert_edge(&self, edge: &Edge) -> Result<()>;

    /// Returns false when no edge had that id.
    async fn delete_edge(&self, id: &str) -> Result<bool>;
}

/// Secondary graph-native store mirrored from the primary.
#[async_trait]
pub trait MirrorStore: Send + Sync {
    /// Remove a node and its relationships. Deleting a missing node succeeds.
    async fn delete_node(&self, id: &str) -> Result<()>;
}
