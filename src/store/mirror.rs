//! Graph-native mirror of the primary store, kept in a separate SQLite file.
//!
//! Nodes carry a label (`Person` / `Organization`); relationships carry an
//! upper-snake relationship type derived from the edge kind.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::params;

use crate::db::Db;
use crate::graph::{Edge, Entity, EntityType};
use crate::store::MirrorStore;
use crate::{IntrographError, Result};

const MIRROR_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS mirror_nodes (
    id TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    name TEXT NOT NULL,
    properties_json TEXT NOT NULL DEFAULT '{}'
);
CREATE TABLE IF NOT EXISTS mirror_relationships (
    id TEXT PRIMARY KEY,
    start_node TEXT NOT NULL REFERENCES mirror_nodes(id) ON DELETE CASCADE,
    end_node TEXT NOT NULL REFERENCES mirror_nodes(id) ON DELETE CASCADE,
    rel_type TEXT NOT NULL,
    properties_json TEXT NOT NULL DEFAULT '{}'
);
CREATE INDEX IF NOT EXISTS idx_mirror_rel_start ON mirror_relationships(start_node);
CREATE INDEX IF NOT EXISTS idx_mirror_rel_end ON mirror_relationships(end_node);
"#;

/// SQLite-backed [`MirrorStore`].
#[derive(Debug, Clone)]
pub struct SqliteMirrorStore {
    db: Db,
}

fn node_label(entity_type: EntityType) -> &'static str {
    match entity_type {
        EntityType::Person => "Person",
        EntityType::Organization => "Organization",
    }
}

/// `"works at"` / `"works-at"` -> `WORKS_AT`
fn relationship_type(kind: &str) -> String {
    let mut out = String::with_capacity(kind.len());
    let mut pending_sep = false;
    for c in kind.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_uppercase());
        } else {
            pending_sep = true;
        }
    }
    if out.is_empty() {
        "RELATED_TO".to_string()
    } else {
        out
    }
}

impl SqliteMirrorStore {
    /// Open (and create if needed) the mirror at `db_path`.
    pub async fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db = Db::new(db_path);
        db.with_connection(|conn| {
            conn.execute_batch(MIRROR_SCHEMA)?;
            Ok(())
        })
        .await?;
        Ok(Self { db })
    }

    pub async fn upsert_node(&self, entity: &Entity) -> Result<()> {
        let id = entity.id.clone();
        let label = node_label(entity.entity_type);
        let name = entity.name.clone();
        let properties = serde_json::json!({
            "domain": entity.domain,
            "is_internal_owner": entity.is_internal_owner,
            "is_portfolio": entity.is_portfolio,
            "is_pipeline": entity.is_pipeline,
            "linkedin_first_degree": entity.linkedin_first_degree,
        })
        .to_string();
        self.db
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO mirror_nodes (id, label, name, properties_json) \
                     VALUES (?1, ?2, ?3, ?4) \
                     ON CONFLICT(id) DO UPDATE SET label = excluded.label, name = excluded.name, \
                     properties_json = excluded.properties_json",
                    params![id, label, name, properties],
                )?;
                Ok(())
            })
            .await
    }

    /// Both endpoint nodes must already be mirrored.
    pub async fn upsert_relationship(&self, edge: &Edge) -> Result<()> {
        let edge = edge.clone();
        let rel_type = relationship_type(&edge.kind);
        let properties = serde_json::json!({
            "kind": edge.kind,
            "strength_score": edge.strength_score,
            "interaction_count": edge.interaction_count,
            "source_type": edge.source_type,
        })
        .to_string();
        self.db
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO mirror_relationships \
                     (id, start_node, end_node, rel_type, properties_json) \
                     VALUES (?1, ?2, ?3, ?4, ?5) \
                     ON CONFLICT(id) DO UPDATE SET start_node = excluded.start_node, \
                     end_node = excluded.end_node, rel_type = excluded.rel_type, \
                     properties_json = excluded.properties_json",
                    params![edge.id, edge.source, edge.target, rel_type, properties],
                )
                .map_err(|e| IntrographError::Mirror(format!("relationship {}: {}", edge.id, e)))?;
                Ok(())
            })
            .await
    }

    pub async fn contains_node(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM mirror_nodes WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )?;
                Ok(count > 0)
            })
            .await
    }

    pub async fn node_count(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM mirror_nodes").await
    }

    pub async fn relationship_count(&self) -> Result<usize> {
        self.count("SELECT COUNT(*) FROM mirror_relationships").await
    }

    async fn count(&self, sql: &'static str) -> Result<usize> {
        self.db
            .with_connection(move |conn| {
                let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
                Ok(count as usize)
            })
            .await
    }
}

#[async_trait]
impl MirrorStore for SqliteMirrorStore {
    async fn delete_node(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                conn.execute("DELETE FROM mirror_nodes WHERE id = ?1", params![id])
                    .map_err(|e| IntrographError::Mirror(format!("delete node {}: {}", id, e)))?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_relationship_type_normalisation() {
        assert_eq!(relationship_type("works_at"), "WORKS_AT");
        assert_eq!(relationship_type("invests in"), "INVESTS_IN");
        assert_eq!(relationship_type(" co-founder "), "CO_FOUNDER");
        assert_eq!(relationship_type("--"), "RELATED_TO");
    }

    #[tokio::test]
    async fn test_delete_node_cascades_relationships() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = SqliteMirrorStore::open(temp_dir.path().join("mirror.db")).await.unwrap();

        let a = Entity::new("a", "Ann", EntityType::Person);
        let b = Entity::new("b", "Acme", EntityType::Organization);
        mirror.upsert_node(&a).await.unwrap();
        mirror.upsert_node(&b).await.unwrap();
        mirror.upsert_relationship(&Edge::new("e1", "a", "b", "works_at")).await.unwrap();
        assert_eq!(mirror.node_count().await.unwrap(), 2);
        assert_eq!(mirror.relationship_count().await.unwrap(), 1);

        mirror.delete_node("a").await.unwrap();
        assert!(!mirror.contains_node("a").await.unwrap());
        assert!(mirror.contains_node("b").await.unwrap());
        assert_eq!(mirror.relationship_count().await.unwrap(), 0);

        // Idempotent
        mirror.delete_node("a").await.unwrap();
        mirror.delete_node("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_relationship_requires_nodes() {
        let temp_dir = TempDir::new().unwrap();
        let mirror = SqliteMirrorStore::open(temp_dir.path().join("mirror.db")).await.unwrap();
        let result = mirror.upsert_relationship(&Edge::new("e1", "x", "y", "knows")).await;
        assert!(matches!(result, Err(IntrographError::Mirror(_))));
    }
}
