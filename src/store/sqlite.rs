//! SQLite-backed primary graph store.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{migrate, Db};
use crate::graph::{BusinessAnalysis, Edge, Entity, EntityType};
use crate::store::{GraphStore, NameMatch};
use crate::{IntrographError, Result};

const ENTITY_COLUMNS: &str = "id, name, entity_type, domain, is_internal_owner, is_portfolio, \
     is_pipeline, linkedin_first_degree, business_analysis_json, has_substantive_analysis, \
     enriched, enrichment_source";

const EDGE_COLUMNS: &str = "id, source, target, kind, strength_score, interaction_count, \
     last_interaction_date, source_type";

/// Primary graph store on top of the `entities` / `edges` tables.
#[derive(Debug, Clone)]
pub struct SqliteGraphStore {
    db: Db,
}

impl SqliteGraphStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Open the store at `db_path`, applying pending migrations first.
    pub async fn open<P: AsRef<Path>>(db_path: P, migrations_dir: &Path) -> Result<Self> {
        let db = Db::new(db_path);
        let migrations_dir = migrations_dir.to_path_buf();
        db.with_connection(move |conn| migrate::run_migrations(conn, &migrations_dir))
            .await?;
        Ok(Self::new(db))
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    async fn query_edges(&self, filter: &'static str, key: Option<String>) -> Result<Vec<Edge>> {
        self.db
            .with_connection(move |conn| {
                let sql = format!("SELECT {} FROM edges {} ORDER BY id", EDGE_COLUMNS, filter);
                let mut stmt = conn.prepare(&sql)?;
                let rows = match key {
                    Some(key) => stmt.query_map(params![key], edge_from_row)?,
                    None => stmt.query_map([], edge_from_row)?,
                };
                let mut out = Vec::new();
                for row in rows {
                    out.push(row?);
                }
                Ok(out)
            })
            .await
    }
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

fn entity_from_row(row: &Row<'_>) -> rusqlite::Result<Entity> {
    let entity_type = row
        .get::<_, String>(2)?
        .parse::<EntityType>()
        .map_err(|e| conversion_error(2, e))?;
    let business_analysis = row
        .get::<_, Option<String>>(8)?
        .map(|json| serde_json::from_str::<BusinessAnalysis>(&json))
        .transpose()
        .map_err(|e| conversion_error(8, e))?;

    Ok(Entity {
        id: row.get(0)?,
        name: row.get(1)?,
        entity_type,
        domain: row.get(3)?,
        is_internal_owner: row.get(4)?,
        is_portfolio: row.get(5)?,
        is_pipeline: row.get(6)?,
        linkedin_first_degree: row.get(7)?,
        business_analysis,
        has_substantive_analysis: row.get(9)?,
        enriched: row.get(10)?,
        enrichment_source: row.get(11)?,
    })
}

fn edge_from_row(row: &Row<'_>) -> rusqlite::Result<Edge> {
    let last_interaction_date = row
        .get::<_, Option<String>>(6)?
        .map(|raw| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| conversion_error(6, e))?;

    Ok(Edge {
        id: row.get(0)?,
        source: row.get(1)?,
        target: row.get(2)?,
        kind: row.get(3)?,
        strength_score: row.get(4)?,
        interaction_count: row.get(5)?,
        last_interaction_date,
        source_type: row.get(7)?,
    })
}

/// Escape LIKE wildcards so user text matches literally.
fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    async fn entities_page(
        &self,
        entity_type: Option<EntityType>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Entity>> {
        let type_filter = entity_type.map(|t| t.as_str().to_string());
        self.db
            .with_connection(move |conn| {
                let mut out = Vec::new();
                match type_filter {
                    Some(t) => {
                        let sql = format!(
                            "SELECT {} FROM entities WHERE entity_type = ?1 \
                             ORDER BY id LIMIT ?2 OFFSET ?3",
                            ENTITY_COLUMNS
                        );
                        let mut stmt = conn.prepare(&sql)?;
                        let rows = stmt.query_map(
                            params![t, limit as i64, offset as i64],
                            entity_from_row,
                        )?;
                        for row in rows {
                            out.push(row?);
                        }
                    }
                    None => {
                        let sql = format!(
                            "SELECT {} FROM entities ORDER BY id LIMIT ?1 OFFSET ?2",
                            ENTITY_COLUMNS
                        );
                        let mut stmt = conn.prepare(&sql)?;
                        let rows = stmt
                            .query_map(params![limit as i64, offset as i64], entity_from_row)?;
                        for row in rows {
                            out.push(row?);
                        }
                    }
                }
                Ok(out)
            })
            .await
    }

    async fn get_entity(&self, id: &str) -> Result<Option<Entity>> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let sql = format!("SELECT {} FROM entities WHERE id = ?1", ENTITY_COLUMNS);
                let entity = conn.query_row(&sql, params![id], entity_from_row).optional()?;
                Ok(entity)
            })
            .await
    }

    async fn upsert_entity(&self, entity: &Entity) -> Result<()> {
        let entity = entity.clone();
        let analysis_json = entity
            .business_analysis
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.db
            .with_connection(move |conn| {
                // ON CONFLICT UPDATE rather than REPLACE: REPLACE would cascade-delete the edges.
                conn.execute(
                    r#"
                    INSERT INTO entities (
                        id, name, entity_type, domain, is_internal_owner, is_portfolio,
                        is_pipeline, linkedin_first_degree, business_analysis_json,
                        has_substantive_analysis, enriched, enrichment_source
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                    ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        domain = excluded.domain,
                        is_internal_owner = excluded.is_internal_owner,
                        is_portfolio = excluded.is_portfolio,
                        is_pipeline = excluded.is_pipeline,
                        linkedin_first_degree = excluded.linkedin_first_degree,
                        business_analysis_json = excluded.business_analysis_json,
                        has_substantive_analysis = excluded.has_substantive_analysis,
                        enriched = excluded.enriched,
                        enrichment_source = excluded.enrichment_source,
                        updated_at = CURRENT_TIMESTAMP
                    "#,
                    params![
                        entity.id,
                        entity.name,
                        entity.entity_type.as_str(),
                        entity.domain,
                        entity.is_internal_owner,
                        entity.is_portfolio,
                        entity.is_pipeline,
                        entity.linkedin_first_degree,
                        analysis_json,
                        entity.has_substantive_analysis,
                        entity.enriched,
                        entity.enrichment_source,
                    ],
                )?;
                Ok(())
            })
            .await
    }

    async fn delete_entity(&self, id: &str) -> Result<usize> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let tx = conn.transaction()?;
                let incident: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM edges WHERE source = ?1 OR target = ?1",
                    params![id],
                    |row| row.get(0),
                )?;
                let deleted = tx.execute("DELETE FROM entities WHERE id = ?1", params![id])?;
                tx.commit()?;
                Ok(if deleted == 0 { 0 } else { incident as usize })
            })
            .await
    }

    async fn search_entities(
        &self,
        query: &str,
        mode: NameMatch,
        limit: usize,
    ) -> Result<Vec<Entity>> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.db
            .with_connection(move |conn| {
                const LIKE: &str = "name LIKE ?1 ESCAPE '\\'";
                let (predicate, pattern) = match mode {
                    NameMatch::Exact => ("name = ?1 COLLATE NOCASE", query),
                    NameMatch::Prefix => (LIKE, format!("{}%", escape_like(&query))),
                    NameMatch::Substring => (LIKE, format!("%{}%", escape_like(&query))),
                };
                let sql = format!(
                    "SELECT {} FROM entities WHERE {} ORDER BY name COLLATE NOCASE, id LIMIT ?2",
                    ENTITY_COLUMNS, predicate
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(params![pattern, limit as i64], entity_from_row)?;
                let mut out = Vec::new();
                for row in rows {
                    out.push(row?);
                }
                Ok(out)
            })
            .await
    }

    async fn all_edges(&self) -> Result<Vec<Edge>> {
        self.query_edges("", None).await
    }

    async fn edges_from(&self, source: &str) -> Result<Vec<Edge>> {
        self.query_edges("WHERE source = ?1", Some(source.to_string())).await
    }

    async fn edges_to(&self, target: &str) -> Result<Vec<Edge>> {
        self.query_edges("WHERE target = ?1", Some(target.to_string())).await
    }

    async fn find_edge(&self, source: &str, target: &str, kind: &str) -> Result<Option<Edge>> {
        let (source, target, kind) = (source.to_string(), target.to_string(), kind.to_string());
        self.db
            .with_connection(move |conn| {
                let sql = format!(
                    "SELECT {} FROM edges WHERE source = ?1 AND target = ?2 AND kind = ?3 \
                     ORDER BY id LIMIT 1",
                    EDGE_COLUMNS
                );
                let edge = conn
                    .query_row(&sql, params![source, target, kind], edge_from_row)
                    .optional()?;
                Ok(edge)
            })
            .await
    }

    async fn upsert_edge(&self, edge: &Edge) -> Result<()> {
        let edge = edge.clone();
        self.db
            .with_connection(move |conn| {
                let last = edge.last_interaction_date.map(|d| d.to_rfc3339());
                let written = conn.execute(
                    r#"
                    INSERT INTO edges (
                        id, source, target, kind, strength_score,
                        interaction_count, last_interaction_date, source_type
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(id) DO UPDATE SET
                        source = excluded.source,
                        target = excluded.target,
                        kind = excluded.kind,
                        strength_score = excluded.strength_score,
                        interaction_count = excluded.interaction_count,
                        last_interaction_date = excluded.last_interaction_date,
                        source_type = excluded.source_type
                    "#,
                    params![
                        edge.id,
                        edge.source,
                        edge.target,
                        edge.kind,
                        edge.strength_score,
                        edge.interaction_count,
                        last,
                        edge.source_type,
                    ],
                );
                match written {
                    Ok(_) => Ok(()),
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
                    {
                        Err(IntrographError::EntityNotFound(format!(
                            "edge {} references missing entity ({} -> {})",
                            edge.id, edge.source, edge.target
                        )))
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    async fn delete_edge(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.db
            .with_connection(move |conn| {
                let deleted = conn.execute("DELETE FROM edges WHERE id = ?1", params![id])?;
                Ok(deleted > 0)
            })
            .await
    }
}
