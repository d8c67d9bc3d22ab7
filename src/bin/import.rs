use clap::Parser;
use intrograph::graph::{BusinessAnalysis, Edge, Entity, EntityType};
use intrograph::store::{GraphStore, SqliteGraphStore, SqliteMirrorStore};
use intrograph::Config;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

#[derive(Parser, Debug)]
#[command(name = "import")]
#[command(about = "Load entities and edges from a JSON export into the graph store")]
struct Args {
    /// JSON file with top-level `entities` and `edges` arrays
    file: PathBuf,

    /// Do not copy imported records into the mirror store
    #[arg(long)]
    no_mirror: bool,
}

#[derive(Debug, Deserialize)]
struct ImportFile {
    #[serde(default)]
    entities: Vec<RawEntity>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
struct RawEntity {
    id: Option<String>,
    name: String,
    #[serde(rename = "type")]
    entity_type: String,
    domain: Option<String>,
    #[serde(default)]
    is_internal_owner: bool,
    #[serde(default)]
    is_portfolio: bool,
    #[serde(default)]
    is_pipeline: bool,
    #[serde(default)]
    linkedin_first_degree: bool,
    /// Free-form: object, sentinel string, or null
    #[serde(default)]
    business_analysis: serde_json::Value,
    #[serde(default)]
    enriched: bool,
    enrichment_source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    id: Option<String>,
    source: String,
    target: String,
    kind: String,
    strength_score: Option<f64>,
    #[serde(default)]
    interaction_count: u32,
    last_interaction_date: Option<chrono::DateTime<chrono::Utc>>,
    source_type: Option<String>,
}

impl RawEntity {
    fn into_entity(self) -> Result<Entity> {
        let entity_type: EntityType = self.entity_type.parse()?;
        let id = self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut entity = Entity::new(id, self.name, entity_type);
        entity.domain = self.domain;
        entity.is_internal_owner = self.is_internal_owner;
        entity.is_portfolio = self.is_portfolio;
        entity.is_pipeline = self.is_pipeline;
        entity.linkedin_first_degree = self.linkedin_first_degree;
        entity.set_business_analysis(BusinessAnalysis::from_raw(&self.business_analysis));
        entity.enriched = self.enriched;
        entity.enrichment_source = self.enrichment_source;
        Ok(entity)
    }
}

impl RawEdge {
    fn into_edge(self) -> Edge {
        let id = self.id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut edge = Edge::new(id, self.source, self.target, self.kind);
        edge.strength_score = self.strength_score;
        edge.interaction_count = self.interaction_count;
        edge.last_interaction_date = self.last_interaction_date;
        edge.source_type = self.source_type;
        edge
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.graph.log_level.as_str())
    ).init();

    log::info!("Database path: {}", config.db_path().display());

    let store = SqliteGraphStore::open(config.db_path(), Path::new("migrations")).await?;
    let mirror = match config.mirror_db_path() {
        Some(path) if !args.no_mirror => Some(SqliteMirrorStore::open(path).await?),
        _ => None,
    };

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let import: ImportFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;
    log::info!(
        "Importing {} entities and {} edges from {}",
        import.entities.len(),
        import.edges.len(),
        args.file.display()
    );

    let mut entities_imported = 0;
    let mut entities_skipped = 0;
    for raw_entity in import.entities {
        let name = raw_entity.name.clone();
        let entity = match raw_entity.into_entity() {
            Ok(entity) => entity,
            Err(e) => {
                log::warn!("Skipping entity {:?}: {}", name, e);
                entities_skipped += 1;
                continue;
            }
        };
        store.upsert_entity(&entity).await?;
        if let Some(mirror) = &mirror {
            mirror.upsert_node(&entity).await?;
        }
        entities_imported += 1;
    }

    let mut edges_imported = 0;
    let mut edges_skipped = 0;
    for raw_edge in import.edges {
        let edge = raw_edge.into_edge();
        if let Err(e) = store.upsert_edge(&edge).await {
            log::warn!("Skipping edge {} ({} -> {}): {}", edge.id, edge.source, edge.target, e);
            edges_skipped += 1;
            continue;
        }
        if let Some(mirror) = &mirror {
            if let Err(e) = mirror.upsert_relationship(&edge).await {
                log::warn!("Mirror rejected edge {}: {}", edge.id, e);
            }
        }
        edges_imported += 1;
    }

    println!("\n=== Import Summary ===");
    println!("Entities imported: {}", entities_imported);
    println!("Entities skipped:  {}", entities_skipped);
    println!("Edges imported:    {}", edges_imported);
    println!("Edges skipped:     {}", edges_skipped);
    if mirror.is_some() {
        println!("Mirror updated:    yes");
    }

    Ok(())
}
