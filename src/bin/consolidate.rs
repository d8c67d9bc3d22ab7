use clap::Parser;
use intrograph::consolidate::ConsolidationEngine;
use intrograph::store::{SqliteGraphStore, SqliteMirrorStore};
use intrograph::Config;
use std::path::Path;
use std::time::Instant;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "consolidate")]
#[command(about = "Delete garbage entities, merge duplicates and fold redundant edges")]
struct Args {
    /// Skip keeping the mirror store in sync
    #[arg(long)]
    no_mirror: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
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
    let mut engine = ConsolidationEngine::new(store)?
        .with_extra_role_labels(&config.consolidation.extra_role_labels)?
        .with_page_size(config.consolidation.page_size);

    match config.mirror_db_path() {
        Some(path) if !args.no_mirror => {
            log::info!("Mirror store: {}", path.display());
            engine = engine.with_mirror(Box::new(SqliteMirrorStore::open(path).await?));
        }
        _ => log::info!("Mirror store disabled for this run"),
    }

    let start = Instant::now();
    let report = engine.run().await?;
    let elapsed = start.elapsed();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n=== Consolidation Report ===");
    println!("Garbage entities deleted: {}", report.garbage_deleted);
    println!("Duplicate groups merged:  {}", report.merged_groups);
    println!("Entities merged away:     {}", report.entities_merged);
    println!("Edges re-pointed:         {}", report.edges_repointed);
    println!("Redundant edges removed:  {}", report.edges_removed);
    if report.failed_groups > 0 || report.failed_deletes > 0 {
        println!("Failed groups:            {}", report.failed_groups);
        println!("Failed deletes:           {}", report.failed_deletes);
    }
    if report.mirror_failures > 0 {
        println!("Mirror failures:          {}", report.mirror_failures);
    }
    println!("Elapsed:                  {:.2?}", elapsed);
    if report.is_noop() {
        println!("\nGraph already canonical; nothing changed.");
    }

    Ok(())
}
