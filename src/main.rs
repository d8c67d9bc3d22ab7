use intrograph::Config;
use intrograph::db::{Db, migrate};
use intrograph::store::{SqliteGraphStore, SqliteMirrorStore};
use std::path::Path;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "version" => {
            println!("intrograph {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            // Default: verify database schema
            run_schema_verification().await?;
        }
    }

    Ok(())
}

async fn run_schema_verification() -> Result<()> {
    let config = Config::load()?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", config.graph.log_level.as_str())
    ).init();

    log::info!("Starting intrograph v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Database path: {}", config.db_path().display());

    let store = SqliteGraphStore::open(config.db_path(), Path::new("migrations")).await?;
    log::info!("Database initialized successfully");

    verify_database_schema(store.db()).await?;

    match config.mirror_db_path() {
        Some(mirror_path) => {
            let mirror = SqliteMirrorStore::open(mirror_path).await?;
            log::info!(
                "Mirror store ready at {} ({} nodes, {} relationships)",
                mirror_path.display(),
                mirror.node_count().await?,
                mirror.relationship_count().await?
            );
        }
        None => log::info!("Mirror store disabled"),
    }

    Ok(())
}

/// Verify that all expected database objects exist
async fn verify_database_schema(db: &Db) -> Result<()> {
    use intrograph::error::IntrographError;

    db.with_connection(|conn| {
        let mut stmt =
            conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
        let tables: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        let expected_tables = ["edges", "entities", "schema_migrations"];
        let mut all_tables_exist = true;

        for table in &expected_tables {
            if !tables.iter().any(|t| t == table) {
                log::error!("Missing table: {}", table);
                all_tables_exist = false;
            } else {
                log::debug!("✓ Table exists: {}", table);
            }
        }

        if !all_tables_exist {
            return Err(IntrographError::Config("Not all required tables exist".to_string()));
        }

        let applied = migrate::get_applied_migrations(conn)?;
        if applied.len() < 2 {
            return Err(IntrographError::Config(format!(
                "Expected at least 2 migrations, found {}",
                applied.len()
            )));
        }
        log::debug!("✓ {} migrations applied", applied.len());

        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name",
        )?;
        let indexes: Vec<String> = stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

        for index_name in ["idx_entities_type_name", "idx_edges_triple", "idx_edges_target"] {
            if indexes.iter().any(|i| i == index_name) {
                log::debug!("✓ Index exists: {}", index_name);
            } else {
                log::warn!("Index not found: {} (migration 002 may not be applied)", index_name);
            }
        }

        let foreign_keys: i32 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        if foreign_keys != 1 {
            return Err(IntrographError::Config("Foreign keys not enabled".to_string()));
        }
        log::debug!("✓ Foreign keys enabled");

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(IntrographError::Config(format!(
                "Database integrity check failed: {}",
                integrity
            )));
        }
        log::info!("✓ Database integrity: OK");

        Ok(())
    }).await?;

    log::info!("✓ Database schema verification complete");
    Ok(())
}
