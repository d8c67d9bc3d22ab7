//! Versioned SQL migrations for the primary graph store.
//!
//! Files are named `NNN_description.sql` and applied in version order, each in
//! its own transaction. Applied versions are recorded in `schema_migrations`.

use rusqlite::{Connection, params};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use crate::error::{Result, IntrographError};

#[derive(Debug)]
struct Migration {
    version: u32,
    name: String,
    sql: String,
}

fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )",
    )?;
    Ok(())
}

/// Names of applied migrations, in version order.
pub fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations ORDER BY version")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(names)
}

fn applied_versions(conn: &Connection) -> Result<BTreeSet<u32>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations")?;
    let versions = stmt
        .query_map([], |row| row.get::<_, u32>(0))?
        .collect::<std::result::Result<BTreeSet<_>, rusqlite::Error>>()?;
    Ok(versions)
}

/// "001_graph_tables.sql" -> (1, "001_graph_tables")
fn parse_filename(filename: &str) -> Result<(u32, String)> {
    let stem = filename
        .strip_suffix(".sql")
        .ok_or_else(|| IntrographError::Migration(format!("not an .sql file: {}", filename)))?;
    let (prefix, _) = stem.split_once('_').ok_or_else(|| {
        IntrographError::Migration(format!("missing version prefix: {}", filename))
    })?;
    let version = prefix
        .parse::<u32>()
        .map_err(|_| IntrographError::Migration(format!("invalid migration version: {}", prefix)))?;
    Ok((version, stem.to_string()))
}

fn load_migrations(migrations_dir: &Path) -> Result<Vec<Migration>> {
    let mut migrations = Vec::new();

    for entry in fs::read_dir(migrations_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("sql") {
            continue;
        }
        let filename = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
            IntrographError::Migration(format!("invalid filename: {}", path.display()))
        })?;
        let (version, name) = parse_filename(filename)?;
        let sql = fs::read_to_string(&path)?;
        migrations.push(Migration { version, name, sql });
    }

    migrations.sort_by_key(|m| m.version);
    if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
        return Err(IntrographError::Migration(format!(
            "{} and {} share version {}",
            pair[0].name, pair[1].name, pair[0].version
        )));
    }

    Ok(migrations)
}

/// Names of migrations in `migrations_dir` not yet applied to `conn`.
pub fn pending_migrations(conn: &Connection, migrations_dir: &Path) -> Result<Vec<String>> {
    ensure_migrations_table(conn)?;
    let applied = applied_versions(conn)?;
    Ok(load_migrations(migrations_dir)?
        .into_iter()
        .filter(|m| !applied.contains(&m.version))
        .map(|m| m.name)
        .collect())
}

/// Apply every pending migration. Returns how many were applied.
pub fn run_migrations(conn: &mut Connection, migrations_dir: &Path) -> Result<usize> {
    ensure_migrations_table(conn)?;

    let applied = applied_versions(conn)?;
    let mut count = 0;

    for migration in load_migrations(migrations_dir)? {
        if applied.contains(&migration.version) {
            log::debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        log::info!("Applying migration: {} (version {})", migration.name, migration.version);

        let tx = conn.transaction()?;
        tx.execute_batch(&migration.sql)
            .map_err(|e| IntrographError::Migration(format!("{}: {}", migration.name, e)))?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![migration.version, migration.name],
        )?;
        tx.commit()?;

        count += 1;
    }

    if count > 0 {
        log::info!("{} migrations applied", count);
    }
    Ok(count)
}
