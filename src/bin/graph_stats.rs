use intrograph::consolidate::GarbageFilter;
use intrograph::store::{load_snapshot, SqliteGraphStore};
use intrograph::{Config, EntityType};
use std::collections::HashMap;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.graph.log_level.as_str()),
    )
    .init();

    let store = SqliteGraphStore::open(config.db_path(), Path::new("migrations")).await?;
    let snapshot = load_snapshot(&store, config.consolidation.page_size).await?;
    let garbage = GarbageFilter::new(&config.consolidation.extra_role_labels)?;

    println!("\n=== Relationship Graph Statistics ===\n");

    println!("{:-<50}", "");
    println!("{:<30} {:>12}", "Entity type", "Count");
    println!("{:-<50}", "");
    for entity_type in EntityType::ALL {
        let count = snapshot
            .entities
            .iter()
            .filter(|e| e.entity_type == entity_type)
            .count();
        println!("{:<30} {:>12}", entity_type.as_str(), count);
    }
    println!("{:-<50}", "");

    let internal = snapshot.entities.iter().filter(|e| e.is_internal_owner).count();
    let linkedin = snapshot.entities.iter().filter(|e| e.linkedin_first_degree).count();
    let analysed = snapshot.entities.iter().filter(|e| e.has_substantive_analysis).count();
    println!("{:<30} {:>12}", "Internal owners", internal);
    println!("{:<30} {:>12}", "LinkedIn first-degree", linkedin);
    println!("{:<30} {:>12}", "With business analysis", analysed);
    println!("{:<30} {:>12}", "Edges", snapshot.edges.len());

    let mut kinds: HashMap<&str, usize> = HashMap::new();
    for edge in &snapshot.edges {
        *kinds.entry(edge.kind.as_str()).or_insert(0) += 1;
    }
    let mut kinds: Vec<_> = kinds.into_iter().collect();
    kinds.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if !kinds.is_empty() {
        println!("\nEdges by kind:\n");
        for (kind, count) in kinds.iter().take(10) {
            println!("  {:<28} {:>12}", kind, count);
        }
    }

    // What the next consolidation run would touch
    let garbage_count = snapshot
        .entities
        .iter()
        .filter(|e| garbage.is_garbage(&e.name))
        .count();

    let mut names: HashMap<(EntityType, String), usize> = HashMap::new();
    for entity in snapshot.entities.iter().filter(|e| !garbage.is_garbage(&e.name)) {
        *names.entry((entity.entity_type, entity.normalized_name())).or_insert(0) += 1;
    }
    let duplicate_groups = names.values().filter(|&&n| n > 1).count();
    let duplicate_entities: usize = names.values().filter(|&&n| n > 1).map(|n| n - 1).sum();

    let mut triples: HashMap<(&str, &str, &str), usize> = HashMap::new();
    for edge in &snapshot.edges {
        *triples
            .entry((edge.source.as_str(), edge.target.as_str(), edge.kind.as_str()))
            .or_insert(0) += 1;
    }
    let redundant_edges: usize = triples.values().filter(|&&n| n > 1).map(|n| n - 1).sum();

    println!("\nPending consolidation:\n");
    println!("{:<30} {:>12}", "Garbage entities", garbage_count);
    println!("{:<30} {:>12}", "Duplicate name groups", duplicate_groups);
    println!("{:<30} {:>12}", "Entities to merge away", duplicate_entities);
    println!("{:<30} {:>12}", "Redundant edges", redundant_edges);

    if garbage_count + duplicate_groups + redundant_edges == 0 {
        println!("\n✓ Graph is canonical");
    } else {
        println!("\nRun `consolidate` to clean up.");
    }

    Ok(())
}
