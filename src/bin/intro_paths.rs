use clap::Parser;
use intrograph::paths::{path_insights, IntroPath, PathFinder};
use intrograph::store::{load_snapshot, GraphStore, NameMatch, SqliteGraphStore};
use intrograph::{Config, Entity};
use std::path::Path;
use std::time::Instant;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "intro-paths")]
#[command(about = "Find warm-introduction paths from internal owners to a target")]
struct Args {
    /// Target entity id or exact name
    target: String,

    /// Search between this entity and the target instead of from internal owners
    #[arg(long)]
    from: Option<String>,

    #[arg(long)]
    max_hops: Option<usize>,

    #[arg(long)]
    max_paths: Option<usize>,

    #[arg(long)]
    min_strength: Option<f64>,

    /// Do not rank LinkedIn first-degree routes first
    #[arg(long)]
    no_linkedin: bool,

    /// Do not prefer routes through more internal owners
    #[arg(long)]
    no_internal: bool,

    /// Print paths and insights as JSON
    #[arg(long)]
    json: bool,
}

/// Resolve an id or a case-insensitive exact name to one entity.
async fn resolve(store: &SqliteGraphStore, key: &str) -> Result<Entity> {
    if let Some(entity) = store.get_entity(key).await? {
        return Ok(entity);
    }
    let mut matches = store.search_entities(key, NameMatch::Exact, 10).await?;
    match matches.len() {
        0 => anyhow::bail!("No entity with id or name {:?}", key),
        1 => Ok(matches.remove(0)),
        n => {
            let ids: Vec<&str> = matches.iter().map(|e| e.id.as_str()).collect();
            anyhow::bail!("{:?} matches {} entities ({}); pass an id", key, n, ids.join(", "))
        }
    }
}

fn print_path(rank: usize, path: &IntroPath) {
    println!(
        "{:>2}. strength {:.2}  hops {}  {}",
        rank,
        path.strength,
        path.hop_count,
        path.names.join(" → ")
    );
    println!("    {}", path.explanation);
    if !path.linkedin_nodes.is_empty() {
        println!("    LinkedIn first-degree: {}", path.linkedin_nodes.join(", "));
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

    let store = SqliteGraphStore::open(config.db_path(), Path::new("migrations")).await?;

    let target = resolve(&store, &args.target).await?;
    let source = match &args.from {
        Some(key) => Some(resolve(&store, key).await?),
        None => None,
    };

    let mut options = match source {
        Some(_) => intrograph::PathOptions::between(),
        None => config.paths.intro_options(),
    };
    if let Some(max_hops) = args.max_hops {
        options.max_hops = max_hops;
    }
    if let Some(max_paths) = args.max_paths {
        options.max_paths = max_paths;
    }
    if let Some(min_strength) = args.min_strength {
        options.min_strength = min_strength;
    }
    options.prefer_linkedin &= !args.no_linkedin;
    options.prefer_internal &= !args.no_internal;
    options.validate()?;

    let start = Instant::now();
    let snapshot = load_snapshot(&store, config.consolidation.page_size).await?;
    log::info!(
        "Loaded {} entities and {} edges in {:?}",
        snapshot.entities.len(),
        snapshot.edges.len(),
        start.elapsed()
    );

    let finder = PathFinder::from_snapshot(snapshot);
    log::debug!("Edge strengths evaluated at {}", finder.evaluated_at().to_rfc3339());
    let paths = match &source {
        Some(source) => finder.find_paths_between(&source.id, &target.id, &options),
        None => finder.find_intro_paths(&target.id, &options),
    };
    let insights = path_insights(&paths);

    if args.json {
        let out = serde_json::json!({
            "target": target,
            "options": options,
            "evaluatedAt": finder.evaluated_at().to_rfc3339(),
            "paths": paths,
            "insights": insights,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match &source {
        Some(source) => println!("\n=== Paths from {} to {} ===\n", source.name, target.name),
        None => println!("\n=== Introduction paths to {} ===\n", target.name),
    }

    if paths.is_empty() {
        println!(
            "No paths found within {} hops at strength >= {:.2}.",
            options.max_hops, options.min_strength
        );
        return Ok(());
    }

    for (i, path) in paths.iter().enumerate() {
        print_path(i + 1, path);
    }

    println!("\n--- Insights ---");
    println!("Paths:              {}", insights.total_paths);
    println!("Average strength:   {:.2}", insights.average_strength);
    println!("Shortest / longest: {} / {} hops", insights.shortest_path, insights.longest_path);
    println!("Via LinkedIn:       {}", insights.linkedin_paths);
    println!("Via internal owner: {}", insights.internal_owner_paths);
    if !insights.top_connection_types.is_empty() {
        let kinds: Vec<String> = insights
            .top_connection_types
            .iter()
            .map(|c| format!("{} ({})", c.kind, c.count))
            .collect();
        println!("Top connections:    {}", kinds.join(", "));
    }

    Ok(())
}
