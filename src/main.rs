use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use taxonomy_loader::{
    get_load_events, setup_database, taxonomy_stats, TaxonomyLoader, VERSION,
};

const DEFAULT_DB: &str = "taxonomy.db";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("load") => {
            let csv_path = args
                .get(2)
                .context("usage: taxonomy-loader load <csv> [db]")?;
            let db_path = args.get(3).map(String::as_str).unwrap_or(DEFAULT_DB);
            run_load(Path::new(csv_path), Path::new(db_path))
        }
        Some("stats") => {
            let db_path = args.get(2).map(String::as_str).unwrap_or(DEFAULT_DB);
            run_stats(Path::new(db_path))
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    }
}

fn print_usage() {
    eprintln!("taxonomy-loader {}", VERSION);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  taxonomy-loader load <csv> [db]   Bulk-load a taxonomy CSV (db defaults to {})", DEFAULT_DB);
    eprintln!("  taxonomy-loader stats [db]        Show level counts and recent loads");
}

fn run_load(csv_path: &Path, db_path: &Path) -> Result<()> {
    println!("Taxonomy Load: CSV → SQLite");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    setup_database(&conn)?;
    println!("✓ Database ready ({})", db_path.display());

    let report = TaxonomyLoader::new()
        .load(csv_path, &conn)
        .with_context(|| format!("load failed for {}", csv_path.display()))?;

    println!("✓ Parsed {} rows from {}", report.rows, csv_path.display());
    println!("✓ Segments:        {}", report.segments);
    println!("✓ Families:        {}", report.families);
    println!("✓ Classifications: {}", report.classifications);
    println!("✓ Commodities:     {}", report.commodities);

    let stats = taxonomy_stats(&conn)?;
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Database now holds {} taxonomy records", stats.total());

    Ok(())
}

fn run_stats(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        eprintln!("Database not found: {}", db_path.display());
        eprintln!("Run: taxonomy-loader load <csv> [db]");
        std::process::exit(1);
    }

    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;

    let stats = taxonomy_stats(&conn)?;
    println!("Taxonomy levels ({})", db_path.display());
    println!("  Segments:        {}", stats.segments);
    println!("  Families:        {}", stats.families);
    println!("  Classifications: {}", stats.classifications);
    println!("  Commodities:     {}", stats.commodities);

    let events = get_load_events(&conn, 5)?;
    if !events.is_empty() {
        println!();
        println!("Recent load events:");
        for event in events {
            println!(
                "  {} {} {} {}",
                event.timestamp.to_rfc3339(),
                event.event_type,
                event.entity_type,
                event.data
            );
        }
    }

    Ok(())
}
