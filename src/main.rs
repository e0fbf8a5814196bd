mod category;
mod kakao;
mod model;
mod neis;
mod reconcile;
mod region;
mod store;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use category::{Category, SchoolLevel};
use model::{Pin, PinFile, RawPlace, SchoolInfo, Snapshot};

#[derive(Parser)]
#[command(name = "pin_collector", about = "Korean map pin collector (Kakao Local + NEIS)")]
struct Cli {
    /// Directory holding pin files and raw snapshots
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect one category from Kakao and write its pin file + raw snapshot
    Fetch {
        #[arg(value_enum)]
        category: Category,
    },
    /// Join NEIS school attributes onto school pins
    Enrich {
        #[arg(value_enum)]
        level: SchoolLevel,
    },
    /// Re-derive regions for every category with a stored snapshot
    Region,
    /// Pin counts and region coverage per category
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Fetch { category } => fetch(&cli.data_dir, category).await,
        Commands::Enrich { level } => enrich(&cli.data_dir, level).await,
        Commands::Region => reapply_regions(&cli.data_dir),
        Commands::Stats => stats(&cli.data_dir),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn fetch(data_dir: &Path, category: Category) -> Result<()> {
    let api_key = std::env::var("KAKAO_API_KEY")
        .context("KAKAO_API_KEY is not set (get a REST key at developers.kakao.com and put it in .env)")?;

    println!(
        "Collecting {} across {} regions...",
        category.label(),
        category.search_regions().len()
    );
    let places = kakao::fetch_category(&api_key, category).await?;
    println!("{} unique places after filtering and dedup.", places.len());

    let mut pins: Vec<Pin> = places.iter().map(Pin::from_raw).collect();
    let pin_count = pins.len();
    let matched = reconcile::apply_regions(&mut pins, &places);

    let snapshot_path = store::snapshot_path(data_dir, category.list_id());
    store::save_snapshot(&snapshot_path, &places)?;

    let pins_path = store::pins_path(data_dir, category.list_id());
    store::save_pins(&pins_path, &PinFile { pins })?;

    println!(
        "Saved {} pins ({} region-matched) to {}",
        pin_count,
        matched,
        pins_path.display()
    );
    println!("Raw snapshot: {}", snapshot_path.display());
    Ok(())
}

async fn enrich(data_dir: &Path, level: SchoolLevel) -> Result<()> {
    let api_key = std::env::var("NEIS_API_KEY")
        .context("NEIS_API_KEY is not set (get a key at open.neis.go.kr and put it in .env)")?;

    let category = level.category();
    let pins_path = store::pins_path(data_dir, category.list_id());
    let mut file = store::load_pins(&pins_path)
        .with_context(|| format!("No pin file for {}; run 'fetch' first", category.label()))?;

    println!("Fetching {} records from NEIS...", level.kind_name());
    let schools = neis::fetch_all_schools(&api_key, level).await?;
    store::save_snapshot(&store::neis_snapshot_path(data_dir, level.kind_name()), &schools)?;

    let total = file.pins.len();
    let matched = reconcile::apply_school_info(&mut file.pins, &schools);
    store::save_pins(&pins_path, &file)?;

    println!(
        "Matched {}/{} {} pins against {} NEIS records.",
        matched,
        total,
        category.label(),
        schools.len()
    );
    Ok(())
}

/// Port of the one-off region backfill: rebuild the region field of every
/// pin file from its stored raw snapshot.
fn reapply_regions(data_dir: &Path) -> Result<()> {
    let mut total = 0usize;
    for &category in Category::ALL {
        let snapshot_path = store::snapshot_path(data_dir, category.list_id());
        let pins_path = store::pins_path(data_dir, category.list_id());
        if !snapshot_path.exists() || !pins_path.exists() {
            println!("{}: no snapshot or pin file, skipping.", category.label());
            continue;
        }

        let snapshot: Snapshot<RawPlace> = store::load_snapshot(&snapshot_path)?;
        let mut file = store::load_pins(&pins_path)?;
        let count = file.pins.len();
        let matched = reconcile::apply_regions(&mut file.pins, &snapshot.records);
        store::save_pins(&pins_path, &file)?;

        println!(
            "{}: {} pins updated ({} matched, {} derived from address).",
            category.label(),
            count,
            matched,
            count - matched
        );
        total += count;
    }
    println!("\n{} pins updated in total.", total);
    Ok(())
}

fn stats(data_dir: &Path) -> Result<()> {
    println!(
        "{:>2} | {:<10} | {:>5} | {:>6} | {:>7} | {:>8}",
        "id", "category", "pins", "region", "unknown", "enriched"
    );
    println!("{}", "-".repeat(56));

    for &category in Category::ALL {
        let pins_path = store::pins_path(data_dir, category.list_id());
        if !pins_path.exists() {
            continue;
        }
        let file = store::load_pins(&pins_path)?;

        let with_region = file.pins.iter().filter(|p| p.region.is_some()).count();
        let unknown = file
            .pins
            .iter()
            .filter(|p| p.region.as_deref() == Some(region::UNKNOWN_REGION))
            .count();
        let enriched = file.pins.iter().filter(|p| p.neis_code.is_some()).count();

        println!(
            "{:>2} | {:<10} | {:>5} | {:>6} | {:>7} | {:>8}",
            category.list_id(),
            category.label(),
            file.pins.len(),
            with_region,
            unknown,
            enriched
        );
    }

    if let Ok(entries) = enrich_snapshots(data_dir) {
        if !entries.is_empty() {
            println!("\n--- NEIS snapshots ---");
            for (kind, count, fetched_at) in entries {
                println!("  {}: {} records (fetched {})", kind, count, fetched_at);
            }
        }
    }
    Ok(())
}

fn enrich_snapshots(data_dir: &Path) -> Result<Vec<(String, usize, String)>> {
    let mut entries = Vec::new();
    for kind in ["중학교", "고등학교"] {
        let path = store::neis_snapshot_path(data_dir, kind);
        if !path.exists() {
            continue;
        }
        let snapshot: Snapshot<SchoolInfo> = store::load_snapshot(&path)?;
        entries.push((
            kind.to_string(),
            snapshot.records.len(),
            snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC").to_string(),
        ));
    }
    Ok(entries)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
