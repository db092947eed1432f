mod config;
mod db;
mod error;
mod export;
mod fetch;
mod parser;
mod pipeline;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "cb_scraper", about = "NYC community board directory scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the store from the live site, then export CSV
    Run {
        /// SQLite database path
        #[arg(long)]
        db: Option<PathBuf>,
        /// CSV output path
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Skip the CSV export
        #[arg(long)]
        no_export: bool,
    },
    /// Export the current store as CSV
    Export {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// List stored boards
    List {
        #[arg(long)]
        db: Option<PathBuf>,
        /// Only boards in this borough (e.g. "Staten Island")
        #[arg(short, long)]
        borough: Option<String>,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// Boards per borough
    Stats {
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load()?;

    let result = match cli.command {
        Commands::Run { db, csv, no_export } => {
            override_paths(&mut settings, db, csv);
            let mut store = db::Store::open(&settings.db_path)?;
            println!("Database: {:?}", settings.db_path);
            let source = fetch::HttpSource::new(&settings)?;
            let stats = pipeline::run(&source, &mut store, &settings)?;
            stats.print();
            if !no_export {
                let n = export::export_csv_file(&store, &settings.csv_path)?;
                println!("Wrote {} rows to {:?}", n, settings.csv_path);
            }
            Ok(())
        }
        Commands::Export { db, csv } => {
            override_paths(&mut settings, db, csv);
            let store = db::Store::open(&settings.db_path)?;
            let n = export::export_csv_file(&store, &settings.csv_path)?;
            println!("Wrote {} rows to {:?}", n, settings.csv_path);
            Ok(())
        }
        Commands::List { db, borough, json } => {
            override_paths(&mut settings, db, None);
            let store = db::Store::open(&settings.db_path)?;
            let boards = store.boards(borough.as_deref())?;
            if boards.is_empty() {
                println!("No boards stored. Run 'run' first.");
                return Ok(());
            }
            if json {
                for b in &boards {
                    println!("{}", serde_json::to_string(b)?);
                }
                return Ok(());
            }

            println!(
                "{:>3} | {:<13} | {:<32} | {:<16} | {:<24}",
                "#", "Borough", "Board", "Phone", "Chair"
            );
            println!("{}", "-".repeat(100));
            for (i, b) in boards.iter().enumerate() {
                println!(
                    "{:>3} | {:<13} | {:<32} | {:<16} | {:<24}",
                    i + 1,
                    truncate(b.borough.as_deref().unwrap_or("-"), 13),
                    truncate(&b.name, 32),
                    truncate(b.phone.as_deref().unwrap_or("-"), 16),
                    truncate(b.chair.as_deref().unwrap_or("-"), 24),
                );
            }
            println!("\n{} boards", boards.len());
            Ok(())
        }
        Commands::Stats { db } => {
            override_paths(&mut settings, db, None);
            let store = db::Store::open(&settings.db_path)?;
            let counts = store.borough_counts()?;
            let total: usize = counts.iter().map(|(_, n)| n).sum();
            for (borough, n) in &counts {
                println!("{:<14} {:>3}", borough, n);
            }
            println!("{:<14} {:>3}", "Total", total);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn override_paths(settings: &mut Settings, db: Option<PathBuf>, csv: Option<PathBuf>) {
    if let Some(db) = db {
        settings.db_path = db;
    }
    if let Some(csv) = csv {
        settings.csv_path = csv;
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}
