use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use env_logger::Env;

use review_store::db;
use review_store::error::StoreError;
use review_store::ingest::{LoadConfig, LoadDispatcher, LoadSummary, ProgressCounters};
use review_store::store;

#[derive(Parser, Debug)]
#[command(
    name = "review-store",
    about = "Bulk-load catalog items and reviews into the store, and read them back"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update the store tables.
    Migrate,
    /// Bulk-load a line-delimited JSON items file.
    LoadItems {
        /// Path to the items file, one JSON object per line.
        file: PathBuf,
    },
    /// Bulk-load a line-delimited JSON reviews file into both review tables.
    LoadReviews {
        /// Path to the reviews file, one JSON object per line.
        file: PathBuf,
    },
    /// Look up one item by its ASIN.
    Item { asin: String },
    /// List all reviews written by a reviewer, newest first.
    UserReviews { reviewer_id: String },
    /// List all reviews of an item, newest first.
    ItemReviews { asin: String },
}

fn print_summary(summary: &LoadSummary) {
    println!(
        "submitted: {}, written: {}, parse errors: {}, store errors: {}",
        summary.submitted, summary.written, summary.parse_errors, summary.store_errors
    );
}

#[tokio::main]
async fn main() -> Result<(), StoreError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let pool = db::connect().await?;

    match cli.command {
        Command::Migrate => {
            store::run_migrations(&pool).await?;
        }
        Command::LoadItems { file } => {
            let progress = Arc::new(ProgressCounters::new());
            let dispatcher =
                LoadDispatcher::new(pool.clone(), LoadConfig::from_env(), Arc::clone(&progress));

            let summary = dispatcher.load_items(&file).await?;
            print_summary(&summary);
        }
        Command::LoadReviews { file } => {
            let progress = Arc::new(ProgressCounters::new());
            let dispatcher =
                LoadDispatcher::new(pool.clone(), LoadConfig::from_env(), Arc::clone(&progress));

            let summary = dispatcher.load_reviews(&file).await?;
            print_summary(&summary);
        }
        Command::Item { asin } => {
            let display = store::item_display(&pool, &asin).await?;
            if display.ends_with('\n') {
                print!("{}", display);
            } else {
                println!("{}", display);
            }
        }
        Command::UserReviews { reviewer_id } => {
            for line in store::reviews_by_reviewer(&pool, &reviewer_id).await? {
                print!("{}", line);
            }
        }
        Command::ItemReviews { asin } => {
            for line in store::reviews_by_item(&pool, &asin).await? {
                print!("{}", line);
            }
        }
    }

    db::close(pool).await;
    Ok(())
}
