//! trackmark - progress tracking for structured documents
//!
//! Command-line front end over the tracking store and progress engine.
//! Item trees are supplied as JSON (`--items tree.json`) in the shape the
//! document parser emits.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use trackmark::config::STATE_DIR_ENV;
use trackmark::{
    compute_content_hash, compute_normalized_hash, ContentChange, FileTrackingState, HashMode,
    ProgressTracker, StateStore, StatusChange, TrackError, TrackableItem, TrackerConfig,
    TrackingStatus,
};

#[derive(Parser)]
#[command(name = "trackmark")]
#[command(version)]
#[command(about = "Track progress of headings, list entries and checkboxes across documents", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding tracking state (overrides config)
    #[arg(long, global = true, value_name = "DIR", env = STATE_DIR_ENV)]
    state_dir: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tracked source files
    List {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show stored tracking state for a source file
    Show {
        /// Source document
        source: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the content hash of a file
    Hash {
        /// File to hash
        file: PathBuf,

        /// Hash after whitespace normalization
        #[arg(long)]
        normalized: bool,
    },

    /// Compare a source file against its stored hash, tracking it if new
    Sync {
        /// Source document
        source: PathBuf,

        /// Ignore whitespace-only changes
        #[arg(long)]
        normalized: bool,
    },

    /// Set an item's status and propagate to its ancestors
    Set {
        /// Source document
        source: PathBuf,

        /// Item id
        item: String,

        /// New status: pending, in_progress or complete
        status: TrackingStatus,

        /// Parsed item tree (JSON)
        #[arg(long, value_name = "FILE")]
        items: PathBuf,
    },

    /// Advance an item to its next status and propagate
    Cycle {
        /// Source document
        source: PathBuf,

        /// Item id
        item: String,

        /// Parsed item tree (JSON)
        #[arg(long, value_name = "FILE")]
        items: PathBuf,
    },

    /// Show deep progress for every parent item
    Progress {
        /// Source document
        source: PathBuf,

        /// Parsed item tree (JSON)
        #[arg(long, value_name = "FILE")]
        items: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Drop tracking records for items no longer in the tree
    Prune {
        /// Source document
        source: PathBuf,

        /// Parsed item tree (JSON)
        #[arg(long, value_name = "FILE")]
        items: PathBuf,
    },

    /// Delete tracking state for one source file
    Forget {
        /// Source document
        source: PathBuf,
    },

    /// Delete all tracking data
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "trackmark=debug,info"
    } else {
        "trackmark=info,warn"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        let code = e
            .downcast_ref::<TrackError>()
            .map_or(1, TrackError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::load_default()?,
    };
    let store = StateStore::from_config(&config, cli.state_dir.as_deref())?;

    match cli.command {
        Commands::List { json } => {
            let files = store.list_tracked_files().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else if files.is_empty() {
                println!("No tracked files");
            } else {
                for file in files {
                    println!("{file}");
                }
            }
        }

        Commands::Show { source, json } => {
            let key = source_key(&source);
            match store.load_file_state(&key).await? {
                Some(state) if json => println!("{}", serde_json::to_string_pretty(&state)?),
                Some(state) => print_state(&state),
                None => println!("{} is not tracked", key),
            }
        }

        Commands::Hash { file, normalized } => {
            let text = read_text(&file)?;
            let hash = if normalized {
                compute_normalized_hash(&text)
            } else {
                compute_content_hash(&text)
            };
            println!("{hash}");
        }

        Commands::Sync { source, normalized } => {
            let key = source_key(&source);
            let text = read_text(&source)?;
            let mode = if normalized {
                HashMode::Normalized
            } else {
                HashMode::Exact
            };
            let tracker = ProgressTracker::new(store).with_hash_mode(mode);
            let result = tracker.reconcile(&key, &text).await?;
            let label = match result.change {
                ContentChange::New => "new".green(),
                ContentChange::Unchanged => "unchanged".normal(),
                ContentChange::Modified => "modified".yellow(),
            };
            println!("{}: {} ({})", key, label, result.state.content_hash);
        }

        Commands::Set {
            source,
            item,
            status,
            items,
        } => {
            let key = source_key(&source);
            let tree = read_items(&items)?;
            let tracker = ProgressTracker::new(store);
            match tracker.set_status(&key, &tree, &item, status).await? {
                Some(change) => print_change(&change),
                None => not_tracked(&key),
            }
        }

        Commands::Cycle {
            source,
            item,
            items,
        } => {
            let key = source_key(&source);
            let tree = read_items(&items)?;
            let tracker = ProgressTracker::new(store);
            match tracker.cycle_status(&key, &tree, &item).await? {
                Some(change) => print_change(&change),
                None => not_tracked(&key),
            }
        }

        Commands::Progress {
            source,
            items,
            json,
        } => {
            let key = source_key(&source);
            let tree = read_items(&items)?;
            let mut tracker = ProgressTracker::new(store);
            let Some(report) = tracker.tree_progress(&key, &tree).await? else {
                not_tracked(&key);
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_empty() {
                println!("No parent items in tree");
            } else {
                for entry in report {
                    let indent = "  ".repeat(entry.depth as usize);
                    let label = if entry.content.is_empty() {
                        entry.item_id.as_str()
                    } else {
                        entry.content.as_str()
                    };
                    println!(
                        "{}{} [{}] {}",
                        indent,
                        label,
                        colorize(entry.status),
                        entry.progress.summary()
                    );
                }
            }
        }

        Commands::Prune { source, items } => {
            let key = source_key(&source);
            let tree = read_items(&items)?;
            let tracker = ProgressTracker::new(store);
            match tracker.prune_missing(&key, &tree).await? {
                Some(removed) => println!("Pruned {} stale items from {}", removed, key),
                None => not_tracked(&key),
            }
        }

        Commands::Forget { source } => {
            let key = source_key(&source);
            store.delete_file_state(&key).await?;
            println!("Forgot {}", key);
        }

        Commands::Clear => {
            let removed = store.clear_all().await?;
            println!("Cleared {} tracked files", removed);
        }
    }

    Ok(())
}

/// Absolute path string used as the state key for a source document.
fn source_key(path: &Path) -> String {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read an item tree: either a JSON array of root items or a single root.
fn read_items(path: &Path) -> anyhow::Result<Vec<TrackableItem>> {
    let text = read_text(path)?;
    if let Ok(items) = serde_json::from_str::<Vec<TrackableItem>>(&text) {
        return Ok(items);
    }
    let root: TrackableItem = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse item tree from {}", path.display()))?;
    Ok(vec![root])
}

fn colorize(status: TrackingStatus) -> colored::ColoredString {
    match status {
        TrackingStatus::Pending => status.as_str().dimmed(),
        TrackingStatus::InProgress => status.as_str().yellow(),
        TrackingStatus::Complete => status.as_str().green(),
    }
}

fn not_tracked(key: &str) {
    println!("{} is not tracked (run `trackmark sync` first)", key);
}

fn print_state(state: &FileTrackingState) {
    println!("{}", state.source_path.bold());
    println!("  hash:    {}", state.content_hash);
    println!("  created: {}", state.created_at.to_rfc3339());
    println!("  updated: {}", state.updated_at.to_rfc3339());
    println!(
        "  items:   {} ({} complete, {} in progress, {} pending)",
        state.items.len(),
        state.count_with_status(TrackingStatus::Complete),
        state.count_with_status(TrackingStatus::InProgress),
        state.count_with_status(TrackingStatus::Pending)
    );

    let mut items: Vec<_> = state.items.values().collect();
    items.sort_by(|a, b| a.item_id.cmp(&b.item_id));
    for item in items {
        println!("    {} [{}]", item.item_id, colorize(item.status));
    }
}

fn print_change(change: &StatusChange) {
    println!("Set {} to {}", change.item_id, colorize(change.status));

    let mut propagated: Vec<_> = change.propagated.iter().collect();
    propagated.sort_by(|a, b| a.0.cmp(b.0));
    for (id, status) in propagated {
        println!("  ↳ {} -> {}", id, colorize(*status));
    }
}
