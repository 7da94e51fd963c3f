//! StrataKV CLI
//!
//! Runs a single command against an engine directory, then closes the
//! engine (flushing the memtable, since the WAL is not replayed on open).

use clap::{Parser, Subcommand};
use stratakv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// StrataKV CLI
#[derive(Parser, Debug)]
#[command(name = "stratakv-cli")]
#[command(about = "CLI for the StrataKV LSM storage engine")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./stratakv_data")]
    data_dir: String,

    /// MemTable entry count that triggers a flush
    #[arg(short = 'm', long, default_value = "5")]
    memtable_threshold: usize,

    /// SSTable count that triggers compaction
    #[arg(short = 'c', long, default_value = "4")]
    compaction_threshold: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    #[command(alias = "del")]
    Delete {
        /// The key to delete
        key: String,
    },

    /// Print the memtable and every SSTable as JSON
    Inspect,

    /// Merge the oldest SSTables now
    Compact,

    /// Discard all data
    Reset,
}

fn main() {
    // Initialize tracing/logging (stderr, so stdout stays machine-readable)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,stratakv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> stratakv::Result<()> {
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .memtable_threshold(args.memtable_threshold)
        .compaction_threshold(args.compaction_threshold)
        .build();

    let engine = Engine::open(config)?;

    match args.command {
        Commands::Get { key } => match engine.get(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(nil)"),
        },
        Commands::Set { key, value } => {
            engine.set(&key, &value)?;
            println!("OK");
        }
        Commands::Delete { key } => {
            engine.delete(&key)?;
            println!("OK");
        }
        Commands::Inspect => {
            let snapshot = engine.inspect()?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Compact => match engine.compact()? {
            Some(stats) => println!(
                "merged {} tables: {} entries in, {} out, {} tombstones dropped",
                stats.tables_merged,
                stats.entries_read,
                stats.entries_written,
                stats.tombstones_dropped
            ),
            None => println!("nothing to compact"),
        },
        Commands::Reset => {
            engine.reset()?;
            println!("OK");
        }
    }

    engine.close()
}
