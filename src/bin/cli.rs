//! Shortly CLI
//!
//! Interactive front end for the mapping store. With no subcommand it
//! runs the menu loop; `shorten` and `expand` run a single operation.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shortly::storage::MemoryStorage;
use shortly::{Config, MappingStore, ShortlyError};
use tracing_subscriber::{fmt, EnvFilter};

/// Shortly CLI
#[derive(Parser, Debug)]
#[command(name = "shortly-cli")]
#[command(about = "Persistent link shortener")]
#[command(
    long_about = "Persistent link shortener.\n\nIf the mapping file exists but cannot be read, the session continues with an empty in-memory store and nothing is saved."
)]
#[command(version)]
struct Args {
    /// Mapping file
    #[arg(short = 'f', long, default_value = shortly::config::DEFAULT_STORAGE_FILE)]
    data_file: PathBuf,

    /// Public domain prefix for short URLs
    #[arg(short, long, default_value = shortly::DEFAULT_DOMAIN)]
    domain: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Shorten a long URL
    Shorten {
        /// The URL to shorten
        url: String,
    },

    /// Expand a short URL (or bare code)
    Expand {
        /// The short URL to expand
        short_url: String,
    },
}

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info";

fn main() {
    // Logs go to stderr so they never interleave with prompts
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .storage_path(&args.data_file)
        .domain(&args.domain)
        .build();

    let store = match open_store(config) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open mapping store: {}", e);
            std::process::exit(1);
        }
    };

    match args.command {
        Some(Commands::Shorten { url }) => {
            if !run_shorten(&store, &url) {
                std::process::exit(1);
            }
        }
        Some(Commands::Expand { short_url }) => {
            if !run_expand(&store, &short_url) {
                std::process::exit(1);
            }
        }
        None => {
            if let Err(e) = interactive(&store) {
                tracing::error!("Terminal error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// Open the file-backed store
///
/// If the mapping file exists but cannot be read, continue with an empty
/// in-memory store instead of exiting. Nothing is saved in that mode, so
/// the unreadable file is never overwritten.
fn open_store(config: Config) -> shortly::Result<MappingStore> {
    match MappingStore::open(config.clone()) {
        Err(ShortlyError::Persistence { source, .. }) => {
            tracing::error!(
                path = %config.storage_path.display(),
                error = %source,
                "Cannot read mappings, continuing in memory; nothing will be saved"
            );
            MappingStore::with_storage(config, MemoryStorage::new())
        }
        other => other,
    }
}

/// Menu loop: shorten, expand, exit
fn interactive(store: &MappingStore) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Welcome to the Persistent Link Shortener!");
    loop {
        println!();
        println!("Menu:");
        println!("1. Shorten a URL");
        println!("2. Expand a Short URL");
        println!("3. Exit");

        let Some(choice) = prompt(&mut lines, "Enter your choice: ")? else {
            break;
        };

        match choice.trim() {
            "1" => {
                let Some(url) = prompt(&mut lines, "Enter the long URL: ")? else {
                    break;
                };
                run_shorten(store, url.trim());
            }
            "2" => {
                let Some(short_url) = prompt(&mut lines, "Enter the short URL: ")? else {
                    break;
                };
                run_expand(store, short_url.trim());
            }
            "3" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }

    if store.is_dirty() {
        if let Err(e) = store.save() {
            eprintln!("Warning: unsaved mappings will be lost ({})", e);
        }
    }

    println!("Exiting the application. Goodbye!");
    Ok(())
}

/// Print a prompt and read one line; `None` on end of input
fn prompt<B: BufRead>(lines: &mut io::Lines<B>, text: &str) -> io::Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    lines.next().transpose()
}

fn run_shorten(store: &MappingStore, url: &str) -> bool {
    match store.shorten(url) {
        Ok(short_url) => {
            println!("Shortened URL: {}", short_url);
            true
        }
        Err(ShortlyError::Persistence {
            short_url: Some(short_url),
            source,
        }) => {
            println!("Shortened URL: {}", short_url);
            eprintln!("Warning: mapping not saved ({}); it will be lost on exit", source);
            false
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    }
}

fn run_expand(store: &MappingStore, short_url: &str) -> bool {
    match store.expand(short_url) {
        Ok(long_url) => {
            println!("Original URL: {}", long_url);
            true
        }
        Err(e) if e.is_not_found() => {
            println!("Error: Short URL not found.");
            false
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            false
        }
    }
}
