//! Demo driver: add items to a scalable Bloom filter and query it.
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use sbloom::{Config, ScalableBloomFilter};

const DEMO_ADD: &[&str] = &[
    "apple",
    "banana",
    "cherry",
    "date",
    "elderberry",
    "fig",
    "grape",
];
const DEMO_CHECK: &[&str] = &["apple", "banana", "cherry", "date", "kiwi", "lemon"];

/// Add items to a scalable Bloom filter and check membership.
#[derive(Parser, Debug)]
#[command(name = "sbloom")]
#[command(about = "Scalable Bloom filter demo")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Use the default configuration instead of a file
    #[arg(long)]
    defaults: bool,

    /// Items to add
    #[arg(short, long, num_args = 1..)]
    add: Vec<String>,

    /// Items to check for
    #[arg(short = 'q', long, num_args = 1..)]
    check: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = if args.defaults {
        Config::default()
    } else {
        if !args.config.exists() {
            error!("Configuration file not found: {}", args.config.display());
            return ExitCode::FAILURE;
        }
        match Config::load(&args.config) {
            Ok(config) => config,
            Err(e) => {
                error!("Error loading configuration: {}", e);
                return ExitCode::FAILURE;
            }
        }
    };
    debug!(?config, "Loaded configuration");

    let filter = match ScalableBloomFilter::new(config) {
        Ok(filter) => filter,
        Err(e) => {
            error!("Error initializing scalable Bloom filter: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for item in items(&args.add, DEMO_ADD) {
        filter.insert(item);
    }
    for item in items(&args.check, DEMO_CHECK) {
        println!("Contains '{}': {}", item, filter.contains(item));
    }
    debug!(
        generations = filter.generations(),
        bits = filter.total_bits(),
        "Done"
    );

    ExitCode::SUCCESS
}

fn items<'a>(given: &'a [String], demo: &'a [&'a str]) -> Vec<&'a str> {
    if given.is_empty() {
        demo.to_vec()
    } else {
        given.iter().map(String::as_str).collect()
    }
}
