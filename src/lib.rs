pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io_utils;
pub mod literal;
pub mod obfuscate_cmd;
pub mod obfuscator;
pub mod preview;
pub mod profile;
pub mod randomness;
pub mod sniff;
pub mod table;
pub mod transform;
pub mod uniqueness;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_obfuscate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Obfuscate(args) => obfuscate_cmd::execute(&args),
        Commands::Reconcile(args) => handle_reconcile(&args),
    }
}

fn handle_reconcile(args: &cli::ReconcileArgs) -> Result<()> {
    let config = obfuscate_cmd::load_config(&args.profile)?;
    let headers = match (&args.profile.catalog, &args.input) {
        (Some(_), None) => Vec::new(),
        (_, Some(input)) => {
            let delimiter = io_utils::resolve_input_delimiter(input, args.profile.delimiter);
            let mut reader = io_utils::open_csv_reader_from_path(input, delimiter)?;
            reader
                .headers()
                .with_context(|| format!("Reading headers from {input:?}"))?
                .iter()
                .map(|h| h.to_string())
                .collect()
        }
        (None, None) => anyhow::bail!("Either --catalog or --input must be provided"),
    };
    let live_columns = obfuscate_cmd::resolve_catalog(&args.profile, &headers)?;
    if args.profile.catalog.is_some() && args.input.is_some() {
        profile::ensure_headers_match_catalog(&headers, &live_columns)?;
    }
    info!(
        "Reconciling {}.{} against {} live column(s)",
        args.profile.schema,
        args.profile.base_table,
        live_columns.len()
    );
    let reconciliation = profile::Reconciler::new(&config).reconcile(
        &args.profile.schema,
        &args.profile.base_table,
        &live_columns,
    )?;

    let headers = vec![
        "column_name".to_string(),
        "live_dtype".to_string(),
        "obfuscation".to_string(),
        "unique".to_string(),
    ];
    let rows = live_columns
        .iter()
        .map(|column| {
            let name = column.column_name.as_str();
            vec![
                name.to_string(),
                column.dtype.clone().unwrap_or_default(),
                reconciliation
                    .obfuscation_table
                    .kind_for(name)
                    .map(|kind| kind.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                if reconciliation.unique_columns.iter().any(|u| u == name) {
                    "yes".to_string()
                } else {
                    String::new()
                },
            ]
        })
        .collect::<Vec<_>>();
    print!("{}", table::render_table(&headers, &rows));
    info!(
        "✓ Profile matches; {} column(s) to obfuscate, {} unique column(s)",
        reconciliation.obfuscation_table.len(),
        reconciliation.unique_columns.len()
    );
    Ok(())
}
