use anyhow::{Context, Result, anyhow};
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use crate::{
    cli::{ObfuscateArgs, ProfileArgs},
    config::ObfuscatorConfig,
    io_utils,
    obfuscator::Obfuscator,
    profile::{self, CatalogColumn, Reconciler},
    table::Table,
    uniqueness,
};

pub fn execute(args: &ObfuscateArgs) -> Result<()> {
    let mut config = load_config(&args.profile)?;
    if let Some(rows) = args.preview_rows {
        config.preview_rows = rows;
    }
    let first_input = args
        .inputs
        .first()
        .ok_or_else(|| anyhow!("At least one input file must be provided"))?;
    let delimiter = io_utils::resolve_input_delimiter(first_input, args.profile.delimiter);

    let mut tables = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        let delimiter = io_utils::resolve_input_delimiter(input, args.profile.delimiter);
        let table = Table::read_csv(input, delimiter)
            .with_context(|| format!("Loading result set {input:?}"))?;
        info!("Loaded {} row(s) from {:?}", table.len(), input);
        tables.push(table);
    }

    let live_columns = resolve_catalog(&args.profile, &tables[0].headers)?;
    if args.profile.catalog.is_some() {
        for (input, table) in args.inputs.iter().zip(&tables) {
            profile::ensure_headers_match_catalog(&table.headers, &live_columns)
                .with_context(|| format!("Checking columns of {input:?} against the catalog"))?;
        }
    }
    let reconciliation = Reconciler::new(&config)
        .reconcile(&args.profile.schema, &args.profile.base_table, &live_columns)
        .with_context(|| {
            format!(
                "Reconciling profile for {}.{}",
                args.profile.schema, args.profile.base_table
            )
        })?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let obfuscator = Obfuscator::new(&config);
    let mut combined = Table::default();
    for (input, table) in args.inputs.iter().zip(tables) {
        let obfuscated = obfuscator
            .obfuscate(table, &reconciliation.obfuscation_table, args.preview, &mut rng)
            .with_context(|| format!("Obfuscating {input:?}"))?;
        combined = combined
            .concat(obfuscated)
            .with_context(|| format!("Combining {input:?} with earlier results"))?;
    }

    let combined = uniqueness::enforce_uniqueness(combined, &reconciliation.unique_columns)?;

    let output_delimiter = io_utils::resolve_output_delimiter(
        args.output.as_deref(),
        args.profile.delimiter,
        delimiter,
    );
    combined.write_csv(args.output.as_deref(), output_delimiter)?;
    info!(
        "Wrote {} obfuscated row(s) to {}",
        combined.len(),
        args.output
            .as_deref()
            .map(|p| format!("{p:?}"))
            .unwrap_or_else(|| "stdout".into())
    );
    Ok(())
}

pub fn load_config(args: &ProfileArgs) -> Result<ObfuscatorConfig> {
    let mut config = match &args.config {
        Some(path) => ObfuscatorConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => ObfuscatorConfig::default(),
    };
    if let Some(dir) = &args.profile_dir {
        config.profile_dir = dir.clone();
    }
    Ok(config)
}

/// Catalog file if one was given, otherwise the result set's own header row.
pub fn resolve_catalog(args: &ProfileArgs, headers: &[String]) -> Result<Vec<CatalogColumn>> {
    match &args.catalog {
        Some(path) => {
            let delimiter = io_utils::resolve_input_delimiter(path, args.delimiter);
            profile::load_catalog(path, delimiter)
                .with_context(|| format!("Loading catalog {path:?}"))
        }
        None => Ok(profile::catalog_from_headers(headers)),
    }
}
