use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Obfuscate extracted CSV result sets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Obfuscate one or more result sets and write the combined, de-duplicated output
    Obfuscate(ObfuscateArgs),
    /// Check an obfuscation profile against a table's columns
    Reconcile(ReconcileArgs),
}

/// Options shared by every command that loads a profile.
#[derive(Debug, Clone, Args)]
pub struct ProfileArgs {
    /// Schema the table lives in
    #[arg(long)]
    pub schema: String,
    /// Table (or base table) name the profile is keyed by
    #[arg(long = "table")]
    pub base_table: String,
    /// CSV export of the table's columns (`column_name,dtype`); defaults to the input headers
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Folder holding `<schema>.<table>.csv` profiles (overrides the config file)
    #[arg(long = "profile-dir")]
    pub profile_dir: Option<PathBuf>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
}

#[derive(Debug, Args)]
pub struct ObfuscateArgs {
    /// Result set to obfuscate; repeat once per sampling profile, in processing order
    #[arg(short = 'i', long = "input", required = true, action = clap::ArgAction::Append)]
    pub inputs: Vec<PathBuf>,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub profile: ProfileArgs,
    /// Print original and obfuscated values side by side for each rewritten column
    #[arg(long)]
    pub preview: bool,
    /// Number of rows shown per column in the preview (overrides the config file)
    #[arg(long = "preview-rows")]
    pub preview_rows: Option<usize>,
    /// Seed for reproducible per-record shifts
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Result set whose header row lists the table columns (used when --catalog is absent)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    #[command(flatten)]
    pub profile: ProfileArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_chars() {
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("pipe"), Ok(b'|'));
        assert_eq!(parse_delimiter(":"), Ok(b':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("é").is_err());
    }

    #[test]
    fn obfuscate_accepts_repeated_inputs() {
        let cli = Cli::try_parse_from([
            "csv-obfuscate",
            "obfuscate",
            "-i",
            "a.csv",
            "-i",
            "b.csv",
            "--schema",
            "claims",
            "--table",
            "bene",
            "--seed",
            "9",
        ])
        .unwrap();
        let Commands::Obfuscate(args) = cli.command else {
            panic!("expected obfuscate command");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.profile.base_table, "bene");
        assert_eq!(args.seed, Some(9));
    }
}
