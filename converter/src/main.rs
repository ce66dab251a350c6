//! Buildings converter CLI
//!
//! ```bash
//! buildings-converter convert --config converter.json   # Write the consolidated CSVs, summary JSON on stdout
//! buildings-converter convert -i Paris.xlsx -p pp1 -c Paris
//! buildings-converter sheets Buildings_Broadband.xlsx   # List sheets and row counts
//! buildings-converter merge -o merged.csv a.csv b.csv   # Concatenate exports
//! buildings-converter example-config                    # Print the default config
//! ```

use buildings_converter::{
    merge::{self, DEFAULT_EXPORT_PREFIX, DEFAULT_EXPORT_SUFFIX},
    run, ConvertError, ConverterConfig, SheetSource, Workbook,
};
use serde::Serialize;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "buildings-converter")]
#[command(about = "Consolidate building/provider spreadsheets into import CSVs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert workbooks into the consolidated buildings and providers CSVs
    Convert {
        /// JSON config file (defaults apply to missing keys)
        #[arg(long, env = "CONVERTER_CONFIG")]
        config: Option<PathBuf>,

        /// Input workbook (repeatable, replaces configured inputs)
        #[arg(short, long = "input")]
        inputs: Vec<PathBuf>,

        /// Price profile id, one per sheet in order (repeatable)
        #[arg(short = 'p', long = "price-profile")]
        price_profiles: Vec<String>,

        /// City label used in the output file names
        #[arg(short, long)]
        city: Option<String>,

        /// Directory for the output files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip rows with non-numeric or out-of-range coordinates
        #[arg(long)]
        strict_coordinates: bool,
    },

    /// List the sheets of a workbook with their data row counts
    Sheets {
        /// Workbook file
        input: PathBuf,
    },

    /// Concatenate CSV files sharing a header
    Merge {
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Files to merge; when empty, per-profile exports are looked up in --dir
        inputs: Vec<PathBuf>,

        /// Directory holding per-profile exports
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// File name prefix of per-profile exports
        #[arg(long, default_value = DEFAULT_EXPORT_PREFIX)]
        prefix: String,

        /// File name suffix of per-profile exports
        #[arg(long, default_value = DEFAULT_EXPORT_SUFFIX)]
        suffix: String,

        /// First profile number
        #[arg(long, default_value = "1")]
        from: u32,

        /// Last profile number
        #[arg(long, default_value = "13")]
        to: u32,
    },

    /// Print the default configuration as JSON
    ExampleConfig,
}

fn main() -> ExitCode {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            config,
            inputs,
            price_profiles,
            city,
            output_dir,
            strict_coordinates,
        } => cmd_convert(
            config.as_deref(),
            inputs,
            price_profiles,
            city,
            output_dir,
            strict_coordinates,
        ),

        Commands::Sheets { input } => cmd_sheets(&input),

        Commands::Merge {
            output,
            inputs,
            dir,
            prefix,
            suffix,
            from,
            to,
        } => cmd_merge(&output, &inputs, &dir, &prefix, &suffix, from, to),

        Commands::ExampleConfig => cmd_example_config(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Run failed");
            ExitCode::FAILURE
        }
    }
}

fn cmd_convert(
    config_path: Option<&Path>,
    inputs: Vec<PathBuf>,
    price_profiles: Vec<String>,
    city: Option<String>,
    output_dir: Option<PathBuf>,
    strict_coordinates: bool,
) -> Result<(), ConvertError> {
    let mut config = match config_path {
        Some(path) => {
            info!(config = %path.display(), "Loading config");
            ConverterConfig::from_file(path)?
        }
        None => ConverterConfig::default(),
    };

    // Flags override the file
    if !inputs.is_empty() {
        config.inputs = inputs;
    }
    if !price_profiles.is_empty() {
        if !config.sheet_profiles.is_empty() {
            warn!(
                sheets = config.sheet_profiles.len(),
                "--price-profile given, ignoring configured sheetProfiles"
            );
        }
        config.set_price_profiles(price_profiles);
    }
    if let Some(city) = city {
        config.city = city;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    config.strict_coordinates |= strict_coordinates;

    let summary = run(&config)?;
    print_json(&summary)
}

fn cmd_sheets(input: &Path) -> Result<(), ConvertError> {
    let mut workbook = Workbook::open(input)?;

    for sheet in workbook.sheet_names() {
        match workbook.rows(&sheet) {
            Ok(rows) => println!("{}\t{} data rows", sheet, rows.len().saturating_sub(1)),
            Err(e) => println!("{}\tunreadable: {}", sheet, e),
        }
    }

    Ok(())
}

fn cmd_merge(
    output: &Path,
    inputs: &[PathBuf],
    dir: &Path,
    prefix: &str,
    suffix: &str,
    from: u32,
    to: u32,
) -> Result<(), ConvertError> {
    let summary = if inputs.is_empty() {
        merge::merge_profile_exports(dir, prefix, from..=to, suffix, output)?
    } else {
        merge::merge_csv_files(inputs, output)?
    };

    info!(
        files_merged = summary.files_merged,
        files_skipped = summary.files_skipped,
        rows = summary.rows_written,
        "Merge complete"
    );
    print_json(&summary)
}

/// Write a run summary to stdout; logs go to stderr.
fn print_json<T: Serialize>(value: &T) -> Result<(), ConvertError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_example_config() -> Result<(), ConvertError> {
    println!("{}", ConverterConfig::default().to_json()?);
    Ok(())
}
