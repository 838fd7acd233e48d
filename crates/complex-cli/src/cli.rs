use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "PDBe Complex Contributors",
    version,
    about = "pdbcomplex - Resolves canonical identities of macromolecular complexes observed in PDB assemblies, links them to a curated catalog, and reports their subcomplex relationships.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence console logging (a --log-file still records everything)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write a debug-level log of the run to this file.
    /// Console filtering can be overridden with the PDBCOMPLEX_LOG environment variable.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: extract, resolve, build the subcomplex lattice and write the results.
    Analyze(AnalyzeArgs),
    /// Load and validate the reference catalog, then print a summary and its data-quality warnings.
    Catalog(CatalogArgs),
    /// Remove derived state from a graph snapshot file.
    Clear(ClearArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    // --- Inputs ---
    /// Per-assembly participation table (CSV).
    #[arg(long, value_name = "PATH")]
    pub participation: Option<PathBuf>,

    /// Catalog complex dump (TSV).
    #[arg(long, value_name = "PATH")]
    pub complexes: Option<PathBuf>,

    /// Catalog component dump (TSV).
    #[arg(long, value_name = "PATH")]
    pub components: Option<PathBuf>,

    /// Catalog cross-reference dump (TSV).
    #[arg(long, value_name = "PATH")]
    pub xrefs: Option<PathBuf>,

    /// Accession to organism lookup (TSV). Without it, catalog organisms come from the
    /// complex taxonomy column only.
    #[arg(long, value_name = "PATH")]
    pub organisms: Option<PathBuf>,

    // --- Outputs ---
    /// Path for the subcomplex report (CSV).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Graph snapshot file to update. Created if it does not exist.
    #[arg(short, long, value_name = "PATH")]
    pub graph: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Overrides ---
    /// Override the prefix of assigned complex identifiers.
    #[arg(long, value_name = "PREFIX")]
    pub id_prefix: Option<String>,

    /// Extract complexes from every assembly, not only preferred ones.
    #[arg(long)]
    pub include_all_assemblies: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S identifiers.prefix=CPX-
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `catalog` subcommand.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Catalog complex dump (TSV).
    #[arg(long, required = true, value_name = "PATH")]
    pub complexes: PathBuf,

    /// Catalog component dump (TSV).
    #[arg(long, required = true, value_name = "PATH")]
    pub components: PathBuf,

    /// Catalog cross-reference dump (TSV).
    #[arg(long, required = true, value_name = "PATH")]
    pub xrefs: PathBuf,

    /// Accession to organism lookup (TSV). Without it, catalog organisms come from the
    /// complex taxonomy column only.
    #[arg(long, value_name = "PATH")]
    pub organisms: Option<PathBuf>,
}

/// Arguments for the `clear` subcommand.
#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Graph snapshot file to clear.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub graph: PathBuf,

    /// Also remove reference complex anchors.
    #[arg(long)]
    pub all: bool,
}
