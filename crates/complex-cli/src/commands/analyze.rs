use crate::cli::AnalyzeArgs;
use crate::config::{AppConfig, build_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use pdbcomplex::core::io::report::write_report_to_path;
use pdbcomplex::engine::progress::ProgressReporter;
use pdbcomplex::engine::store::SnapshotGraphStore;
use pdbcomplex::workflows::analyze::{self, AnalysisResult};
use tracing::{info, warn};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_config(&args)?;
    let progress_handler = CliProgressHandler::new();
    execute(&config, &progress_handler)?;
    Ok(())
}

pub(crate) fn execute(config: &AppConfig, progress_handler: &CliProgressHandler) -> Result<AnalysisResult> {
    info!("Reading input tables...");
    let inputs = analyze::load_inputs(&config.inputs)?;

    let mut store = match &config.graph_path {
        Some(path) => {
            info!("Opening graph snapshot {:?}", path);
            SnapshotGraphStore::open(path)?
        }
        None => SnapshotGraphStore::new(),
    };

    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    println!("Starting complex analysis...");
    let result = analyze::run(&inputs, &config.core_config, &mut store, &reporter)?;

    if config.graph_path.is_some() {
        store.save()?;
    }
    write_report_to_path(&result.report, &config.report_path)?;

    print_summary(&result);
    println!(
        "✓ Subcomplex report ({} rows) written to: {}",
        result.report.len(),
        config.report_path.display()
    );
    if let Some(path) = &config.graph_path {
        println!("✓ Graph snapshot written to: {}", path.display());
    }
    Ok(result)
}

fn print_summary(result: &AnalysisResult) {
    let resolved = &result.resolved;
    println!(
        "Resolved {} complexes: {} from structures ({} linked to the catalog), {} catalog-only.",
        resolved.records.len(),
        resolved.structural_count,
        resolved.identity_links.len(),
        resolved.reference_only_count
    );
    println!("Found {} subcomplex relationships.", result.lattice.len());

    if !result.extraction_failures.is_empty() {
        warn!(
            "{} structure(s) contributed no complexes.",
            result.extraction_failures.len()
        );
        println!(
            "Warning: {} structure(s) were skipped:",
            result.extraction_failures.len()
        );
        for failure in &result.extraction_failures {
            println!("  {}", failure);
        }
    }
    let missing = result.catalog.missing_organism_count();
    if missing > 0 {
        warn!("{} catalog component(s) have no organism.", missing);
        println!(
            "Warning: {} catalog component(s) have no organism; their complexes cannot match any structure. Pass --organisms to fill them.",
            missing
        );
    }
    let warnings = result.catalog.warnings();
    if !warnings.is_empty() {
        println!(
            "Catalog loaded with {} data-quality warning(s); run 'pdbcomplex catalog' for details.",
            warnings.len()
        );
    }
}
