use crate::core::io::catalog::{
    CatalogComplexRow, CatalogComponentRow, CatalogCrossReferenceRow, OrganismRow,
};
use crate::core::io::participation::{AssemblyParticipation, StructureInput, group_by_structure};
use crate::core::io::report::ReportRow;
use crate::core::io::traits::TabularInput;
use crate::engine::catalog::{CatalogSource, ReferenceCatalog};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::{EngineError, ExtractionFailure};
use crate::engine::extractor::{self, StructuralExtraction};
use crate::engine::identity::{self, ResolvedComplexes};
use crate::engine::lattice::{self, SubcomplexLattice};
use crate::engine::materializer::{self, MaterializationSummary};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::store::GraphStore;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Locations of the boundary files of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub participation: PathBuf,
    pub complexes: PathBuf,
    pub components: PathBuf,
    pub cross_references: PathBuf,
    pub organisms: Option<PathBuf>,
}

/// Raw inputs of one run, read from disk and grouped per structure.
#[derive(Debug, Clone, Default)]
pub struct AnalysisInputs {
    pub catalog: CatalogSource,
    pub structures: Vec<StructureInput>,
}

#[derive(Debug)]
pub struct AnalysisResult {
    pub catalog: ReferenceCatalog,
    pub extraction_failures: Vec<ExtractionFailure>,
    pub resolved: ResolvedComplexes,
    pub lattice: SubcomplexLattice,
    pub report: Vec<ReportRow>,
    pub summary: MaterializationSummary,
}

/// Reads the catalog dumps. Without an organism lookup, component organisms come from
/// the complex taxonomy column alone.
pub fn load_catalog_source(
    complexes: &Path,
    components: &Path,
    cross_references: &Path,
    organisms: Option<&Path>,
) -> Result<CatalogSource, EngineError> {
    let mut source = CatalogSource {
        complexes: CatalogComplexRow::read_from_path(complexes)?,
        components: CatalogComponentRow::read_from_path(components)?,
        cross_references: CatalogCrossReferenceRow::read_from_path(cross_references)?,
        organisms: Vec::new(),
    };
    match organisms {
        Some(path) => source.organisms = OrganismRow::read_from_path(path)?,
        None => warn!("No organism lookup given; catalog organisms come from complex taxonomy only."),
    }
    Ok(source)
}

/// Reads every boundary file named in `paths`.
///
/// # Errors
///
/// Returns [`EngineError::Input`] if any file cannot be read or parsed.
#[instrument(skip_all, name = "load_inputs")]
pub fn load_inputs(paths: &InputPaths) -> Result<AnalysisInputs, EngineError> {
    let catalog = load_catalog_source(
        &paths.complexes,
        &paths.components,
        &paths.cross_references,
        paths.organisms.as_deref(),
    )?;
    let rows = AssemblyParticipation::read_from_path(&paths.participation)?;
    info!(
        "Read {} catalog complexes, {} components and {} participation rows.",
        catalog.complexes.len(),
        catalog.components.len(),
        rows.len()
    );
    Ok(AnalysisInputs {
        catalog,
        structures: group_by_structure(rows),
    })
}

#[cfg(feature = "parallel")]
fn load_and_extract(
    inputs: &AnalysisInputs,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> (ReferenceCatalog, StructuralExtraction) {
    rayon::join(
        || ReferenceCatalog::load(&inputs.catalog),
        || extractor::extract(&inputs.structures, config, reporter),
    )
}

#[cfg(not(feature = "parallel"))]
fn load_and_extract(
    inputs: &AnalysisInputs,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> (ReferenceCatalog, StructuralExtraction) {
    (
        ReferenceCatalog::load(&inputs.catalog),
        extractor::extract(&inputs.structures, config, reporter),
    )
}

/// Runs the full analysis and replaces the derived state of `store` with its results.
///
/// The catalog loader and the structural extractor run side by side; identity
/// resolution, the subcomplex lattice and materialization follow strictly after both.
///
/// # Errors
///
/// Returns an [`EngineError`] if identity resolution finds an inconsistent record set or
/// a store operation fails. Per-structure extraction failures and catalog data-quality
/// problems are not errors; they are reported in the [`AnalysisResult`].
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run<S: GraphStore>(
    inputs: &AnalysisInputs,
    config: &AnalysisConfig,
    store: &mut S,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, EngineError> {
    // === Phase 1: Catalog loading and structural extraction ===
    reporter.report(Progress::PhaseStart {
        name: "Loading Catalog & Extracting Complexes",
    });
    let (catalog, extraction) = load_and_extract(inputs, config, reporter);
    reporter.report(Progress::PhaseFinish);

    let extraction_failures = extraction.failures().to_vec();
    if !extraction_failures.is_empty() {
        reporter.message(format!(
            "{} structure(s) skipped during extraction",
            extraction_failures.len()
        ));
    }
    let missing_organisms = catalog.missing_organism_count();
    if missing_organisms > 0 {
        reporter.message(format!(
            "{} catalog component(s) have no organism",
            missing_organisms
        ));
    }

    // === Phase 2: Identity resolution ===
    let resolved = reporter.phase("Resolving Identities", || {
        identity::resolve(extraction.into_records(), &catalog, config)
    })?;

    // === Phase 3: Subcomplex lattice ===
    reporter.report(Progress::PhaseStart {
        name: "Building Subcomplex Lattice",
    });
    let lattice = lattice::build(&resolved.records, reporter);
    reporter.report(Progress::PhaseFinish);

    // === Phase 4: Materialization ===
    let (summary, report) = reporter.phase("Materializing Results", || {
        let summary = materializer::materialize(store, &catalog, &resolved, &lattice)?;
        let report = materializer::report_rows(&resolved.records, &lattice)?;
        Ok::<_, EngineError>((summary, report))
    })?;

    info!(
        "Analysis complete: {} complexes, {} identity links, {} subcomplex relationships.",
        resolved.records.len(),
        resolved.identity_links.len(),
        lattice.len()
    );
    Ok(AnalysisResult {
        catalog,
        extraction_failures,
        resolved,
        lattice,
        report,
        summary,
    })
}
