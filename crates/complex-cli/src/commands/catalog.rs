use crate::cli::CatalogArgs;
use crate::error::Result;
use pdbcomplex::engine::catalog::ReferenceCatalog;
use pdbcomplex::workflows::analyze::load_catalog_source;
use tracing::info;

pub fn run(args: CatalogArgs) -> Result<()> {
    info!("Loading reference catalog...");
    let source = load_catalog_source(
        &args.complexes,
        &args.components,
        &args.xrefs,
        args.organisms.as_deref(),
    )?;
    let catalog = ReferenceCatalog::load(&source);

    println!(
        "Catalog: {} complexes, {} distinct composition keys.",
        catalog.complex_count(),
        catalog.key_count()
    );
    let linked = catalog
        .complexes()
        .filter(|complex| !complex.supporting_structures.is_empty())
        .count();
    println!("{} complexes are linked to at least one structure.", linked);

    let missing = catalog.missing_organism_count();
    if missing > 0 {
        println!("{} component(s) have no organism.", missing);
    }

    let warnings = catalog.warnings();
    if warnings.is_empty() {
        println!("✓ No data-quality warnings.");
    } else {
        println!("{} data-quality warning(s):", warnings.len());
        for warning in warnings {
            println!("  {}", warning);
        }
    }
    Ok(())
}
