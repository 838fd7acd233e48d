use super::catalog::ReferenceCatalog;
use super::error::EngineError;
use super::identity::ResolvedComplexes;
use super::lattice::SubcomplexLattice;
use super::store::{
    AssemblyLink, ComplexNode, GraphStore, ParticipationLink, ReferenceComplexNode,
    SubcomplexLink,
};
use crate::core::io::report::ReportRow;
use crate::core::models::ids::RecordId;
use crate::core::models::record::{ComplexRecord, ComplexRecordSet};
use crate::core::utils::identifiers::strip_assembly_qualifier;
use std::collections::BTreeSet;
use tracing::{info, instrument};

/// Counts of what one materialization wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializationSummary {
    pub complexes: usize,
    pub reference_complexes: usize,
    pub participations: usize,
    pub assembly_links: usize,
    pub identity_links: usize,
    pub subcomplex_links: usize,
}

fn persistence<E>(operation: &'static str, source: E) -> EngineError
where
    E: std::error::Error + Send + Sync + 'static,
{
    EngineError::Persistence {
        operation,
        source: Box::new(source),
    }
}

/// Replaces the derived state of `store` with the given run's results.
///
/// Derived state is cleared first, then reference anchors, complexes, participations,
/// assembly links, identity links and subcomplex links are upserted in that order.
///
/// # Errors
///
/// Returns [`EngineError::Persistence`] on the first failing store operation. Nothing is
/// retried.
#[instrument(skip_all, name = "output_materializer")]
pub fn materialize<S: GraphStore>(
    store: &mut S,
    catalog: &ReferenceCatalog,
    resolved: &ResolvedComplexes,
    lattice: &SubcomplexLattice,
) -> Result<MaterializationSummary, EngineError> {
    let records = &resolved.records;

    let anchors: Vec<ReferenceComplexNode> = catalog
        .complexes()
        .map(|reference| ReferenceComplexNode {
            id: reference.id.clone(),
            name: reference.name.clone(),
            descriptor: reference.descriptor.clone(),
            canonical_key: reference.canonical_key.to_string(),
        })
        .collect();

    let complexes: Vec<ComplexNode> = records
        .iter()
        .map(|(_, record)| ComplexNode {
            id: record.id.clone(),
            canonical_key: record.canonical_key.to_string(),
            participants: record.composition.report_participants(),
        })
        .collect();

    let participations: Vec<ParticipationLink> = records
        .iter()
        .flat_map(|(_, record)| {
            record
                .composition
                .participants()
                .iter()
                .map(move |participant| ParticipationLink {
                    complex_id: record.id.clone(),
                    kind: participant.kind,
                    participant_id: participant.id.clone(),
                    stoichiometry: participant.stoichiometry,
                    organism: participant.organism.clone(),
                })
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let assembly_links: Vec<AssemblyLink> = records
        .iter()
        .flat_map(|(_, record)| {
            record
                .supporting_assemblies
                .iter()
                .map(move |assembly_id| AssemblyLink {
                    complex_id: record.id.clone(),
                    assembly_id: assembly_id.clone(),
                })
        })
        .collect();

    let subcomplex_links = subcomplex_links(records, lattice)?;

    store.clear_derived().map_err(|e| persistence("clear_derived", e))?;
    store
        .upsert_reference_complexes(&anchors)
        .map_err(|e| persistence("upsert_reference_complexes", e))?;
    store
        .upsert_complexes(&complexes)
        .map_err(|e| persistence("upsert_complexes", e))?;
    store
        .upsert_participations(&participations)
        .map_err(|e| persistence("upsert_participations", e))?;
    store
        .upsert_assembly_links(&assembly_links)
        .map_err(|e| persistence("upsert_assembly_links", e))?;
    store
        .upsert_identity_links(&resolved.identity_links)
        .map_err(|e| persistence("upsert_identity_links", e))?;
    store
        .upsert_subcomplex_links(&subcomplex_links)
        .map_err(|e| persistence("upsert_subcomplex_links", e))?;

    let summary = MaterializationSummary {
        complexes: complexes.len(),
        reference_complexes: anchors.len(),
        participations: participations.len(),
        assembly_links: assembly_links.len(),
        identity_links: resolved.identity_links.len(),
        subcomplex_links: subcomplex_links.len(),
    };
    info!("Materialized results: {:?}", summary);
    Ok(summary)
}

fn subcomplex_links(
    records: &ComplexRecordSet,
    lattice: &SubcomplexLattice,
) -> Result<Vec<SubcomplexLink>, EngineError> {
    lattice
        .edges()
        .iter()
        .map(|edge| {
            let (sup, sub) = edge_records(records, edge.super_id, edge.sub_id)?;
            Ok(SubcomplexLink {
                super_id: sup.id.clone(),
                sub_id: sub.id.clone(),
            })
        })
        .collect()
}

fn edge_records<'a>(
    records: &'a ComplexRecordSet,
    super_id: RecordId,
    sub_id: RecordId,
) -> Result<(&'a ComplexRecord, &'a ComplexRecord), EngineError> {
    let lookup = |id: RecordId| {
        records.get(id).ok_or_else(|| {
            EngineError::Internal(format!("subcomplex edge references unknown record {id:?}"))
        })
    };
    Ok((lookup(super_id)?, lookup(sub_id)?))
}

/// Structures attributed to a complex in the report: its supporting structures plus the
/// structures named by its structure-entity fallbacks, qualifiers stripped.
fn report_entries(record: &ComplexRecord) -> String {
    let fallback_structures = record
        .composition
        .participants()
        .iter()
        .filter_map(|participant| participant.fallback_structure())
        .map(str::to_ascii_lowercase);
    let entries: BTreeSet<String> = record
        .supporting_structures
        .iter()
        .map(|structure| strip_assembly_qualifier(structure).to_string())
        .chain(fallback_structures)
        .collect();
    entries.into_iter().collect::<Vec<_>>().join(",")
}

/// One report row per subcomplex edge, in lattice order.
pub fn report_rows(
    records: &ComplexRecordSet,
    lattice: &SubcomplexLattice,
) -> Result<Vec<ReportRow>, EngineError> {
    lattice
        .edges()
        .iter()
        .map(|edge| {
            let (sup, sub) = edge_records(records, edge.super_id, edge.sub_id)?;
            Ok(ReportRow {
                complex_id: sup.id.clone(),
                complex_participants: sup.composition.report_participants(),
                subcomplex_id: sub.id.clone(),
                subcomplex_participants: sub.composition.report_participants(),
                entries: report_entries(sup),
            })
        })
        .collect()
}
