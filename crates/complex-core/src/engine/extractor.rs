use super::config::AnalysisConfig;
use super::error::ExtractionFailure;
use super::progress::{Progress, ProgressReporter};
use crate::core::composition::Composition;
use crate::core::composition::key::{CanonicalKey, EncodingError};
use crate::core::io::error::UpstreamFetchError;
use crate::core::io::participation::{
    AssemblyParticipation, MappedKind, StructureInput, StructureParticipation,
};
use crate::core::models::participant::{Participant, ParticipantKind};
use crate::core::models::record::StructuralComplexRecord;
use crate::core::utils::identifiers::{assembly_uid, polymer_type_code, unmapped_polymer_label};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Deduplicated structural records plus the structures that contributed none.
#[derive(Debug, Clone, Default)]
pub struct StructuralExtraction {
    records: Vec<StructuralComplexRecord>,
    index: HashMap<CanonicalKey, usize>,
    failures: Vec<ExtractionFailure>,
    structures_committed: usize,
}

impl StructuralExtraction {
    /// Records in the order their keys were first observed.
    pub fn records(&self) -> &[StructuralComplexRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<StructuralComplexRecord> {
        self.records
    }

    pub fn failures(&self) -> &[ExtractionFailure] {
        &self.failures
    }

    pub fn structures_committed(&self) -> usize {
        self.structures_committed
    }

    fn commit(&mut self, staged: StagedStructure) {
        for assembly in staged.assemblies {
            match self.index.get(&assembly.canonical_key) {
                Some(&i) => self.records[i].add_support(&staged.structure_id, assembly.assembly_uid),
                None => {
                    let mut record = StructuralComplexRecord::new(
                        assembly.canonical_key.clone(),
                        assembly.matching_key,
                        assembly.composition,
                    );
                    record.add_support(&staged.structure_id, assembly.assembly_uid);
                    self.index.insert(assembly.canonical_key, self.records.len());
                    self.records.push(record);
                }
            }
        }
        self.structures_committed += 1;
    }
}

struct StagedAssembly {
    assembly_uid: String,
    canonical_key: CanonicalKey,
    matching_key: CanonicalKey,
    composition: Composition,
}

/// Every assembly of one structure, encoded but not yet visible in the extraction.
struct StagedStructure {
    structure_id: String,
    assemblies: Vec<StagedAssembly>,
}

/// Builds one composition per assembly and deduplicates them by canonical key.
///
/// Each structure is staged as a whole: if any of its assemblies fails to encode, none
/// of its assemblies is committed and the structure is reported as an
/// [`ExtractionFailure`]. Upstream failures and protein entities without an organism
/// are reported the same way.
#[instrument(skip_all, name = "structural_extractor")]
pub fn extract(
    inputs: &[StructureInput],
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> StructuralExtraction {
    reporter.report(Progress::TaskStart {
        total_steps: inputs.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = inputs.iter();

    #[cfg(feature = "parallel")]
    let iterator = inputs.par_iter();

    let staged: Vec<Result<StagedStructure, ExtractionFailure>> = iterator
        .map(|input| {
            let result = match input {
                Ok(structure) => stage_structure(structure, config),
                Err(error) => Err(ExtractionFailure::Upstream(error.clone())),
            };
            reporter.report(Progress::TaskIncrement);
            result
        })
        .collect();

    let mut extraction = StructuralExtraction::default();
    for result in staged {
        match result {
            Ok(structure) => extraction.commit(structure),
            Err(failure) => {
                warn!("Skipping structure '{}': {}", failure.structure_id(), failure);
                extraction.failures.push(failure);
            }
        }
    }
    reporter.report(Progress::TaskFinish);

    info!(
        "Extracted {} distinct compositions from {} structure(s); {} structure(s) failed.",
        extraction.records.len(),
        extraction.structures_committed,
        extraction.failures.len()
    );
    extraction
}

fn stage_structure(
    structure: &StructureParticipation,
    config: &AnalysisConfig,
) -> Result<StagedStructure, ExtractionFailure> {
    let mut assembly_order: Vec<&str> = Vec::new();
    let mut by_assembly: HashMap<&str, Vec<&AssemblyParticipation>> = HashMap::new();
    for row in &structure.rows {
        if config.preferred_assemblies_only && !row.is_preferred() {
            continue;
        }
        let assembly_id = row.assembly_id.trim();
        by_assembly
            .entry(assembly_id)
            .or_insert_with(|| {
                assembly_order.push(assembly_id);
                Vec::new()
            })
            .push(row);
    }

    let mut staged = StagedStructure {
        structure_id: structure.structure_id.clone(),
        assemblies: Vec::with_capacity(assembly_order.len()),
    };

    for assembly_id in assembly_order {
        let rows = by_assembly.remove(assembly_id).unwrap_or_default();
        let composition = rows
            .iter()
            .map(|row| to_participant(row, &structure.structure_id))
            .collect::<Result<Composition, _>>()?;

        let encoding_failure = |source: EncodingError| ExtractionFailure::Encoding {
            structure_id: structure.structure_id.clone(),
            assembly_id: assembly_id.to_string(),
            source,
        };
        let canonical_key = composition.canonical_key().map_err(encoding_failure)?;
        let matching_key = composition.matching_key().map_err(encoding_failure)?;

        staged.assemblies.push(StagedAssembly {
            assembly_uid: assembly_uid(&structure.structure_id, assembly_id),
            canonical_key,
            matching_key,
            composition,
        });
    }

    debug!(
        "Staged {} assemblies for structure '{}'.",
        staged.assemblies.len(),
        staged.structure_id
    );
    Ok(staged)
}

fn to_participant(row: &AssemblyParticipation, structure_id: &str) -> Result<Participant, ExtractionFailure> {
    let stoichiometry = row.chain_count;
    let mapped_id = row.mapped_id.trim();
    let fallback = || Participant::structure_entity(row.structure_id.trim(), row.entity_id.trim(), stoichiometry);

    let participant = match row.mapped_kind {
        MappedKind::Resolved(ParticipantKind::ProteinAccession) => {
            let organism = row.organism().ok_or_else(|| ExtractionFailure::MissingOrganism {
                structure_id: structure_id.to_string(),
                entity_id: row.entity_id.clone(),
                accession: mapped_id.to_string(),
            })?;
            Participant::protein(mapped_id, stoichiometry, Some(organism.to_string()))
        }
        MappedKind::Resolved(ParticipantKind::NucleicFamily) => {
            Participant::nucleic_family(mapped_id, stoichiometry)
        }
        MappedKind::Resolved(ParticipantKind::UnmappedPolymer) => {
            if polymer_type_code(mapped_id) == Some("P") {
                fallback()
            } else {
                let label = unmapped_polymer_label(mapped_id).ok_or_else(|| {
                    ExtractionFailure::UnknownPolymerType {
                        structure_id: structure_id.to_string(),
                        entity_id: row.entity_id.clone(),
                        polymer_type: mapped_id.to_string(),
                    }
                })?;
                Participant::unmapped_polymer(label, stoichiometry)
            }
        }
        MappedKind::Resolved(ParticipantKind::StructureEntity) => fallback(),
        MappedKind::Unresolved => {
            return Err(ExtractionFailure::Upstream(UpstreamFetchError {
                structure_id: structure_id.to_string(),
                reason: format!("entity {} could not be resolved", row.entity_id),
            }));
        }
    };
    Ok(participant)
}
