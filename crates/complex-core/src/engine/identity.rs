use super::catalog::ReferenceCatalog;
use super::config::AnalysisConfig;
use super::error::EngineError;
use crate::core::composition::key::{CanonicalKey, TokenForm};
use crate::core::models::record::{
    ComplexRecord, ComplexRecordSet, IdentityLink, RecordOrigin, StructuralComplexRecord,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, instrument, warn};

/// The finalized record set and the identity links between its records and the catalog.
#[derive(Debug, Clone, Default)]
pub struct ResolvedComplexes {
    pub records: ComplexRecordSet,
    pub identity_links: Vec<IdentityLink>,
    pub structural_count: usize,
    pub reference_only_count: usize,
}

/// Matches structural records against the catalog and assigns run-wide identifiers.
///
/// Structural records are numbered first, in discovery order. A structural record is
/// linked to the catalog complex owning its matching key; when several records share a
/// matching key, the one with the smallest canonical key claims it. A record only claims
/// a key whose catalog composition has the same participant kinds. Catalog keys left
/// unclaimed become reference-only records, numbered next in canonical-key order, unless
/// a structural record of other participant kinds already holds the key.
///
/// # Errors
///
/// Returns [`EngineError::RecordSet`] if two finalized records end up with the same
/// canonical key or identifier.
#[instrument(skip_all, name = "identity_resolver")]
pub fn resolve(
    structural: Vec<StructuralComplexRecord>,
    catalog: &ReferenceCatalog,
    config: &AnalysisConfig,
) -> Result<ResolvedComplexes, EngineError> {
    let claims = claim_reference_keys(&structural, catalog);
    let claimed: BTreeSet<&CanonicalKey> = claims.values().map(|(key, _)| *key).collect();

    let mut resolved = ResolvedComplexes::default();
    let mut next_id = 1usize;
    let mut assign_id = || {
        let id = format!("{}{}", config.id_prefix, next_id);
        next_id += 1;
        id
    };

    let mut links = Vec::with_capacity(claims.len());
    for (index, record) in structural.iter().enumerate() {
        let id = assign_id();
        let reference_id = claims.get(&index).map(|(_, reference_id)| reference_id.to_string());
        if let Some(reference_id) = &reference_id {
            links.push(IdentityLink {
                structural_id: id.clone(),
                reference_id: reference_id.clone(),
            });
        }
        insert(
            &mut resolved.records,
            ComplexRecord {
                id,
                ordinal: 0,
                origin: RecordOrigin::Structural { reference_id },
                canonical_key: record.canonical_key.clone(),
                composition: record.composition.clone(),
                supporting_structures: record.supporting_structures.clone(),
                supporting_assemblies: record.supporting_assemblies.clone(),
            },
        )?;
    }
    resolved.structural_count = structural.len();

    for (key, reference) in catalog.keyed_records() {
        if claimed.contains(key) {
            continue;
        }
        if let Some((_, holder)) = resolved.records.by_key(key) {
            warn!(
                "Catalog complex '{}' shares key '{}' with '{}' but not its participant kinds; no reference-only record is emitted.",
                reference.id, key, holder.id
            );
            continue;
        }
        insert(
            &mut resolved.records,
            ComplexRecord {
                id: assign_id(),
                ordinal: 0,
                origin: RecordOrigin::Reference {
                    reference_id: reference.id.clone(),
                },
                canonical_key: key.clone(),
                composition: reference.composition.clone(),
                supporting_structures: reference.supporting_structures.clone(),
                supporting_assemblies: BTreeSet::new(),
            },
        )?;
        resolved.reference_only_count += 1;
    }

    resolved.identity_links = links;
    info!(
        "Resolved {} structural complexes ({} linked to the catalog) and {} reference-only complexes.",
        resolved.structural_count,
        resolved.identity_links.len(),
        resolved.reference_only_count
    );
    Ok(resolved)
}

/// Maps structural record index to the claimed catalog key and its complex id.
fn claim_reference_keys<'a>(
    structural: &[StructuralComplexRecord],
    catalog: &'a ReferenceCatalog,
) -> HashMap<usize, (&'a CanonicalKey, &'a str)> {
    let mut by_canonical_key: Vec<usize> = (0..structural.len()).collect();
    by_canonical_key.sort_by(|&a, &b| structural[a].canonical_key.cmp(&structural[b].canonical_key));

    let mut claimed: BTreeSet<&CanonicalKey> = BTreeSet::new();
    let mut claims = HashMap::new();
    for index in by_canonical_key {
        let matching_key = &structural[index].matching_key;
        let Some(reference) = catalog.get_by_key(matching_key) else {
            continue;
        };
        if !structural[index]
            .composition
            .has_kinds_of(&reference.composition, TokenForm::Matching)
        {
            debug!(
                "Key '{}' of '{}' names participants of another kind in the catalog.",
                matching_key, reference.id
            );
            continue;
        }
        if !claimed.insert(&reference.canonical_key) {
            debug!(
                "Catalog key '{}' already claimed; '{}' stays unlinked.",
                matching_key, structural[index].canonical_key
            );
            continue;
        }
        claims.insert(index, (&reference.canonical_key, reference.id.as_str()));
    }
    claims
}

fn insert(records: &mut ComplexRecordSet, record: ComplexRecord) -> Result<(), EngineError> {
    records.insert(record)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::composition::Composition;
    use crate::core::io::catalog::{CatalogComplexRow, CatalogComponentRow};
    use crate::core::models::participant::Participant;
    use crate::engine::catalog::CatalogSource;
    use std::collections::HashSet;

    fn structural(participants: Vec<Participant>, structure: &str) -> StructuralComplexRecord {
        let composition = Composition::from_participants(participants);
        let mut record = StructuralComplexRecord::new(
            composition.canonical_key().unwrap(),
            composition.matching_key().unwrap(),
            composition,
        );
        record.add_support(structure, format!("{structure}_1"));
        record
    }

    fn protein(id: &str, n: u32) -> Participant {
        Participant::protein(id, n, Some("9606".to_string()))
    }

    fn catalog(entries: Vec<(&str, Vec<(&str, u32)>)>) -> ReferenceCatalog {
        let mut source = CatalogSource::default();
        for (id, members) in entries {
            source.complexes.push(CatalogComplexRow {
                complex_id: id.to_string(),
                name: format!("{id} name"),
                descriptor: String::new(),
                taxonomy: None,
            });
            for (accession, n) in members {
                source.components.push(CatalogComponentRow {
                    complex_id: id.to_string(),
                    accession: accession.to_string(),
                    stoichiometry: n.to_string(),
                    organism: Some("9606".to_string()),
                });
            }
        }
        ReferenceCatalog::load(&source)
    }

    #[test]
    fn exact_match_creates_one_link_and_no_orphan() {
        let catalog = catalog(vec![("CPX-1", vec![("P1", 2), ("P2", 1)])]);
        let records = vec![structural(vec![protein("P2", 1), protein("P1", 2)], "1abc")];
        let resolved = resolve(records, &catalog, &AnalysisConfig::default()).unwrap();

        assert_eq!(
            resolved.identity_links,
            vec![IdentityLink {
                structural_id: "PDB-CPX-1".to_string(),
                reference_id: "CPX-1".to_string(),
            }]
        );
        assert_eq!(resolved.records.len(), 1);
        assert_eq!(resolved.reference_only_count, 0);
        let (_, record) = resolved.records.by_id("PDB-CPX-1").unwrap();
        assert_eq!(record.origin.reference_id(), Some("CPX-1"));
    }

    #[test]
    fn unclaimed_catalog_keys_become_reference_only_records_in_key_order() {
        let catalog = catalog(vec![
            ("CPX-9", vec![("Q1", 1)]),
            ("CPX-8", vec![("P5", 1)]),
            ("CPX-1", vec![("P1", 1)]),
        ]);
        let records = vec![
            structural(vec![protein("P1", 1)], "1abc"),
            structural(vec![protein("P7", 1)], "2xyz"),
        ];
        let resolved = resolve(records, &catalog, &AnalysisConfig::default()).unwrap();

        let summary: Vec<(&str, Option<&str>, bool)> = resolved
            .records
            .iter()
            .map(|(_, r)| (r.id.as_str(), r.origin.reference_id(), r.origin.is_structural()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("PDB-CPX-1", Some("CPX-1"), true),
                ("PDB-CPX-2", None, true),
                ("PDB-CPX-3", Some("CPX-8"), false),
                ("PDB-CPX-4", Some("CPX-9"), false),
            ]
        );
        assert_eq!(resolved.structural_count, 2);
        assert_eq!(resolved.reference_only_count, 2);
    }

    #[test]
    fn reference_only_records_carry_linked_structures() {
        let mut source = CatalogSource::default();
        source.complexes.push(CatalogComplexRow {
            complex_id: "CPX-1".to_string(),
            name: "Monomer".to_string(),
            descriptor: String::new(),
            taxonomy: None,
        });
        source.components.push(CatalogComponentRow {
            complex_id: "CPX-1".to_string(),
            accession: "P1".to_string(),
            stoichiometry: "1".to_string(),
            organism: None,
        });
        source
            .cross_references
            .push(crate::core::io::catalog::CatalogCrossReferenceRow {
                complex_id: "CPX-1".to_string(),
                structures: "4HHB".to_string(),
            });
        let catalog = ReferenceCatalog::load(&source);
        let resolved = resolve(Vec::new(), &catalog, &AnalysisConfig::default()).unwrap();
        let (_, record) = resolved.records.by_id("PDB-CPX-1").unwrap();
        assert!(record.supporting_structures.contains("4hhb"));
        assert!(record.supporting_assemblies.is_empty());
    }

    #[test]
    fn shared_matching_key_is_claimed_once_by_smallest_canonical_key() {
        let catalog = catalog(vec![("CPX-1", vec![("P1", 1)])]);
        let mut later = structural(vec![protein("P1", 1)], "1abc");
        let mut earlier = structural(vec![protein("P1", 1)], "2xyz");
        // Same matching key, distinct canonical keys.
        later.canonical_key = Composition::from_participants(vec![Participant::structure_entity("2XYZ", "1", 1)])
            .canonical_key()
            .unwrap();
        earlier.canonical_key = Composition::from_participants(vec![Participant::structure_entity("1ABC", "1", 1)])
            .canonical_key()
            .unwrap();

        let resolved = resolve(vec![later, earlier], &catalog, &AnalysisConfig::default()).unwrap();
        assert_eq!(resolved.identity_links.len(), 1);
        assert_eq!(resolved.identity_links[0].structural_id, "PDB-CPX-2");
        assert_eq!(resolved.records.len(), 2);
    }

    #[test]
    fn union_has_unique_keys_and_at_most_one_link_per_record() {
        let catalog = catalog(vec![("CPX-1", vec![("P1", 1)]), ("CPX-2", vec![("P2", 1)])]);
        let records = vec![
            structural(vec![protein("P1", 1)], "1abc"),
            structural(vec![protein("P3", 1)], "2xyz"),
        ];
        let resolved = resolve(records, &catalog, &AnalysisConfig::default()).unwrap();

        let keys: HashSet<&CanonicalKey> = resolved.records.iter().map(|(_, r)| &r.canonical_key).collect();
        assert_eq!(keys.len(), resolved.records.len());
        let linked: HashSet<&str> = resolved
            .identity_links
            .iter()
            .map(|l| l.structural_id.as_str())
            .collect();
        assert_eq!(linked.len(), resolved.identity_links.len());
    }

    #[test]
    fn duplicate_structural_keys_are_a_record_set_error() {
        let records = vec![
            structural(vec![protein("P1", 1)], "1abc"),
            structural(vec![protein("P1", 1)], "2xyz"),
        ];
        let result = resolve(records, &ReferenceCatalog::default(), &AnalysisConfig::default());
        assert!(matches!(result, Err(EngineError::RecordSet { .. })));
    }

    #[test]
    fn catalog_key_of_another_participant_kind_is_not_claimed() {
        let mut source = CatalogSource::default();
        source.complexes.push(CatalogComplexRow {
            complex_id: "CPX-1".to_string(),
            name: "Ambiguous".to_string(),
            descriptor: String::new(),
            taxonomy: None,
        });
        source.components.push(CatalogComponentRow {
            complex_id: "CPX-1".to_string(),
            accession: "RF00005".to_string(),
            stoichiometry: "1".to_string(),
            organism: None,
        });
        let catalog = ReferenceCatalog::load(&source);
        let records = vec![structural(vec![Participant::nucleic_family("RF00005", 1)], "1abc")];
        let resolved = resolve(records, &catalog, &AnalysisConfig::default()).unwrap();

        assert!(resolved.identity_links.is_empty());
        assert_eq!(resolved.structural_count, 1);
        assert_eq!(resolved.reference_only_count, 0);
    }

    #[test]
    fn custom_prefix_is_used_for_all_identifiers() {
        let catalog = catalog(vec![("CPX-1", vec![("P9", 1)])]);
        let config = AnalysisConfig {
            id_prefix: "TEST-".to_string(),
            ..AnalysisConfig::default()
        };
        let resolved = resolve(vec![structural(vec![protein("P1", 1)], "1abc")], &catalog, &config).unwrap();
        let ids: Vec<&str> = resolved.records.iter().map(|(_, r)| r.id.as_str()).collect();
        assert_eq!(ids, vec!["TEST-1", "TEST-2"]);
    }
}
