use super::error::DataQualityWarning;
use crate::core::composition::Composition;
use crate::core::composition::key::CanonicalKey;
use crate::core::io::catalog::{
    CatalogComplexRow, CatalogComponentRow, CatalogCrossReferenceRow, OrganismRow,
};
use crate::core::models::participant::Participant;
use crate::core::models::record::ReferenceComplexRecord;
use crate::core::utils::identifiers::{normalize_structure_id, strip_assembly_qualifier};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, instrument, warn};

/// Raw rows of the reference catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    pub complexes: Vec<CatalogComplexRow>,
    pub components: Vec<CatalogComponentRow>,
    pub cross_references: Vec<CatalogCrossReferenceRow>,
    /// Accession to taxonomy lookup for component rows without an organism.
    pub organisms: Vec<OrganismRow>,
}

/// The reference catalog, keyed by canonical composition key.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    complexes: BTreeMap<String, ReferenceComplexRecord>,
    key_index: BTreeMap<CanonicalKey, String>,
    linked_structures: BTreeMap<String, BTreeSet<String>>,
    warnings: Vec<DataQualityWarning>,
}

impl ReferenceCatalog {
    /// Builds the catalog from raw rows.
    ///
    /// Problems in the rows never abort loading. Each one is logged and recorded as a
    /// [`DataQualityWarning`], and the affected row or complex is handled as follows:
    ///
    /// - duplicate complex rows: the later row replaces the earlier one
    /// - component rows of unknown complexes, or with a stoichiometry that is not a
    ///   positive integer: the row is dropped
    /// - malformed linked-structure tokens: the token is dropped
    /// - complexes without components or with an unencodable composition: the complex
    ///   is dropped
    /// - components whose organism is neither given, found in the organism lookup nor
    ///   implied by the complex taxonomy: kept without organism, so the complex cannot
    ///   match a structural composition
    /// - complexes sharing a canonical key: the one processed later (complex-row order)
    ///   owns the key, both stay addressable by id
    #[instrument(skip_all, name = "catalog_loader")]
    pub fn load(source: &CatalogSource) -> Self {
        let mut catalog = Self::default();

        let complex_rows = catalog.dedup_complex_rows(&source.complexes);
        let known: HashMap<&str, &CatalogComplexRow> = complex_rows
            .iter()
            .map(|row| (row.complex_id.as_str(), *row))
            .collect();

        let organisms: HashMap<&str, &str> = source
            .organisms
            .iter()
            .map(|row| (row.accession.as_str(), row.organism.as_str()))
            .collect();

        let mut participants = catalog.group_components(&source.components, &known, &organisms);
        catalog.collect_linked_structures(&source.cross_references, &known);

        for row in complex_rows {
            let Some(members) = participants.remove(row.complex_id.as_str()) else {
                catalog.warn(DataQualityWarning::EmptyComposition {
                    complex_id: row.complex_id.clone(),
                });
                continue;
            };
            let composition = Composition::from_participants(members);
            let canonical_key = match composition.canonical_key() {
                Ok(key) => key,
                Err(source) => {
                    catalog.warn(DataQualityWarning::UnencodableComplex {
                        complex_id: row.complex_id.clone(),
                        source,
                    });
                    continue;
                }
            };

            let record = ReferenceComplexRecord {
                id: row.complex_id.clone(),
                name: row.name.clone(),
                descriptor: row.descriptor.clone(),
                canonical_key: canonical_key.clone(),
                composition,
                supporting_structures: catalog
                    .linked_structures
                    .get(&row.complex_id)
                    .cloned()
                    .unwrap_or_default(),
            };

            if let Some(shadowed) = catalog
                .key_index
                .insert(canonical_key.clone(), row.complex_id.clone())
            {
                catalog.warn(DataQualityWarning::DuplicateCanonicalKey {
                    key: canonical_key.to_string(),
                    kept: row.complex_id.clone(),
                    shadowed,
                });
            }
            catalog.complexes.insert(row.complex_id.clone(), record);
        }

        info!(
            "Loaded {} reference complexes ({} distinct keys) with {} data-quality warning(s).",
            catalog.complexes.len(),
            catalog.key_index.len(),
            catalog.warnings.len()
        );
        catalog
    }

    fn warn(&mut self, warning: DataQualityWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn dedup_complex_rows<'r>(&mut self, rows: &'r [CatalogComplexRow]) -> Vec<&'r CatalogComplexRow> {
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut deduped: Vec<&CatalogComplexRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match position.get(row.complex_id.as_str()) {
                Some(&index) => {
                    self.warn(DataQualityWarning::DuplicateComplexRow {
                        complex_id: row.complex_id.clone(),
                    });
                    deduped[index] = row;
                }
                None => {
                    position.insert(row.complex_id.as_str(), deduped.len());
                    deduped.push(row);
                }
            }
        }
        deduped
    }

    fn group_components(
        &mut self,
        rows: &[CatalogComponentRow],
        known: &HashMap<&str, &CatalogComplexRow>,
        organisms: &HashMap<&str, &str>,
    ) -> HashMap<String, Vec<Participant>> {
        let mut grouped: HashMap<String, Vec<Participant>> = HashMap::new();
        for row in rows {
            if !known.contains_key(row.complex_id.as_str()) {
                self.warn(DataQualityWarning::OrphanComponent {
                    complex_id: row.complex_id.clone(),
                    accession: row.accession.clone(),
                });
                continue;
            }
            let stoichiometry = match row.stoichiometry.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    self.warn(DataQualityWarning::InvalidStoichiometry {
                        complex_id: row.complex_id.clone(),
                        accession: row.accession.clone(),
                        value: row.stoichiometry.clone(),
                    });
                    continue;
                }
            };
            let organism = row
                .organism
                .clone()
                .filter(|organism| !organism.is_empty())
                .or_else(|| {
                    organisms
                        .get(row.accession.as_str())
                        .map(|organism| organism.to_string())
                })
                .or_else(|| {
                    known
                        .get(row.complex_id.as_str())
                        .and_then(|complex| complex.taxonomy.clone())
                });
            if organism.is_none() {
                self.warn(DataQualityWarning::MissingOrganism {
                    complex_id: row.complex_id.clone(),
                    accession: row.accession.clone(),
                });
            }
            grouped
                .entry(row.complex_id.clone())
                .or_default()
                .push(Participant::protein(row.accession.clone(), stoichiometry, organism));
        }
        grouped
    }

    fn collect_linked_structures(
        &mut self,
        rows: &[CatalogCrossReferenceRow],
        known: &HashMap<&str, &CatalogComplexRow>,
    ) {
        for row in rows {
            if !known.contains_key(row.complex_id.as_str()) {
                self.warn(DataQualityWarning::OrphanCrossReference {
                    complex_id: row.complex_id.clone(),
                });
                continue;
            }
            for token in row.structures.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                match normalize_structure_id(strip_assembly_qualifier(token)) {
                    Some(structure_id) => {
                        self.linked_structures
                            .entry(row.complex_id.clone())
                            .or_default()
                            .insert(structure_id);
                    }
                    None => self.warn(DataQualityWarning::MalformedStructureToken {
                        complex_id: row.complex_id.clone(),
                        token: token.to_string(),
                    }),
                }
            }
        }
        debug!(
            "Collected linked structures for {} complexes.",
            self.linked_structures.len()
        );
    }

    /// The complex owning `key`, if any.
    pub fn get_by_key(&self, key: &CanonicalKey) -> Option<&ReferenceComplexRecord> {
        self.key_index
            .get(key)
            .and_then(|complex_id| self.complexes.get(complex_id))
    }

    pub fn get(&self, complex_id: &str) -> Option<&ReferenceComplexRecord> {
        self.complexes.get(complex_id)
    }

    /// Canonical keys in sort order, each with the complex that owns it.
    pub fn keyed_records(&self) -> impl Iterator<Item = (&CanonicalKey, &ReferenceComplexRecord)> {
        self.key_index
            .iter()
            .filter_map(|(key, complex_id)| self.complexes.get(complex_id).map(|r| (key, r)))
    }

    /// Every loaded complex, sorted by id.
    pub fn complexes(&self) -> impl Iterator<Item = &ReferenceComplexRecord> {
        self.complexes.values()
    }

    pub fn warnings(&self) -> &[DataQualityWarning] {
        &self.warnings
    }

    /// Number of components loaded without an organism.
    pub fn missing_organism_count(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_missing_organism()).count()
    }

    pub fn key_count(&self) -> usize {
        self.key_index.len()
    }

    pub fn complex_count(&self) -> usize {
        self.complexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.complexes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complex(id: &str, name: &str) -> CatalogComplexRow {
        CatalogComplexRow {
            complex_id: id.to_string(),
            name: name.to_string(),
            descriptor: String::new(),
            taxonomy: None,
        }
    }

    fn component(id: &str, accession: &str, stoichiometry: &str) -> CatalogComponentRow {
        CatalogComponentRow {
            complex_id: id.to_string(),
            accession: accession.to_string(),
            stoichiometry: stoichiometry.to_string(),
            organism: Some("9606".to_string()),
        }
    }

    fn xref(id: &str, structures: &str) -> CatalogCrossReferenceRow {
        CatalogCrossReferenceRow {
            complex_id: id.to_string(),
            structures: structures.to_string(),
        }
    }

    #[test]
    fn load_builds_keys_and_linked_structures() {
        let source = CatalogSource {
            complexes: vec![complex("CPX-1", "Dimer")],
            components: vec![component("CPX-1", "P2", "1"), component("CPX-1", "P1", "2")],
            cross_references: vec![xref("CPX-1", "1ABC_1, 2xyz")],
            organisms: vec![],
        };
        let catalog = ReferenceCatalog::load(&source);

        assert!(catalog.warnings().is_empty());
        let record = catalog.get("CPX-1").unwrap();
        assert_eq!(record.canonical_key.as_str(), "P1_2_9606,P2_1_9606");
        assert_eq!(
            catalog.get_by_key(&record.canonical_key).map(|r| r.id.as_str()),
            Some("CPX-1")
        );
        let structures: Vec<&str> = record.supporting_structures.iter().map(String::as_str).collect();
        assert_eq!(structures, vec!["1abc", "2xyz"]);
    }

    #[test]
    fn organism_lookup_fills_missing_organisms() {
        let mut row = component("CPX-1", "P1", "1");
        row.organism = None;
        let source = CatalogSource {
            complexes: vec![complex("CPX-1", "Monomer")],
            components: vec![row],
            cross_references: vec![],
            organisms: vec![OrganismRow {
                accession: "P1".to_string(),
                organism: "10090".to_string(),
            }],
        };
        let catalog = ReferenceCatalog::load(&source);
        assert_eq!(catalog.get("CPX-1").unwrap().canonical_key.as_str(), "P1_1_10090");
    }

    #[test]
    fn complex_taxonomy_fills_organisms_missing_from_the_lookup() {
        let mut monomer = complex("CPX-1", "Monomer");
        monomer.taxonomy = Some("559292".to_string());
        let mut row = component("CPX-1", "P1", "1");
        row.organism = None;
        let source = CatalogSource {
            complexes: vec![monomer],
            components: vec![row],
            ..CatalogSource::default()
        };
        let catalog = ReferenceCatalog::load(&source);
        assert_eq!(catalog.get("CPX-1").unwrap().canonical_key.as_str(), "P1_1_559292");
        assert_eq!(catalog.missing_organism_count(), 0);
    }

    #[test]
    fn components_without_any_organism_are_flagged() {
        let mut first = component("CPX-1", "P1", "2");
        first.organism = None;
        let source = CatalogSource {
            complexes: vec![complex("CPX-1", "Dimer")],
            components: vec![first, component("CPX-1", "P2", "1")],
            ..CatalogSource::default()
        };
        let catalog = ReferenceCatalog::load(&source);

        assert_eq!(
            catalog.get("CPX-1").unwrap().canonical_key.as_str(),
            "P1_2,P2_1_9606"
        );
        assert_eq!(
            catalog.warnings(),
            &[DataQualityWarning::MissingOrganism {
                complex_id: "CPX-1".to_string(),
                accession: "P1".to_string(),
            }]
        );
        assert_eq!(catalog.missing_organism_count(), 1);
    }

    #[test]
    fn later_complex_wins_a_shared_key() {
        let source = CatalogSource {
            complexes: vec![complex("CPX-1", "First"), complex("CPX-2", "Second")],
            components: vec![component("CPX-1", "P1", "1"), component("CPX-2", "P1", "1")],
            ..CatalogSource::default()
        };
        let catalog = ReferenceCatalog::load(&source);

        let key = catalog.get("CPX-1").unwrap().canonical_key.clone();
        assert_eq!(catalog.get_by_key(&key).unwrap().id, "CPX-2");
        assert_eq!(catalog.complex_count(), 2);
        assert_eq!(catalog.key_count(), 1);
        assert!(matches!(
            catalog.warnings(),
            [DataQualityWarning::DuplicateCanonicalKey { kept, shadowed, .. }]
                if kept == "CPX-2" && shadowed == "CPX-1"
        ));
    }

    #[test]
    fn problems_become_warnings_and_processing_continues() {
        let source = CatalogSource {
            complexes: vec![
                complex("CPX-1", "Good"),
                complex("CPX-2", "Empty"),
                complex("CPX-3", "Bad id"),
                complex("CPX-1", "Good, renamed"),
            ],
            components: vec![
                component("CPX-1", "P1", "1"),
                component("CPX-1", "P9", "two"),
                component("CPX-9", "P1", "1"),
                component("CPX-3", "P1,P2", "1"),
            ],
            cross_references: vec![xref("CPX-1", "1abc,bad-token"), xref("CPX-8", "1abc")],
            organisms: vec![],
        };
        let catalog = ReferenceCatalog::load(&source);

        assert_eq!(catalog.complex_count(), 1);
        assert_eq!(catalog.get("CPX-1").unwrap().name, "Good, renamed");

        let warnings = catalog.warnings();
        assert!(warnings.contains(&DataQualityWarning::DuplicateComplexRow {
            complex_id: "CPX-1".to_string()
        }));
        assert!(warnings.contains(&DataQualityWarning::EmptyComposition {
            complex_id: "CPX-2".to_string()
        }));
        assert!(warnings.contains(&DataQualityWarning::OrphanComponent {
            complex_id: "CPX-9".to_string(),
            accession: "P1".to_string()
        }));
        assert!(warnings.contains(&DataQualityWarning::InvalidStoichiometry {
            complex_id: "CPX-1".to_string(),
            accession: "P9".to_string(),
            value: "two".to_string()
        }));
        assert!(warnings.contains(&DataQualityWarning::MalformedStructureToken {
            complex_id: "CPX-1".to_string(),
            token: "bad-token".to_string()
        }));
        assert!(warnings.contains(&DataQualityWarning::OrphanCrossReference {
            complex_id: "CPX-8".to_string()
        }));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, DataQualityWarning::UnencodableComplex { complex_id, .. } if complex_id == "CPX-3")));
    }

    #[test]
    fn keyed_records_iterate_in_key_order() {
        let source = CatalogSource {
            complexes: vec![complex("CPX-1", "B"), complex("CPX-2", "A")],
            components: vec![component("CPX-1", "Q1", "1"), component("CPX-2", "P1", "1")],
            ..CatalogSource::default()
        };
        let catalog = ReferenceCatalog::load(&source);
        let ids: Vec<&str> = catalog.keyed_records().map(|(_, r)| r.id.as_str()).collect();
        assert_eq!(ids, vec!["CPX-2", "CPX-1"]);
    }
}
