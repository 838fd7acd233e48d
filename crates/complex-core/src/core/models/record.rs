use super::ids::RecordId;
use crate::core::composition::Composition;
use crate::core::composition::key::CanonicalKey;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// A distinct composition observed in one or more structure assemblies.
#[derive(Debug, Clone)]
pub struct StructuralComplexRecord {
    pub canonical_key: CanonicalKey,
    pub matching_key: CanonicalKey,
    pub composition: Composition,
    /// Lowercase structure identifiers in which the composition was observed.
    pub supporting_structures: BTreeSet<String>,
    /// `<structure>_<assembly>` identifiers in which the composition was observed.
    pub supporting_assemblies: BTreeSet<String>,
}

impl StructuralComplexRecord {
    pub fn new(canonical_key: CanonicalKey, matching_key: CanonicalKey, composition: Composition) -> Self {
        Self {
            canonical_key,
            matching_key,
            composition,
            supporting_structures: BTreeSet::new(),
            supporting_assemblies: BTreeSet::new(),
        }
    }

    pub fn add_support(&mut self, structure_id: &str, assembly_uid: String) {
        self.supporting_structures.insert(structure_id.to_string());
        self.supporting_assemblies.insert(assembly_uid);
    }
}

/// A curated complex from the reference catalog.
#[derive(Debug, Clone)]
pub struct ReferenceComplexRecord {
    pub id: String,
    pub name: String,
    pub descriptor: String,
    pub canonical_key: CanonicalKey,
    pub composition: Composition,
    /// Structures the catalog links to this complex.
    pub supporting_structures: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOrigin {
    /// Observed in structures; `reference_id` is set when an identity link exists.
    Structural { reference_id: Option<String> },
    /// Only known from the reference catalog.
    Reference { reference_id: String },
}

impl RecordOrigin {
    pub fn reference_id(&self) -> Option<&str> {
        match self {
            RecordOrigin::Structural { reference_id } => reference_id.as_deref(),
            RecordOrigin::Reference { reference_id } => Some(reference_id),
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(self, RecordOrigin::Structural { .. })
    }
}

/// A finalized complex with its run-wide identifier.
#[derive(Debug, Clone)]
pub struct ComplexRecord {
    pub id: String,
    /// Position in the finalized record set, assigned on insertion.
    pub ordinal: usize,
    pub origin: RecordOrigin,
    pub canonical_key: CanonicalKey,
    pub composition: Composition,
    pub supporting_structures: BTreeSet<String>,
    pub supporting_assemblies: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IdentityLink {
    pub structural_id: String,
    pub reference_id: String,
}

/// `sub`'s composition is strictly contained in `super`'s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubcomplexEdge {
    pub super_id: RecordId,
    pub sub_id: RecordId,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordSetError {
    #[error("Complex identifier '{0}' was assigned twice")]
    DuplicateId(String),
    #[error("Canonical key '{key}' is held by both '{existing}' and '{incoming}'")]
    DuplicateKey {
        key: String,
        existing: String,
        incoming: String,
    },
}

/// Arena of finalized complex records.
///
/// Records are addressed by [`RecordId`] and iterate in insertion order. Both the string
/// identifier and the canonical key of every record are unique within the set.
#[derive(Debug, Clone, Default)]
pub struct ComplexRecordSet {
    records: SlotMap<RecordId, ComplexRecord>,
    order: Vec<RecordId>,
    id_map: HashMap<String, RecordId>,
    key_map: HashMap<CanonicalKey, RecordId>,
}

impl ComplexRecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, overwriting its `ordinal` with its insertion position.
    ///
    /// # Errors
    ///
    /// Returns [`RecordSetError`] if the identifier or the canonical key is already present.
    pub fn insert(&mut self, mut record: ComplexRecord) -> Result<RecordId, RecordSetError> {
        if self.id_map.contains_key(&record.id) {
            return Err(RecordSetError::DuplicateId(record.id));
        }
        if let Some(&existing) = self.key_map.get(&record.canonical_key) {
            return Err(RecordSetError::DuplicateKey {
                key: record.canonical_key.to_string(),
                existing: self.records[existing].id.clone(),
                incoming: record.id,
            });
        }

        record.ordinal = self.order.len();
        let id_string = record.id.clone();
        let key = record.canonical_key.clone();
        let record_id = self.records.insert(record);
        self.order.push(record_id);
        self.id_map.insert(id_string, record_id);
        self.key_map.insert(key, record_id);
        Ok(record_id)
    }

    pub fn get(&self, id: RecordId) -> Option<&ComplexRecord> {
        self.records.get(id)
    }

    pub fn by_id(&self, id: &str) -> Option<(RecordId, &ComplexRecord)> {
        self.id_map.get(id).map(|&rid| (rid, &self.records[rid]))
    }

    pub fn by_key(&self, key: &CanonicalKey) -> Option<(RecordId, &ComplexRecord)> {
        self.key_map.get(key).map(|&rid| (rid, &self.records[rid]))
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &ComplexRecord)> {
        self.order.iter().map(move |&rid| (rid, &self.records[rid]))
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
