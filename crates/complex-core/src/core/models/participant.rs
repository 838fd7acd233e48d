use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix carried by structure-local fallback identifiers (`NA_<structure>_<entity>`).
pub const ENTITY_FALLBACK_PREFIX: &str = "NA_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantKind {
    ProteinAccession, // Sequence database accession, qualified by organism
    NucleicFamily,    // Nucleic acid family accession
    UnmappedPolymer,  // Polymer class without any mapping (e.g. "RNA:UNMAPPED")
    StructureEntity,  // Structure-local fallback for an unmapped polypeptide entity
}

impl ParticipantKind {
    /// Node label used for this participant kind in the graph datastore.
    pub fn node_label(&self) -> &'static str {
        match self {
            ParticipantKind::ProteinAccession => "UniProt",
            ParticipantKind::NucleicFamily => "RfamFamily",
            ParticipantKind::UnmappedPolymer => "UnmappedPolymer",
            ParticipantKind::StructureEntity => "Entity",
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid participant kind string: '{0}'")]
pub struct ParseParticipantKindError(String);

impl FromStr for ParticipantKind {
    type Err = ParseParticipantKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "protein" | "protein-accession" | "uniprot" => Ok(ParticipantKind::ProteinAccession),
            "nucleic-family" | "rfam" => Ok(ParticipantKind::NucleicFamily),
            "unmapped-polymer" | "unmapped" => Ok(ParticipantKind::UnmappedPolymer),
            "structure-entity" | "entity" => Ok(ParticipantKind::StructureEntity),
            _ => Err(ParseParticipantKindError(s.to_string())),
        }
    }
}

impl fmt::Display for ParticipantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ParticipantKind::ProteinAccession => "protein",
                ParticipantKind::NucleicFamily => "nucleic-family",
                ParticipantKind::UnmappedPolymer => "unmapped-polymer",
                ParticipantKind::StructureEntity => "structure-entity",
            }
        )
    }
}

/// One participant of a complex.
///
/// Identity is `(kind, id)`. The stoichiometry describes how the participant takes part
/// in one particular complex and the organism only qualifies protein accessions, so
/// neither is part of the participant's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub kind: ParticipantKind,
    pub id: String,
    pub stoichiometry: u32,
    pub organism: Option<String>, // Taxonomy identifier, proteins only
}

impl Participant {
    pub fn protein(accession: impl Into<String>, stoichiometry: u32, organism: Option<String>) -> Self {
        Self {
            kind: ParticipantKind::ProteinAccession,
            id: accession.into(),
            stoichiometry,
            organism,
        }
    }

    pub fn nucleic_family(accession: impl Into<String>, stoichiometry: u32) -> Self {
        Self {
            kind: ParticipantKind::NucleicFamily,
            id: accession.into(),
            stoichiometry,
            organism: None,
        }
    }

    pub fn unmapped_polymer(class_label: impl Into<String>, stoichiometry: u32) -> Self {
        Self {
            kind: ParticipantKind::UnmappedPolymer,
            id: class_label.into(),
            stoichiometry,
            organism: None,
        }
    }

    /// Builds the structure-local fallback participant `NA_<structure>_<entity>`.
    pub fn structure_entity(structure_id: &str, entity_id: &str, stoichiometry: u32) -> Self {
        Self {
            kind: ParticipantKind::StructureEntity,
            id: format!("{ENTITY_FALLBACK_PREFIX}{structure_id}_{entity_id}"),
            stoichiometry,
            organism: None,
        }
    }

    pub fn identity(&self) -> (ParticipantKind, &str) {
        (self.kind, self.id.as_str())
    }

    /// `id_stoichiometry`, the form used in the subcomplex report.
    pub fn report_token(&self) -> String {
        format!("{}_{}", self.id, self.stoichiometry)
    }

    /// Structure identifier embedded in a structure-entity fallback id.
    pub fn fallback_structure(&self) -> Option<&str> {
        if self.kind != ParticipantKind::StructureEntity {
            return None;
        }
        self.id
            .strip_prefix(ENTITY_FALLBACK_PREFIX)
            .and_then(|rest| rest.split('_').next())
            .filter(|structure| !structure.is_empty())
    }
}
