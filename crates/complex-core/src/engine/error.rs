use thiserror::Error;

use crate::core::composition::key::EncodingError;
use crate::core::io::error::{InputError, UpstreamFetchError};
use crate::core::models::record::RecordSetError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Input error: {source}")]
    Input {
        #[from]
        source: InputError,
    },

    #[error("Record set violation: {source}")]
    RecordSet {
        #[from]
        source: RecordSetError,
    },

    #[error("Graph store operation '{operation}' failed: {source}")]
    Persistence {
        operation: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// A problem in the reference catalog that does not stop the run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataQualityWarning {
    #[error(
        "Complexes '{kept}' and '{shadowed}' share canonical key '{key}'; '{kept}' wins the key"
    )]
    DuplicateCanonicalKey {
        key: String,
        kept: String,
        shadowed: String,
    },

    #[error("Complex '{complex_id}' links malformed structure token '{token}'")]
    MalformedStructureToken { complex_id: String, token: String },

    #[error("Component '{accession}' references unknown complex '{complex_id}'")]
    OrphanComponent {
        complex_id: String,
        accession: String,
    },

    #[error("Cross-reference references unknown complex '{complex_id}'")]
    OrphanCrossReference { complex_id: String },

    #[error("Complex '{complex_id}' has no components")]
    EmptyComposition { complex_id: String },

    #[error("Complex '{complex_id}' cannot be encoded: {source}")]
    UnencodableComplex {
        complex_id: String,
        source: EncodingError,
    },

    #[error("Component '{accession}' of complex '{complex_id}' has invalid stoichiometry '{value}'")]
    InvalidStoichiometry {
        complex_id: String,
        accession: String,
        value: String,
    },

    #[error("Complex '{complex_id}' is listed more than once; the later row wins")]
    DuplicateComplexRow { complex_id: String },

    #[error("No organism known for component '{accession}' of complex '{complex_id}'")]
    MissingOrganism {
        complex_id: String,
        accession: String,
    },
}

impl DataQualityWarning {
    pub fn is_missing_organism(&self) -> bool {
        matches!(self, DataQualityWarning::MissingOrganism { .. })
    }
}

/// Why a structure contributed no records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error(transparent)]
    Upstream(#[from] UpstreamFetchError),

    #[error("Assembly '{assembly_id}' of structure '{structure_id}' cannot be encoded: {source}")]
    Encoding {
        structure_id: String,
        assembly_id: String,
        source: EncodingError,
    },

    #[error("Entity '{entity_id}' of structure '{structure_id}' has unrecognized polymer type '{polymer_type}'")]
    UnknownPolymerType {
        structure_id: String,
        entity_id: String,
        polymer_type: String,
    },

    #[error("Protein entity '{entity_id}' of structure '{structure_id}' ('{accession}') has no organism")]
    MissingOrganism {
        structure_id: String,
        entity_id: String,
        accession: String,
    },
}

impl ExtractionFailure {
    pub fn structure_id(&self) -> &str {
        match self {
            ExtractionFailure::Upstream(error) => &error.structure_id,
            ExtractionFailure::Encoding { structure_id, .. }
            | ExtractionFailure::UnknownPolymerType { structure_id, .. }
            | ExtractionFailure::MissingOrganism { structure_id, .. } => structure_id,
        }
    }
}
