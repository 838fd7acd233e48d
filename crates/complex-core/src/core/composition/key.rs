use crate::core::models::participant::{ENTITY_FALLBACK_PREFIX, Participant, ParticipantKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Separates participant tokens inside a key. No token may contain it.
pub const KEY_DELIMITER: char = ',';

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Participant identifier '{id}' contains the key delimiter '{delimiter}'", delimiter = KEY_DELIMITER)]
    DelimiterInIdentifier { id: String },

    #[error(
        "Organism '{organism}' of participant '{id}' contains the key delimiter '{delimiter}'",
        delimiter = KEY_DELIMITER
    )]
    DelimiterInOrganism { id: String, organism: String },

    #[error("Participant of kind '{kind}' has an empty identifier")]
    EmptyIdentifier { kind: ParticipantKind },

    #[error("Participant '{id}' has stoichiometry 0, expected at least 1")]
    ZeroStoichiometry { id: String },
}

/// Which token encoding a key is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenForm {
    /// Full tokens; structure-entity fallbacks keep their structure and entity qualifier.
    Canonical,
    /// Structure-entity fallbacks reduced to `NA_<stoichiometry>` for identity matching.
    Matching,
}

/// Deterministic, order-independent encoding of a composition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(KEY_DELIMITER).filter(|token| !token.is_empty())
    }

    pub fn token_count(&self) -> usize {
        self.tokens().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate(participant: &Participant) -> Result<(), EncodingError> {
    if participant.id.is_empty() {
        return Err(EncodingError::EmptyIdentifier {
            kind: participant.kind,
        });
    }
    if participant.id.contains(KEY_DELIMITER) {
        return Err(EncodingError::DelimiterInIdentifier {
            id: participant.id.clone(),
        });
    }
    if let Some(organism) = &participant.organism {
        if organism.contains(KEY_DELIMITER) {
            return Err(EncodingError::DelimiterInOrganism {
                id: participant.id.clone(),
                organism: organism.clone(),
            });
        }
    }
    if participant.stoichiometry == 0 {
        return Err(EncodingError::ZeroStoichiometry {
            id: participant.id.clone(),
        });
    }
    Ok(())
}

/// Encodes a single participant.
///
/// Proteins encode as `accession_stoichiometry_organism` (`accession_stoichiometry` when
/// the organism is unknown); every other kind encodes as `id_stoichiometry`. In the
/// [`TokenForm::Matching`] form a structure-entity fallback loses its structure and entity
/// qualifier and becomes `NA_<stoichiometry>`.
///
/// # Errors
///
/// Returns an [`EncodingError`] if the identifier is empty, the identifier or organism
/// contains [`KEY_DELIMITER`], or the stoichiometry is zero.
pub fn encode_participant(participant: &Participant, form: TokenForm) -> Result<String, EncodingError> {
    validate(participant)?;
    let token = match (participant.kind, form) {
        (ParticipantKind::ProteinAccession, _) => match &participant.organism {
            Some(organism) if !organism.is_empty() => format!(
                "{}_{}_{}",
                participant.id, participant.stoichiometry, organism
            ),
            _ => format!("{}_{}", participant.id, participant.stoichiometry),
        },
        (ParticipantKind::StructureEntity, TokenForm::Matching) => {
            format!("{ENTITY_FALLBACK_PREFIX}{}", participant.stoichiometry)
        }
        _ => format!("{}_{}", participant.id, participant.stoichiometry),
    };
    Ok(token)
}

/// Builds the key of a participant multiset.
///
/// Tokens are folded (identical tokens kept once), sorted by byte order and joined
/// with [`KEY_DELIMITER`].
pub fn build_key<'a, I>(participants: I, form: TokenForm) -> Result<CanonicalKey, EncodingError>
where
    I: IntoIterator<Item = &'a Participant>,
{
    let tokens = participants
        .into_iter()
        .map(|participant| encode_participant(participant, form))
        .collect::<Result<BTreeSet<String>, _>>()?;

    let mut key = String::new();
    for token in tokens {
        if !key.is_empty() {
            key.push(KEY_DELIMITER);
        }
        key.push_str(&token);
    }
    Ok(CanonicalKey(key))
}
