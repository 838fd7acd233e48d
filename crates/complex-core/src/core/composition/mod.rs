//! Compositions and their canonical keys.
//!
//! A [`Composition`] is the unordered multiset of participants that forms one complex.
//! Two compositions describe the same complex exactly when their canonical keys are
//! byte-identical, regardless of the order in which the participants were discovered.

pub mod key;

use crate::core::models::participant::{Participant, ParticipantKind};
use key::{CanonicalKey, EncodingError, KEY_DELIMITER, TokenForm, build_key, encode_participant};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `(kind, id, stoichiometry)`: the unit compared when testing containment.
pub type ContainmentPair<'a> = (ParticipantKind, &'a str, u32);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Composition {
    participants: Vec<Participant>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_participants(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    pub fn push(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Canonical key used for deduplication and as the record's stored key.
    pub fn canonical_key(&self) -> Result<CanonicalKey, EncodingError> {
        build_key(&self.participants, TokenForm::Canonical)
    }

    /// Key compared against the reference catalog. Identical to the canonical key unless
    /// the composition contains structure-entity fallbacks.
    pub fn matching_key(&self) -> Result<CanonicalKey, EncodingError> {
        build_key(&self.participants, TokenForm::Matching)
    }

    /// Whether every token of this composition in `form` is carried by a participant of
    /// the same kind in `other`, and the other way round.
    ///
    /// Keys do not encode the participant kind, so equal keys can still describe
    /// different participants (a protein without organism and a nucleic family sharing
    /// an identifier, for example).
    pub fn has_kinds_of(&self, other: &Composition, form: TokenForm) -> bool {
        let typed = |composition: &Composition| {
            composition
                .participants
                .iter()
                .map(|p| encode_participant(p, form).map(|token| (token, p.kind)))
                .collect::<Result<BTreeSet<_>, _>>()
        };
        matches!((typed(self), typed(other)), (Ok(a), Ok(b)) if a == b)
    }

    /// Distinct `(kind, id, stoichiometry)` pairs of this composition.
    pub fn containment_pairs(&self) -> BTreeSet<ContainmentPair<'_>> {
        self.participants
            .iter()
            .map(|p| (p.kind, p.id.as_str(), p.stoichiometry))
            .collect()
    }

    /// Sorted, deduplicated `id_stoichiometry` tokens joined with the key delimiter.
    pub fn report_participants(&self) -> String {
        let tokens: BTreeSet<String> = self
            .participants
            .iter()
            .map(Participant::report_token)
            .collect();
        tokens
            .into_iter()
            .collect::<Vec<_>>()
            .join(&KEY_DELIMITER.to_string())
    }
}

impl FromIterator<Participant> for Composition {
    fn from_iter<T: IntoIterator<Item = Participant>>(iter: T) -> Self {
        Self::from_participants(iter.into_iter().collect())
    }
}
