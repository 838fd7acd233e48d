use super::error::UpstreamFetchError;
use super::traits::TabularInput;
use crate::core::models::participant::{ParseParticipantKindError, ParticipantKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

const UNRESOLVED: &str = "unresolved";

/// How an entity was resolved by the upstream collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MappedKind {
    Resolved(ParticipantKind),
    /// The collaborator failed for this entity.
    Unresolved,
}

impl FromStr for MappedKind {
    type Err = ParseParticipantKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(UNRESOLVED) {
            Ok(MappedKind::Unresolved)
        } else {
            ParticipantKind::from_str(s).map(MappedKind::Resolved)
        }
    }
}

impl TryFrom<String> for MappedKind {
    type Error = ParseParticipantKindError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MappedKind> for String {
    fn from(kind: MappedKind) -> Self {
        match kind {
            MappedKind::Resolved(kind) => kind.to_string(),
            MappedKind::Unresolved => UNRESOLVED.to_string(),
        }
    }
}

/// One entity of one assembly, as delivered by the upstream collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyParticipation {
    pub structure_id: String,
    pub assembly_id: String,
    pub entity_id: String,
    /// Number of chains of the entity in the assembly.
    pub chain_count: u32,
    pub mapped_kind: MappedKind,
    pub mapped_id: String,
    #[serde(default)]
    pub organism: Option<String>,
    #[serde(default)]
    pub preferred: Option<String>,
}

impl AssemblyParticipation {
    /// Whether the row belongs to a preferred assembly. Absent values count as preferred.
    pub fn is_preferred(&self) -> bool {
        match self.preferred.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(flag) => matches!(
                flag.to_ascii_lowercase().as_str(),
                "true" | "t" | "yes" | "y" | "1"
            ),
        }
    }

    pub fn organism(&self) -> Option<&str> {
        self.organism
            .as_deref()
            .map(str::trim)
            .filter(|organism| !organism.is_empty())
    }
}

impl TabularInput for AssemblyParticipation {
    fn read_from<R: Read>(reader: R) -> Result<Vec<Self>, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        reader.deserialize().collect()
    }
}

/// Every participation row of one structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureParticipation {
    /// Lowercase structure identifier.
    pub structure_id: String,
    pub rows: Vec<AssemblyParticipation>,
}

/// Either a complete participation list for a structure or the reason it is missing.
pub type StructureInput = Result<StructureParticipation, UpstreamFetchError>;

/// Groups rows by structure, preserving the order in which structures first appear.
///
/// A structure containing any `unresolved` row is returned as an [`UpstreamFetchError`]
/// so that no partial composition is ever built from it.
pub fn group_by_structure(rows: Vec<AssemblyParticipation>) -> Vec<StructureInput> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<AssemblyParticipation>> = HashMap::new();

    for row in rows {
        let structure_id = row.structure_id.trim().to_ascii_lowercase();
        groups
            .entry(structure_id.clone())
            .or_insert_with(|| {
                order.push(structure_id);
                Vec::new()
            })
            .push(row);
    }

    order
        .into_iter()
        .map(|structure_id| {
            let rows = groups.remove(&structure_id).unwrap_or_default();
            if let Some(failed) = rows.iter().find(|r| r.mapped_kind == MappedKind::Unresolved) {
                return Err(UpstreamFetchError {
                    reason: format!(
                        "entity {} of assembly {} could not be resolved",
                        failed.entity_id, failed.assembly_id
                    ),
                    structure_id,
                });
            }
            Ok(StructureParticipation { structure_id, rows })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "structure_id,assembly_id,entity_id,chain_count,mapped_kind,mapped_id,organism,preferred\n";

    #[test]
    fn rows_deserialize_with_optional_columns() {
        let data = format!(
            "{HEADER}1ABC,1,1,2,protein,P69905,9606,true\n1ABC,1,2,1,nucleic-family,RF00005,,\n"
        );
        let rows = AssemblyParticipation::read_from(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].mapped_kind,
            MappedKind::Resolved(ParticipantKind::ProteinAccession)
        );
        assert_eq!(rows[0].organism(), Some("9606"));
        assert_eq!(rows[1].organism(), None);
        assert!(rows[1].is_preferred());
    }

    #[test]
    fn header_without_optional_columns_is_accepted() {
        let data = "structure_id,assembly_id,entity_id,chain_count,mapped_kind,mapped_id\n\
                    1abc,1,1,2,structure-entity,\n";
        let rows = AssemblyParticipation::read_from(data.as_bytes()).unwrap();
        assert_eq!(rows[0].organism, None);
        assert!(rows[0].is_preferred());
    }

    #[test]
    fn unknown_mapped_kind_is_a_parse_error() {
        let data = format!("{HEADER}1abc,1,1,2,ligand,X,,\n");
        assert!(AssemblyParticipation::read_from(data.as_bytes()).is_err());
    }

    #[test]
    fn preferred_flag_accepts_common_spellings() {
        let mut row = AssemblyParticipation {
            structure_id: "1abc".to_string(),
            assembly_id: "1".to_string(),
            entity_id: "1".to_string(),
            chain_count: 1,
            mapped_kind: MappedKind::Unresolved,
            mapped_id: String::new(),
            organism: None,
            preferred: Some("True".to_string()),
        };
        assert!(row.is_preferred());
        row.preferred = Some("False".to_string());
        assert!(!row.is_preferred());
        row.preferred = Some("0".to_string());
        assert!(!row.is_preferred());
    }

    #[test]
    fn group_by_structure_preserves_first_appearance_order() {
        let data = format!(
            "{HEADER}2XYZ,1,1,1,protein,P1,9606,\n1abc,1,1,1,protein,P2,9606,\n2xyz,2,1,1,protein,P1,9606,\n"
        );
        let rows = AssemblyParticipation::read_from(data.as_bytes()).unwrap();
        let groups = group_by_structure(rows);
        assert_eq!(groups.len(), 2);
        let first = groups[0].as_ref().unwrap();
        assert_eq!(first.structure_id, "2xyz");
        assert_eq!(first.rows.len(), 2);
        assert_eq!(groups[1].as_ref().unwrap().structure_id, "1abc");
    }

    #[test]
    fn unresolved_entity_fails_the_whole_structure() {
        let data = format!(
            "{HEADER}1abc,1,1,1,protein,P1,9606,\n1abc,1,2,1,unresolved,,,\n2xyz,1,1,1,protein,P1,9606,\n"
        );
        let rows = AssemblyParticipation::read_from(data.as_bytes()).unwrap();
        let groups = group_by_structure(rows);
        let error = groups[0].as_ref().unwrap_err();
        assert_eq!(error.structure_id, "1abc");
        assert!(error.reason.contains("entity 2"));
        assert!(groups[1].is_ok());
    }
}
