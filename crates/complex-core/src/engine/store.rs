//! Graph-store port and its snapshot-file implementation.
//!
//! The materializer only talks to a [`GraphStore`]. Every upsert is keyed on the full
//! content of the node or relationship it writes, so repeating an upsert never creates a
//! duplicate. Reference complex anchors survive [`GraphStore::clear_derived`].

use crate::core::io::error::InputError;
use crate::core::models::participant::ParticipantKind;
use crate::core::models::record::IdentityLink;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComplexNode {
    pub id: String,
    pub canonical_key: String,
    pub participants: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceComplexNode {
    pub id: String,
    pub name: String,
    pub descriptor: String,
    pub canonical_key: String,
}

/// A participant taking part in a complex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipationLink {
    pub complex_id: String,
    pub kind: ParticipantKind,
    pub participant_id: String,
    pub stoichiometry: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organism: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssemblyLink {
    pub complex_id: String,
    pub assembly_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubcomplexLink {
    pub super_id: String,
    pub sub_id: String,
}

/// Outbound port to the property-graph datastore.
pub trait GraphStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Removes every derived node and relationship, keeping reference complex anchors.
    fn clear_derived(&mut self) -> Result<(), Self::Error>;

    fn upsert_complexes(&mut self, complexes: &[ComplexNode]) -> Result<(), Self::Error>;

    fn upsert_reference_complexes(
        &mut self,
        complexes: &[ReferenceComplexNode],
    ) -> Result<(), Self::Error>;

    fn upsert_participations(&mut self, links: &[ParticipationLink]) -> Result<(), Self::Error>;

    fn upsert_assembly_links(&mut self, links: &[AssemblyLink]) -> Result<(), Self::Error>;

    fn upsert_identity_links(&mut self, links: &[IdentityLink]) -> Result<(), Self::Error>;

    fn upsert_subcomplex_links(&mut self, links: &[SubcomplexLink]) -> Result<(), Self::Error>;
}

/// Full content of a [`SnapshotGraphStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSnapshot {
    pub complexes: BTreeMap<String, ComplexNode>,
    pub reference_complexes: BTreeMap<String, ReferenceComplexNode>,
    pub participations: BTreeSet<ParticipationLink>,
    pub assembly_links: BTreeSet<AssemblyLink>,
    pub identity_links: BTreeSet<IdentityLink>,
    pub subcomplex_links: BTreeSet<SubcomplexLink>,
}

/// In-memory graph store that can be persisted as a JSON snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotGraphStore {
    snapshot: GraphSnapshot,
    path: Option<PathBuf>,
}

impl SnapshotGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the snapshot at `path`, starting empty if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`InputError`] if the file exists but cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        let snapshot = if path.exists() {
            let file = File::open(path).map_err(|e| InputError::Io {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            serde_json::from_reader(BufReader::new(file)).map_err(|e| InputError::Json {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?
        } else {
            debug!("No snapshot at '{}'; starting empty.", path.display());
            GraphSnapshot::default()
        };
        Ok(Self {
            snapshot,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    /// Removes everything, reference complex anchors included.
    pub fn clear_all(&mut self) {
        self.snapshot = GraphSnapshot::default();
    }

    /// Writes the snapshot to the path it was opened from. A store created with
    /// [`SnapshotGraphStore::new`] has nowhere to persist to and saving is a no-op.
    ///
    /// The file is replaced atomically: the snapshot is written next to it and renamed
    /// over it.
    pub fn save(&self) -> Result<(), InputError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let staging = path.with_extension("partial");
        let io_error = |source: std::io::Error| InputError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        };

        let file = File::create(&staging).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.snapshot).map_err(|e| InputError::Json {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        writer.flush().map_err(io_error)?;
        drop(writer);
        fs::rename(&staging, path).map_err(io_error)?;

        info!("Saved graph snapshot to '{}'.", path.display());
        Ok(())
    }
}

impl GraphStore for SnapshotGraphStore {
    type Error = Infallible;

    fn clear_derived(&mut self) -> Result<(), Self::Error> {
        let reference_complexes = std::mem::take(&mut self.snapshot.reference_complexes);
        self.snapshot = GraphSnapshot {
            reference_complexes,
            ..GraphSnapshot::default()
        };
        Ok(())
    }

    fn upsert_complexes(&mut self, complexes: &[ComplexNode]) -> Result<(), Self::Error> {
        for node in complexes {
            self.snapshot.complexes.insert(node.id.clone(), node.clone());
        }
        Ok(())
    }

    fn upsert_reference_complexes(
        &mut self,
        complexes: &[ReferenceComplexNode],
    ) -> Result<(), Self::Error> {
        for node in complexes {
            self.snapshot
                .reference_complexes
                .insert(node.id.clone(), node.clone());
        }
        Ok(())
    }

    fn upsert_participations(&mut self, links: &[ParticipationLink]) -> Result<(), Self::Error> {
        self.snapshot.participations.extend(links.iter().cloned());
        Ok(())
    }

    fn upsert_assembly_links(&mut self, links: &[AssemblyLink]) -> Result<(), Self::Error> {
        self.snapshot.assembly_links.extend(links.iter().cloned());
        Ok(())
    }

    fn upsert_identity_links(&mut self, links: &[IdentityLink]) -> Result<(), Self::Error> {
        self.snapshot.identity_links.extend(links.iter().cloned());
        Ok(())
    }

    fn upsert_subcomplex_links(&mut self, links: &[SubcomplexLink]) -> Result<(), Self::Error> {
        self.snapshot.subcomplex_links.extend(links.iter().cloned());
        Ok(())
    }
}
