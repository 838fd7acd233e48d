//! # Core Models Module
//!
//! Data structures describing the participants of a complex and the records the
//! pipeline produces for each distinct composition.
//!
//! ## Key Components
//!
//! - [`participant`] - A single participant (protein, nucleic acid family, unmapped polymer
//!   class or structure-local entity) together with its stoichiometry
//! - [`record`] - Structural and reference complex records, identity links, subcomplex
//!   edges and the finalized [`record::ComplexRecordSet`] arena
//! - [`ids`] - Opaque keys for records stored in the arena
//!
//! ## Usage
//!
//! ```ignore
//! use pdbcomplex::core::models::participant::Participant;
//! use pdbcomplex::core::composition::Composition;
//!
//! let composition = Composition::from_participants(vec![
//!     Participant::protein("P69905", 2, Some("9606".to_string())),
//!     Participant::protein("P68871", 2, Some("9606".to_string())),
//! ]);
//! let key = composition.canonical_key()?;
//! assert_eq!(key.as_str(), "P68871_2_9606,P69905_2_9606");
//! ```

pub mod ids;
pub mod participant;
pub mod record;
