//! # PDBe Complex Core Library
//!
//! Consolidates macromolecular complexes observed in deposited structures with a
//! manually curated reference complex catalog, then derives which observed
//! complexes are identical to a reference complex and which complexes are
//! subcomplexes of larger ones.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Participant`, `Composition`,
//!   complex records), the canonical composition key builder, identifier utilities and
//!   the tabular I/O adapters for catalog dumps, participation tables and reports.
//!
//! - **[`engine`]: The Logic Core.** The pipeline stages: reference catalog loading,
//!   structural complex extraction, identity resolution, the indexed subcomplex
//!   lattice and the output materializer with its graph-store port.
//!
//! - **[`workflows`]: The Public API.** Ties the `engine` and `core` together into a
//!   complete analysis run over one snapshot of the inputs.

pub mod core;
pub mod engine;
pub mod workflows;
