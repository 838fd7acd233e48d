//! # Core Module
//!
//! Fundamental building blocks shared by every pipeline stage.
//!
//! - **Data Models** ([`models`]) - Participants, complex records, the finalized record arena
//! - **Composition Keys** ([`composition`]) - Compositions and their canonical, order-independent keys
//! - **File I/O** ([`io`]) - Catalog dumps, participation tables and the subcomplex report
//! - **Utilities** ([`utils`]) - Structure identifier and polymer type normalization
//!
//! Nothing in this module performs network access or holds run-wide mutable state;
//! all accumulation happens in explicit values owned by the `engine` stages.

pub mod composition;
pub mod io;
pub mod models;
pub mod utils;
