//! # Workflows Module
//!
//! High-level entry points that run the whole pipeline over one snapshot of the inputs.
//!
//! - **Analysis Workflow** ([`analyze`]) - Loads the catalog and the participation table,
//!   extracts and resolves complexes, builds the subcomplex lattice, and materializes the
//!   results into a graph store and a report.

pub mod analyze;
