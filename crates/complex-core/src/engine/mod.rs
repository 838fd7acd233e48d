//! # Engine Module
//!
//! The pipeline stages that turn catalog rows and per-assembly participation into a
//! finalized complex record set, its identity links and its subcomplex relation.
//!
//! ## Architecture
//!
//! - **Reference Catalog Loader** ([`catalog`]) - Canonical keys for curated complexes,
//!   linked structures and data-quality warnings
//! - **Structural Complex Extractor** ([`extractor`]) - One composition per assembly,
//!   deduplicated by canonical key with per-structure rollback
//! - **Identity Resolver** ([`identity`]) - Catalog matching and identifier assignment
//! - **Subcomplex Lattice Builder** ([`lattice`]) - Indexed strict-containment relation
//! - **Output Materializer** ([`materializer`]) - Graph-store upserts and report rows
//! - **Graph Store** ([`store`]) - The outbound port and its JSON snapshot implementation
//! - **Configuration** ([`config`]), **Progress** ([`progress`]) and **Errors** ([`error`])
//!
//! Stages hand explicit values to each other; none of them keeps state between calls.

pub mod catalog;
pub mod config;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod lattice;
pub mod materializer;
pub mod progress;
pub mod store;
