//! Tabular boundary formats.
//!
//! Readers for the reference catalog dumps and the per-assembly participation table,
//! and the writer for the subcomplex report. Every reader implements
//! [`traits::TabularInput`] so that loading from a path reports the offending file.

pub mod catalog;
pub mod error;
pub mod participation;
pub mod report;
pub mod traits;
