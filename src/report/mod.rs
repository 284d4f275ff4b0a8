//! Report renderers for a finalized [`Report`](crate::models::Report).
//!
//! - [`terminal`]: per-license file lists (`--verbose`) and a colored summary table.
//!
//! JSON output is the serialized report itself and is printed from `main`.

pub mod terminal;
