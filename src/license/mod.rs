//! License detection engine.
//!
//! - [`normalize`]: text canonicalization shared by the corpus and file contents.
//! - [`corpus`]: loads canonical license texts into literal or pattern matchers.
//! - [`sidecar`]: SPDX documents inherited from ancestor directories.
//! - [`detector`]: per-file entry point combining tags, corpus and sidecars.

pub mod corpus;
pub mod detector;
pub mod normalize;
pub mod sidecar;
