//! Core abstractions for Notelens: the note table schema, the dataset
//! loading contract, and the aggregations behind every chart.
//! This crate is intentionally small to keep dependency surface minimal.

pub mod model;
pub mod source;
pub mod stats;
