#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Configuration for the voxtask workspace: vocabularies, confidence
//! threshold, storage paths, and audio limits. Loaded from
//! `~/voxtask/config.json`; updates between calls are full replacements,
//! never in-place edits.

mod schema;

pub use schema::{AudioConfig, Config, InterpreterConfig, StorageConfig};
