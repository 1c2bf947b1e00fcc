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

//! Rule-based interpretation of transcribed voice commands.
//!
//! The interpreter turns raw transcribed text plus known vocabularies
//! (users, categories) into a structured, confidence-scored task
//! extraction. It tolerates transcription noise through fuzzy entity
//! resolution and keyword variant lists, and it never fails outward:
//! every failure is converted into data on the returned result.

pub mod deadline;
pub mod interpreter;
pub mod resolver;
mod similarity;
pub mod tokenize;

pub use deadline::{DateParser, DeadlineResolver, NaturalDateParser};
pub use interpreter::{ExtractionResult, Interpreter, KeywordClass};
pub use resolver::{
    ASSIGNEE_FALLBACK, CATEGORY_FALLBACK, EntityResolver, LOW_CONFIDENCE_THRESHOLD, Resolution,
    SimilarityEntry, SimilarityMatrix,
};
pub use similarity::similarity_ratio;
pub use tokenize::{RuleTokenizer, Token, Tokenizer};
