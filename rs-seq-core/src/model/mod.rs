//! Top-level module for the sequential pattern system.
//!
//! - Sequence building from event rows (`sequence`)
//! - Item encoding (`ItemCodec`)
//! - Fixed-order transition model and its states (`TransitionModel`, `State`)
//! - Readable model, persistence and recommendation
//! - A uniform entry point over the supported model kinds (`ModelKind`)

/// Event rows and per-session ordered sequences.
pub mod sequence;

/// Raw item ↔ integer id mapping.
pub mod codec;

/// Fixed-order transition model (prefix → next item counts).
///
/// Handles sequence ingestion, support pruning, parallel counting
/// and model merging.
pub mod ngram_model;

/// Transition counts of a single prefix.
pub mod state;

/// Transition table keyed by raw item names.
pub mod readable;

/// Saving and loading the model artifacts.
pub mod persistence;

/// Recommendation request parameters.
pub mod query;

/// Next-item lookup and ranking.
pub mod recommender;

/// End-to-end training from rows to saved artifacts.
pub mod pipeline;

/// Model kinds behind a single query interface.
pub mod kind;
