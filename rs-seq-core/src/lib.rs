//! Sequential pattern mining and next-item recommendation library.
//!
//! This crate provides an order-`k` n-gram transition system including:
//! - Per-session sequence building from timestamped event rows
//! - Integer item encoding (`ItemCodec`)
//! - Transition counting with minimum-support pruning
//! - Persistence of encoded, readable and metadata artifacts
//! - Next-item recommendation from a trained model
//!
//! The training pipeline and query types are the public entry points.
//! File helpers stay internal.

/// Training configuration and column selection.
pub mod config;

/// Error taxonomy shared by every module.
pub mod error;

/// Sequence, codec, transition model, persistence and recommendation logic.
pub mod model;

/// I/O utilities (file loading, staged writes, path helpers).
///
/// Only the row loader and folder normalization are exposed.
pub mod io;

pub use error::{Result, SeqError};
