use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the sequence-modeling core.
///
/// "No result" outcomes of a recommendation lookup are not errors; they are
/// returned as [`crate::model::recommender::Recommendation`] values.
#[derive(Error, Debug)]
pub enum SeqError {
	/// A required column is missing from the input rows.
	#[error("Missing column(s): {}", .0.join(", "))]
	Schema(Vec<String>),

	/// Nothing could be derived from the input (no sequences, no patterns).
	#[error("No result: {0}")]
	EmptyResult(String),

	/// A model artifact is absent on load.
	#[error("Model artifact not found at {}. Train the model first.", .path.display())]
	NotFound { path: PathBuf },

	/// Rejected configuration or query parameter.
	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	/// Two transition models of different orders were combined.
	#[error("Order mismatch: {left} vs {right}")]
	OrderMismatch { left: usize, right: usize },

	/// Two states for different prefixes were combined.
	#[error("Prefix mismatch while merging states")]
	KeyMismatch,

	/// The query does not fit the kind of model it was sent to.
	#[error("Unsupported query for {model} model: {query}")]
	UnsupportedQuery { model: &'static str, query: &'static str },

	/// A persisted artifact decoded but its content is inconsistent.
	#[error("Corrupt model artifact: {0}")]
	CorruptModel(String),

	/// External collaborator failure (e.g. a sentiment classifier).
	#[error("External model error: {0}")]
	External(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error("Binary encoding error: {0}")]
	Encoding(#[from] postcard::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Common result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SeqError>;
