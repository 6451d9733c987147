use std::path::Path;

use log::info;

use super::codec::ItemCodec;
use super::ngram_model::build_transitions;
use super::persistence::{self, ArtifactPaths, ModelMetadata};
use super::readable::ReadableModel;
use super::sequence::{build_sequences, RowSet};
use crate::config::{ColumnSelection, TrainConfig};
use crate::error::{Result, SeqError};

/// Result of a training run: the queryable model and where it was saved.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainedModel {
	pub readable: ReadableModel,
	pub metadata: ModelMetadata,
	pub paths: ArtifactPaths,
}

/// Trains a sequential pattern model and saves it under `config.model_dir`.
///
/// # Steps
/// 1. Validate `order` and `min_support`
/// 2. Build ordered sequences per session
/// 3. Build the item codec and encode the sequences
/// 4. Count and prune transitions
/// 5. Save encoded, codec, readable and metadata artifacts
///
/// # Errors
/// - `InvalidConfig` for a zero order or support
/// - `Schema` / `EmptyResult` from sequence building
/// - `EmptyResult` if no transition reaches `min_support`; nothing is written
///   in that case and a previous model stays in place
/// - I/O and encoding errors from persistence
pub fn train_sequential(rows: &RowSet, columns: &ColumnSelection, config: &TrainConfig) -> Result<TrainedModel> {
	config.validate()?;

	let sequences = build_sequences(rows, &columns.session_col, &columns.time_col, &columns.item_col)?;
	let codec = ItemCodec::build(&sequences);
	let encoded = codec.encode_all(&sequences);

	let transitions = build_transitions(&encoded, config.order, config.min_support);
	if transitions.is_empty() {
		return Err(SeqError::EmptyResult(format!(
			"No pattern of order {} reaches min_support {}. Try a lower order or support.",
			config.order, config.min_support
		)));
	}

	let metadata = ModelMetadata {
		order: config.order,
		min_support: config.min_support,
		num_sequences: sequences.len(),
		unique_items: codec.len(),
	};
	let paths = persistence::save(&transitions, &codec, &metadata, &config.model_dir)?;
	let readable = transitions.decode(&codec)?;

	info!("Sequential model trained: {:?}", metadata);
	Ok(TrainedModel { readable, metadata, paths })
}

/// Loads a previously trained model directory in queryable form.
pub fn load_trained<P: AsRef<Path>>(dir: P) -> Result<TrainedModel> {
	let loaded = persistence::load(&dir)?;
	Ok(TrainedModel {
		readable: loaded.readable()?,
		metadata: loaded.metadata,
		paths: ArtifactPaths::in_dir(dir),
	})
}
