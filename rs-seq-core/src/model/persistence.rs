use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use super::codec::{CodecRecord, ItemCodec};
use super::ngram_model::TransitionModel;
use super::readable::ReadableModel;
use crate::error::{Result, SeqError};
use crate::io::write_all_staged;

/// Encoded transition table (postcard).
pub const MODEL_FILE: &str = "sequential_model.bin";
/// Item codec, both directions (postcard).
pub const MAPPING_FILE: &str = "item_mapping.bin";
/// Transition table keyed by item names (pretty JSON).
pub const READABLE_FILE: &str = "sequential_model_readable.json";
/// Training metadata (pretty JSON).
pub const META_FILE: &str = "sequential_model_meta.json";

/// Configuration and size of a trained model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ModelMetadata {
	pub order: usize,
	pub min_support: u64,
	pub num_sequences: usize,
	pub unique_items: usize,
}

/// Locations of the four artifacts of a model directory.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ArtifactPaths {
	pub model: PathBuf,
	pub mapping: PathBuf,
	pub readable: PathBuf,
	pub metadata: PathBuf,
}

impl ArtifactPaths {
	pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
		let dir = dir.as_ref();
		Self {
			model: dir.join(MODEL_FILE),
			mapping: dir.join(MAPPING_FILE),
			readable: dir.join(READABLE_FILE),
			metadata: dir.join(META_FILE),
		}
	}
}

/// A model read back from disk. Every load yields an independent copy.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedModel {
	pub transitions: TransitionModel,
	pub codec: ItemCodec,
	pub metadata: ModelMetadata,
}

impl LoadedModel {
	/// Decodes the transitions into the readable form used for queries.
	pub fn readable(&self) -> Result<ReadableModel> {
		self.transitions.decode(&self.codec)
	}
}

/// Writes the four artifacts of a model into `dir`.
///
/// # Behavior
/// - Creates `dir` if needed.
/// - Serializes everything in memory first, so encoding failures write nothing.
/// - Stages each file next to its target and renames them only once all
///   were written (see `io::write_all_staged`).
///
/// # Errors
/// Returns an error if encoding, decoding through the codec or any write fails.
pub fn save<P: AsRef<Path>>(
	transitions: &TransitionModel,
	codec: &ItemCodec,
	metadata: &ModelMetadata,
	dir: P,
) -> Result<ArtifactPaths> {
	let dir = dir.as_ref();
	fs::create_dir_all(dir)?;
	let paths = ArtifactPaths::in_dir(dir);

	let readable = transitions.decode(codec)?;
	let files = vec![
		(paths.model.clone(), postcard::to_stdvec(transitions)?),
		(paths.mapping.clone(), postcard::to_stdvec(&codec.to_record())?),
		(paths.readable.clone(), serde_json::to_vec_pretty(&readable)?),
		(paths.metadata.clone(), serde_json::to_vec_pretty(metadata)?),
	];
	write_all_staged(&files)?;

	info!(
		"Saved model to {} ({} prefixes, {} items)",
		dir.display(),
		transitions.len(),
		codec.len()
	);
	Ok(paths)
}

/// Reads a model directory written by [`save`].
///
/// The readable table is not parsed: it is rebuilt from the encoded table
/// and the codec with [`LoadedModel::readable`].
///
/// # Errors
/// - `NotFound` if an artifact is missing.
/// - `CorruptModel` if the metadata order disagrees with the transitions.
pub fn load<P: AsRef<Path>>(dir: P) -> Result<LoadedModel> {
	let paths = ArtifactPaths::in_dir(&dir);

	let transitions = load_transitions(&paths.model)?;
	let record: CodecRecord = postcard::from_bytes(&read_artifact(&paths.mapping)?)?;
	let codec = ItemCodec::from_record(record)?;
	let metadata = load_metadata(&dir)?;

	if metadata.order != transitions.order() {
		return Err(SeqError::CorruptModel(format!(
			"Metadata order {} does not match transition order {}",
			metadata.order,
			transitions.order()
		)));
	}

	info!("Loaded model from {}", dir.as_ref().display());
	Ok(LoadedModel { transitions, codec, metadata })
}

/// Reads only the encoded transition table.
pub fn load_transitions<P: AsRef<Path>>(path: P) -> Result<TransitionModel> {
	Ok(postcard::from_bytes(&read_artifact(path)?)?)
}

/// Reads only the metadata record of a model directory.
///
/// Used to recover the trained order before querying.
pub fn load_metadata<P: AsRef<Path>>(dir: P) -> Result<ModelMetadata> {
	let path = dir.as_ref().join(META_FILE);
	Ok(serde_json::from_slice(&read_artifact(path)?)?)
}

fn read_artifact<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
	let path = path.as_ref();
	if !path.exists() {
		return Err(SeqError::NotFound { path: path.to_path_buf() });
	}
	Ok(fs::read(path)?)
}
