use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeqError};

/// Default directory where trained artifacts are written.
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Parameters of one training run.
///
/// `order` is the number of preceding items used as context and
/// `min_support` the minimum count a (prefix, next item) pair needs to survive.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrainConfig {
	pub order: usize,
	pub min_support: u64,
	pub model_dir: PathBuf,
}

impl Default for TrainConfig {
	fn default() -> Self {
		Self { order: 1, min_support: 1, model_dir: PathBuf::from(DEFAULT_MODEL_DIR) }
	}
}

impl TrainConfig {
	/// Creates a configuration writing to `model_dir`.
	pub fn new(order: usize, min_support: u64, model_dir: impl Into<PathBuf>) -> Self {
		Self { order, min_support, model_dir: model_dir.into() }
	}

	/// Checks the builder preconditions.
	///
	/// # Errors
	/// Returns `InvalidConfig` if `order` or `min_support` is zero.
	pub fn validate(&self) -> Result<()> {
		if self.order < 1 {
			return Err(SeqError::InvalidConfig("order must be >= 1".to_owned()));
		}
		if self.min_support < 1 {
			return Err(SeqError::InvalidConfig("min_support must be >= 1".to_owned()));
		}
		Ok(())
	}
}

/// Names of the session, timestamp and item columns in a row set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ColumnSelection {
	pub session_col: String,
	pub time_col: String,
	pub item_col: String,
}

impl ColumnSelection {
	pub fn new(session_col: &str, time_col: &str, item_col: &str) -> Self {
		Self {
			session_col: session_col.to_owned(),
			time_col: time_col.to_owned(),
			item_col: item_col.to_owned(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_is_valid() {
		let config = TrainConfig::default();
		assert_eq!(config.order, 1);
		assert_eq!(config.min_support, 1);
		assert_eq!(config.model_dir, PathBuf::from("models"));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn zero_order_or_support_is_rejected() {
		assert!(matches!(TrainConfig::new(0, 1, "m").validate(), Err(SeqError::InvalidConfig(_))));
		assert!(matches!(TrainConfig::new(2, 0, "m").validate(), Err(SeqError::InvalidConfig(_))));
	}

	#[test]
	fn missing_fields_fall_back_to_defaults() {
		let config: TrainConfig = serde_json::from_str(r#"{"order": 3}"#).unwrap();
		assert_eq!(config.order, 3);
		assert_eq!(config.min_support, 1);
	}
}
