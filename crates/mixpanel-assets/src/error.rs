// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

#[derive(Debug, Error)]
pub enum AssetError {
	#[error("asset not found: {0}")]
	NotFound(String),

	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("invalid YAML: {0}")]
	Yaml(#[from] serde_yaml::Error),

	#[error("schema compilation failed: {0}")]
	Schema(String),

	/// The instance does not conform to the schema.
	#[error("validation failed: {}", errors.join("; "))]
	Invalid { errors: Vec<String> },

	#[error("no matching operation: {0}")]
	Route(String),

	#[error("malformed form body: {0}")]
	Form(String),
}
