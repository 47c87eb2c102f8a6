// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the ingestion client.

use mixpanel_ingestion_core::FormError;
use thiserror::Error;

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;

/// Errors returned by the ingestion client.
#[derive(Debug, Error)]
pub enum IngestionError {
	/// Rejected before any request was sent.
	#[error("invalid argument: {0}")]
	InvalidArgument(String),

	/// The response had an unexpected status, content type or body shape.
	#[error("invalid response content: {0}")]
	InvalidResponseContent(String),

	/// The response was well formed but reported a failure.
	#[error("invalid response data: {0}")]
	InvalidResponseData(String),

	/// The service rejected the request with an explanation.
	#[error("request failed (status {status}): {message}")]
	RequestFailed {
		/// HTTP status code.
		status: u16,
		/// Error message from the service.
		message: String,
	},

	/// The service rejected the request without an explanation.
	#[error("unknown error (status {status})")]
	Unknown {
		/// HTTP status code.
		status: u16,
	},

	/// The request could not be sent or the response could not be read.
	#[error("HTTP transport error: {0}")]
	Transport(#[from] reqwest::Error),
}

/// Coarse classification of [`IngestionError`] for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	InvalidArgument,
	InvalidResponseContent,
	InvalidResponseData,
	RequestFailed,
	Unknown,
	Transport,
}

impl IngestionError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			IngestionError::InvalidArgument(_) => ErrorKind::InvalidArgument,
			IngestionError::InvalidResponseContent(_) => ErrorKind::InvalidResponseContent,
			IngestionError::InvalidResponseData(_) => ErrorKind::InvalidResponseData,
			IngestionError::RequestFailed { .. } => ErrorKind::RequestFailed,
			IngestionError::Unknown { .. } => ErrorKind::Unknown,
			IngestionError::Transport(_) => ErrorKind::Transport,
		}
	}

	/// HTTP status carried by the error, if the service answered.
	pub fn status(&self) -> Option<u16> {
		match self {
			IngestionError::RequestFailed { status, .. } | IngestionError::Unknown { status } => {
				Some(*status)
			}
			IngestionError::Transport(e) => e.status().map(|s| s.as_u16()),
			_ => None,
		}
	}
}

impl From<FormError> for IngestionError {
	fn from(err: FormError) -> Self {
		IngestionError::InvalidArgument(err.to_string())
	}
}
