// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Interpretation of ingestion API responses.
//!
//! | Status | Content type | Body | Outcome |
//! |--------|--------------|------|---------|
//! | 200 | `text/plain` | `1` / `0` | success / [`InvalidResponseData`] |
//! | 200 | `application/json` | `{"status": 1\|0, "error": ...}` | success / [`InvalidResponseData`] |
//! | 401, 403 | `application/json` | `{"status": "error", "error": ...}` | [`RequestFailed`] |
//! | other | any | any | [`InvalidResponseContent`] |
//!
//! [`InvalidResponseData`]: IngestionError::InvalidResponseData
//! [`InvalidResponseContent`]: IngestionError::InvalidResponseContent
//! [`RequestFailed`]: IngestionError::RequestFailed

use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::error::{IngestionError, Result};

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

/// Verbose answer to an accepted request.
#[derive(Debug, Deserialize)]
struct VerboseStatus {
	#[serde(default)]
	status: Option<i64>,
	#[serde(default)]
	error: Option<String>,
}

/// Answer to an unauthorized or forbidden request.
#[derive(Debug, Deserialize)]
struct ErrorStatus {
	#[serde(default)]
	status: Option<String>,
	#[serde(default)]
	error: Option<String>,
}

/// Reads the response body and classifies it.
pub async fn parse_response(response: Response) -> Result<()> {
	let status = response.status();
	let content_type = response
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|v| v.to_str().ok())
		.unwrap_or_default()
		.to_string();
	let body = response.bytes().await?;
	classify(status, &content_type, &body)
}

/// Classifies a response without touching the network.
pub fn classify(status: StatusCode, content_type: &str, body: &[u8]) -> Result<()> {
	debug!(
		status = status.as_u16(),
		content_type = %content_type,
		body_len = body.len(),
		"classifying ingestion response"
	);

	match status {
		StatusCode::OK if content_type.contains(TEXT_PLAIN) => parse_plain_text(body),
		StatusCode::OK if content_type.contains(APPLICATION_JSON) => parse_verbose(body),
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
			if content_type.contains(APPLICATION_JSON) =>
		{
			parse_error(status, body)
		}
		_ => Err(IngestionError::InvalidResponseContent(format!(
			"{} {}, {content_type}",
			status.as_u16(),
			status.canonical_reason().unwrap_or("unknown status")
		))),
	}
}

fn parse_plain_text(body: &[u8]) -> Result<()> {
	let text = String::from_utf8_lossy(body);
	let code: f64 = text.trim().parse().map_err(|e| {
		IngestionError::InvalidResponseContent(format!("convert text/plain {:?}: {e}", text.trim()))
	})?;

	if code == 0.0 {
		return Err(IngestionError::InvalidResponseData(
			"request failed".to_string(),
		));
	}
	Ok(())
}

fn parse_verbose(body: &[u8]) -> Result<()> {
	let content: VerboseStatus = serde_json::from_slice(body)
		.map_err(|e| IngestionError::InvalidResponseContent(format!("unmarshal json: {e}")))?;

	if content.status.unwrap_or(0) == 0 {
		let error = content
			.error
			.filter(|e| !e.is_empty())
			.unwrap_or_else(|| "details not provided".to_string());
		return Err(IngestionError::InvalidResponseData(format!(
			"request failed: {error}"
		)));
	}
	Ok(())
}

fn parse_error(status: StatusCode, body: &[u8]) -> Result<()> {
	let content: ErrorStatus = serde_json::from_slice(body).map_err(|e| {
		IngestionError::InvalidResponseContent(format!("unmarshal json error: {e}"))
	})?;

	debug!(
		status = status.as_u16(),
		service_status = content.status.as_deref().unwrap_or_default(),
		"ingestion request rejected"
	);

	let message = content
		.error
		.filter(|e| !e.is_empty())
		.unwrap_or_else(|| "error details not provided".to_string());
	Err(IngestionError::RequestFailed {
		status: status.as_u16(),
		message,
	})
}
