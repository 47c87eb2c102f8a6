// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP client with consistent User-Agent header.

use reqwest::{Client, ClientBuilder};
use tracing::debug;

/// Platform string in `{os}-{arch}` format, e.g. "linux-x86_64".
pub fn platform() -> String {
	format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Creates a new HTTP client with the standard User-Agent header.
///
/// # Errors
///
/// Returns the underlying `reqwest` error if the TLS backend cannot be
/// initialised.
pub fn new_client() -> reqwest::Result<Client> {
	builder().build()
}

/// Creates a new HTTP client builder with the standard User-Agent header.
///
/// Use this when you need to customize the client (e.g., set timeout).
///
/// # Example
/// ```ignore
/// let client = mixpanel_common_http::builder()
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	builder_with_user_agent(user_agent())
}

/// Creates a new HTTP client builder with a custom User-Agent header.
pub fn builder_with_user_agent(user_agent: impl Into<String>) -> ClientBuilder {
	let user_agent = user_agent.into();
	debug!(user_agent = %user_agent, "building HTTP client");
	Client::builder().user_agent(user_agent)
}

/// Returns the standard User-Agent string.
///
/// Format: `mixpanel-ingestion/{version} ({platform})`
pub fn user_agent() -> String {
	format!("mixpanel-ingestion/{PKG_VERSION} ({})", platform())
}
