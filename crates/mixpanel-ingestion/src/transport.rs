// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport used by the client.

use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends a prepared request and returns the raw response.
///
/// Implementations must be safe to share between concurrent calls.
#[async_trait]
pub trait HttpTransport: Send + Sync {
	async fn execute(&self, request: Request) -> Result<Response, reqwest::Error>;
}

#[async_trait]
impl HttpTransport for reqwest::Client {
	async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
		reqwest::Client::execute(self, request).await
	}
}
