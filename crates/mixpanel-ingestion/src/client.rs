// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Ingestion API client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use mixpanel_ingestion_core::{
	EventData, FormOptions, IngestionForm, ListAppend, ListRemove, NumberAdd, ProfileMutation,
	Set, SetOnce, Unset,
};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Request};
use tracing::{debug, info};

use crate::endpoint::{Endpoints, Operation};
use crate::error::{IngestionError, Result};
use crate::response::parse_response;
use crate::transport::HttpTransport;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const ACCEPT_TEXT: &str = "text/plain";
const ACCEPT_JSON: &str = "application/json";

/// Configuration for the ingestion client.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
	/// Per-request timeout. `None` leaves timing to the transport.
	pub request_timeout: Option<Duration>,
	/// `User-Agent` header. `None` uses the library default, an empty string
	/// sends no header.
	pub user_agent: Option<String>,
}

/// Builder for constructing an [`IngestionClient`].
pub struct IngestionClientBuilder {
	server_url: Option<String>,
	transport: Option<Arc<dyn HttpTransport>>,
	config: ClientConfig,
}

impl IngestionClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self {
			server_url: None,
			transport: None,
			config: ClientConfig::default(),
		}
	}

	/// Sets the API server.
	///
	/// Example: `https://api-eu.mixpanel.com`
	pub fn server_url(mut self, url: impl Into<String>) -> Self {
		self.server_url = Some(url.into());
		self
	}

	/// Replaces the default `reqwest` client.
	pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
		self.transport = Some(Arc::new(transport));
		self
	}

	/// Replaces the default `reqwest` client with a shared transport.
	pub fn shared_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	/// Sets the `User-Agent` header. An empty value sends no header.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.config.user_agent = Some(user_agent.into());
		self
	}

	/// Sets the HTTP request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = Some(timeout);
		self
	}

	/// Replaces the whole configuration.
	pub fn config(mut self, config: ClientConfig) -> Self {
		self.config = config;
		self
	}

	/// Builds the IngestionClient.
	pub fn build(self) -> Result<IngestionClient> {
		let server_url = self
			.server_url
			.ok_or_else(|| IngestionError::InvalidArgument("server URL is required".to_string()))?;
		let endpoints = Endpoints::new(&server_url)?;

		let user_agent_text = self
			.config
			.user_agent
			.clone()
			.unwrap_or_else(mixpanel_common_http::user_agent);
		let user_agent = if user_agent_text.is_empty() {
			None
		} else {
			Some(HeaderValue::from_str(&user_agent_text).map_err(|e| {
				IngestionError::InvalidArgument(format!(
					"invalid user agent {user_agent_text:?}: {e}"
				))
			})?)
		};

		let transport = match self.transport {
			Some(transport) => transport,
			None => {
				let builder = if user_agent_text.is_empty() {
					reqwest::Client::builder()
				} else {
					mixpanel_common_http::builder_with_user_agent(user_agent_text.as_str())
				};
				Arc::new(builder.build()?) as Arc<dyn HttpTransport>
			}
		};

		info!(server = %endpoints.server(), "Ingestion client initialized");

		Ok(IngestionClient {
			inner: Arc::new(IngestionClientInner {
				endpoints,
				transport,
				user_agent,
				config: self.config,
			}),
		})
	}
}

impl Default for IngestionClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct IngestionClientInner {
	endpoints: Endpoints,
	transport: Arc<dyn HttpTransport>,
	user_agent: Option<HeaderValue>,
	config: ClientConfig,
}

/// Client for the Mixpanel Ingestion API.
///
/// Every call is a single POST. Requests ask for verbose responses so
/// failures carry the service's explanation. Nothing is retried.
///
/// Cloning is cheap; clones share the transport.
#[derive(Clone)]
pub struct IngestionClient {
	inner: Arc<IngestionClientInner>,
}

impl fmt::Debug for IngestionClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IngestionClient")
			.field("server", &self.inner.endpoints.server().as_str())
			.field("config", &self.inner.config)
			.finish_non_exhaustive()
	}
}

impl IngestionClient {
	/// Creates a client with the default transport.
	pub fn new(server_url: impl Into<String>) -> Result<Self> {
		Self::builder().server_url(server_url).build()
	}

	pub fn builder() -> IngestionClientBuilder {
		IngestionClientBuilder::new()
	}

	pub fn endpoints(&self) -> &Endpoints {
		&self.inner.endpoints
	}

	/// Tracks a single live event.
	pub async fn track(&self, event: &EventData) -> Result<()> {
		self.track_with_options(event, FormOptions::verbose()).await
	}

	/// Tracks a single live event with custom form options (IP geolocation,
	/// redirect, image or callback responses).
	pub async fn track_with_options(&self, event: &EventData, options: FormOptions) -> Result<()> {
		let form = IngestionForm::event(event, options)?;
		self.send(Operation::Track, form).await
	}

	/// Tracks a single live event, letting the service drop duplicates by
	/// `$insert_id`.
	pub async fn track_deduplicate(&self, event: &EventData) -> Result<()> {
		let form = IngestionForm::event(event, FormOptions::verbose())?;
		self.send(Operation::TrackDeduplicate, form).await
	}

	/// Tracks up to [`MAX_BATCH_SIZE`](mixpanel_ingestion_core::MAX_BATCH_SIZE)
	/// events in one request.
	pub async fn track_batch(&self, events: &[EventData]) -> Result<()> {
		let form = IngestionForm::event_batch(events, FormOptions::verbose())?;
		self.send(Operation::TrackBatch, form).await
	}

	/// Applies one profile mutation at the endpoint for its operation.
	pub async fn engage(&self, mutation: &ProfileMutation) -> Result<()> {
		let form = IngestionForm::profile(mutation, FormOptions::verbose())?;
		self.send(Operation::for_profile(mutation), form).await
	}

	/// Applies up to [`MAX_BATCH_SIZE`](mixpanel_ingestion_core::MAX_BATCH_SIZE)
	/// profile mutations, of any operations, in one request.
	pub async fn engage_batch(&self, mutations: &[ProfileMutation]) -> Result<()> {
		let form = IngestionForm::profile_batch(mutations, FormOptions::verbose())?;
		self.send(Operation::ProfileBatch, form).await
	}

	pub async fn set(&self, set: Set) -> Result<()> {
		self.engage(&set.into()).await
	}

	pub async fn set_once(&self, set_once: SetOnce) -> Result<()> {
		self.engage(&set_once.into()).await
	}

	pub async fn add(&self, add: NumberAdd) -> Result<()> {
		self.engage(&add.into()).await
	}

	pub async fn append(&self, append: ListAppend) -> Result<()> {
		self.engage(&append.into()).await
	}

	pub async fn remove(&self, remove: ListRemove) -> Result<()> {
		self.engage(&remove.into()).await
	}

	pub async fn unset(&self, unset: Unset) -> Result<()> {
		self.engage(&unset.into()).await
	}

	async fn send(&self, op: Operation, form: IngestionForm) -> Result<()> {
		let request = self.build_request(op, &form);

		debug!(
			operation = %op,
			url = %request.url(),
			verbose = form.options().verbose,
			"sending ingestion request"
		);

		let response = self.inner.transport.execute(request).await?;
		let result = parse_response(response).await;

		debug!(operation = %op, ok = result.is_ok(), "ingestion request completed");
		result
	}

	fn build_request(&self, op: Operation, form: &IngestionForm) -> Request {
		let body = form.encode();
		let mut request = Request::new(Method::POST, self.inner.endpoints.url(op).clone());

		let headers = request.headers_mut();
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
		headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
		headers.append(ACCEPT, HeaderValue::from_static(ACCEPT_TEXT));
		headers.append(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
		if let Some(user_agent) = &self.inner.user_agent {
			headers.insert(USER_AGENT, user_agent.clone());
		}

		*request.timeout_mut() = self.inner.config.request_timeout;
		*request.body_mut() = Some(body.into());
		request
	}
}
