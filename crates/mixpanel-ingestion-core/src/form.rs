// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! URL-encoded request bodies for the ingestion endpoints.
//!
//! Every request carries a single `data` field holding the JSON payload (or
//! batch array). Optional fields shape the response:
//!
//! | Field | Effect |
//! |-------|--------|
//! | `verbose=1` | JSON `{status, error}` instead of a bare `1`/`0` |
//! | `ip=1` | use the request's IP address as `distinct_id` when none is given |
//! | `redirect=<url>` | answer with a redirect |
//! | `image=1` | answer with a 1x1 transparent image |
//! | `callback=<name>` | answer with JavaScript calling `name` |
//!
//! The last three are mutually exclusive and modelled by [`ResponseMode`].

use serde::Serialize;
use thiserror::Error;
use url::form_urlencoded;

use crate::event::EventData;
use crate::profile::ProfileMutation;

/// Maximum number of payloads the service accepts in one batch request.
pub const MAX_BATCH_SIZE: usize = 50;

/// Errors raised while building a form, before anything is sent.
#[derive(Debug, Error)]
pub enum FormError {
	#[error("data is empty")]
	EmptyData,

	#[error("batch is empty")]
	EmptyBatch,

	#[error("batch of {len} items exceeds the limit of {max}")]
	BatchTooLarge { len: usize, max: usize },

	#[error("payload serialization failed: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// How the service should answer a single-payload request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResponseMode {
	/// Plain status answer (`text/plain`, or JSON when verbose).
	#[default]
	Default,
	/// Redirect to the given URL.
	Redirect(String),
	/// 1x1 transparent image (`image/png`).
	Image,
	/// JavaScript (`text/javascript`) invoking the named callback.
	Callback(String),
}

/// Optional request fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormOptions {
	pub verbose: bool,
	pub ip_as_distinct_id: bool,
	pub response: ResponseMode,
}

impl FormOptions {
	/// Options with the verbose flag set, so the service answers with JSON
	/// that carries an error description on failure.
	pub fn verbose() -> Self {
		Self {
			verbose: true,
			..Default::default()
		}
	}

	pub fn with_verbose(mut self, verbose: bool) -> Self {
		self.verbose = verbose;
		self
	}

	pub fn with_ip_as_distinct_id(mut self, ip: bool) -> Self {
		self.ip_as_distinct_id = ip;
		self
	}

	/// Asks for a redirect response. An empty URL clears a previously set
	/// redirect and leaves any other response mode alone.
	pub fn with_redirect(mut self, url: impl Into<String>) -> Self {
		let url = url.into();
		if !url.is_empty() {
			self.response = ResponseMode::Redirect(url);
		} else if matches!(self.response, ResponseMode::Redirect(_)) {
			self.response = ResponseMode::Default;
		}
		self
	}

	/// Asks for an image response, or clears it when `image` is false.
	pub fn with_image(mut self, image: bool) -> Self {
		if image {
			self.response = ResponseMode::Image;
		} else if self.response == ResponseMode::Image {
			self.response = ResponseMode::Default;
		}
		self
	}

	/// Asks for a JavaScript callback response. An empty name clears a
	/// previously set callback.
	pub fn with_callback(mut self, name: impl Into<String>) -> Self {
		let name = name.into();
		if !name.is_empty() {
			self.response = ResponseMode::Callback(name);
		} else if matches!(self.response, ResponseMode::Callback(_)) {
			self.response = ResponseMode::Default;
		}
		self
	}

	/// Drops the fields that only apply to single-payload requests.
	fn for_batch(self) -> Self {
		Self {
			verbose: self.verbose,
			ip_as_distinct_id: false,
			response: ResponseMode::Default,
		}
	}
}

/// A ready-to-encode request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionForm {
	data: String,
	options: FormOptions,
}

impl IngestionForm {
	/// Wraps an already encoded JSON payload.
	pub fn new(data: impl Into<String>, options: FormOptions) -> Result<Self, FormError> {
		let data = data.into();
		if data.is_empty() {
			return Err(FormError::EmptyData);
		}
		Ok(Self { data, options })
	}

	/// Form for a single event.
	pub fn event(event: &EventData, options: FormOptions) -> Result<Self, FormError> {
		Self::from_payload(event, options)
	}

	/// Form for a batch of events. IP and response-mode options are ignored.
	pub fn event_batch(events: &[EventData], options: FormOptions) -> Result<Self, FormError> {
		check_batch_len(events.len())?;
		Self::from_payload(events, options.for_batch())
	}

	/// Form for a single profile mutation.
	pub fn profile(mutation: &ProfileMutation, options: FormOptions) -> Result<Self, FormError> {
		Self::from_payload(mutation, options)
	}

	/// Form for a batch of profile mutations. IP and response-mode options
	/// are ignored.
	pub fn profile_batch(
		mutations: &[ProfileMutation],
		options: FormOptions,
	) -> Result<Self, FormError> {
		check_batch_len(mutations.len())?;
		Self::from_payload(mutations, options.for_batch())
	}

	fn from_payload<T: Serialize + ?Sized>(payload: &T, options: FormOptions) -> Result<Self, FormError> {
		let data = serde_json::to_string(payload)?;
		Self::new(data, options)
	}

	/// The JSON payload carried in the `data` field.
	pub fn data(&self) -> &str {
		&self.data
	}

	pub fn options(&self) -> &FormOptions {
		&self.options
	}

	/// Form fields in wire order.
	pub fn pairs(&self) -> Vec<(&'static str, &str)> {
		let mut pairs = vec![("data", self.data.as_str())];
		if self.options.verbose {
			pairs.push(("verbose", "1"));
		}
		if self.options.ip_as_distinct_id {
			pairs.push(("ip", "1"));
		}
		match &self.options.response {
			ResponseMode::Default => {}
			ResponseMode::Redirect(url) => pairs.push(("redirect", url.as_str())),
			ResponseMode::Image => pairs.push(("image", "1")),
			ResponseMode::Callback(name) => pairs.push(("callback", name.as_str())),
		}
		pairs
	}

	/// Encodes the form as `application/x-www-form-urlencoded`.
	pub fn encode(&self) -> String {
		form_urlencoded::Serializer::new(String::new())
			.extend_pairs(self.pairs())
			.finish()
	}
}

fn check_batch_len(len: usize) -> Result<(), FormError> {
	match len {
		0 => Err(FormError::EmptyBatch),
		len if len > MAX_BATCH_SIZE => Err(FormError::BatchTooLarge {
			len,
			max: MAX_BATCH_SIZE,
		}),
		_ => Ok(()),
	}
}
