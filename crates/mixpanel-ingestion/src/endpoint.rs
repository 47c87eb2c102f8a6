// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-operation endpoint URLs.
//!
//! Operations sharing a path are distinguished by the URL fragment, which
//! matches the path keys of the OpenAPI description. The fragment is never
//! sent on the wire.

use std::fmt;

use mixpanel_ingestion_core::ProfileMutation;
use url::Url;

use crate::error::{IngestionError, Result};

/// US data residency server.
pub const DEFAULT_SERVER_URL: &str = "https://api.mixpanel.com";

/// EU data residency server.
pub const EU_SERVER_URL: &str = "https://api-eu.mixpanel.com";

/// An ingestion API operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
	Track,
	TrackDeduplicate,
	TrackBatch,
	ProfileSet,
	ProfileSetOnce,
	ProfileAdd,
	ProfileAppend,
	ProfileRemove,
	ProfileUnset,
	ProfileBatch,
}

impl Operation {
	pub const ALL: [Operation; 10] = [
		Operation::Track,
		Operation::TrackDeduplicate,
		Operation::TrackBatch,
		Operation::ProfileSet,
		Operation::ProfileSetOnce,
		Operation::ProfileAdd,
		Operation::ProfileAppend,
		Operation::ProfileRemove,
		Operation::ProfileUnset,
		Operation::ProfileBatch,
	];

	/// Reference resolved against the server URL.
	pub fn reference(&self) -> &'static str {
		match self {
			Operation::Track => "/track#live-event",
			Operation::TrackDeduplicate => "/track#live-event-deduplicate",
			Operation::TrackBatch => "/track#past-events-batch",
			Operation::ProfileSet => "/engage#profile-set",
			Operation::ProfileSetOnce => "/engage#profile-set-once",
			Operation::ProfileAdd => "/engage#profile-numerical-add",
			Operation::ProfileAppend => "/engage#profile-list-append",
			Operation::ProfileRemove => "/engage#profile-list-remove",
			Operation::ProfileUnset => "/engage#profile-unset",
			Operation::ProfileBatch => "/engage#profile-batch-update",
		}
	}

	/// The single-profile operation for a mutation.
	pub fn for_profile(mutation: &ProfileMutation) -> Self {
		match mutation {
			ProfileMutation::Set(_) => Operation::ProfileSet,
			ProfileMutation::SetOnce(_) => Operation::ProfileSetOnce,
			ProfileMutation::NumberAdd(_) => Operation::ProfileAdd,
			ProfileMutation::ListAppend(_) => Operation::ProfileAppend,
			ProfileMutation::ListRemove(_) => Operation::ProfileRemove,
			ProfileMutation::Unset(_) => Operation::ProfileUnset,
		}
	}

	fn index(&self) -> usize {
		*self as usize
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let reference = self.reference();
		let name = reference.split_once('#').map_or(reference, |(_, name)| name);
		f.write_str(name)
	}
}

/// Endpoint URLs for every operation, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
	server: Url,
	urls: Vec<Url>,
}

impl Endpoints {
	pub fn new(server_url: &str) -> Result<Self> {
		let trimmed = server_url.trim().trim_end_matches('/');
		if trimmed.is_empty() {
			return Err(IngestionError::InvalidArgument(
				"server URL is empty".to_string(),
			));
		}

		let server = Url::parse(trimmed).map_err(|e| {
			IngestionError::InvalidArgument(format!("invalid server URL {trimmed:?}: {e}"))
		})?;

		let urls = Operation::ALL
			.iter()
			.map(|op| {
				server.join(op.reference()).map_err(|e| {
					IngestionError::InvalidArgument(format!(
						"cannot resolve {} against {trimmed:?}: {e}",
						op.reference()
					))
				})
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(Self { server, urls })
	}

	pub fn server(&self) -> &Url {
		&self.server
	}

	pub fn url(&self, op: Operation) -> &Url {
		&self.urls[op.index()]
	}

	pub fn iter(&self) -> impl Iterator<Item = (Operation, &Url)> {
		Operation::ALL.into_iter().zip(self.urls.iter())
	}
}
