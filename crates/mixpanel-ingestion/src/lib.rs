// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client for the Mixpanel Ingestion API.
//!
//! # Example
//!
//! ```ignore
//! use mixpanel_ingestion::{EventData, EventProperties, IngestionClient, EU_SERVER_URL};
//!
//! let client = IngestionClient::new(EU_SERVER_URL)?;
//!
//! let event = EventData::new("signup", "project-token").with_properties(
//!     EventProperties::new("project-token")
//!         .with_random_insert_id()
//!         .with_distinct_id("user-1")
//!         .with_custom("plan", "pro"),
//! );
//! client.track(&event).await?;
//! ```
//!
//! Each call sends one request and returns the outcome; retrying is left to
//! the caller.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod response;
pub mod transport;

pub use client::{ClientConfig, IngestionClient, IngestionClientBuilder};
pub use endpoint::{Endpoints, Operation, DEFAULT_SERVER_URL, EU_SERVER_URL};
pub use error::{ErrorKind, IngestionError, Result};
pub use response::{classify, parse_response};
pub use transport::HttpTransport;

pub use mixpanel_ingestion_core::{
	CustomProperties, EventData, EventProperties, FormError, FormOptions, IngestionForm,
	ListAppend, ListRemove, NumberAdd, ProfileMutation, ProfileOperation, ResponseMode, Set,
	SetOnce, Unset, MAX_BATCH_SIZE,
};
