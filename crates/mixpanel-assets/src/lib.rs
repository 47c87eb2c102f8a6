// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Static description of the Mixpanel Ingestion API.
//!
//! The crate embeds three documents under `openapi/`:
//!
//! - `event.schema.json`: JSON Schema of an event payload
//! - `engage.schema.json`: JSON Schema of a profile update payload
//! - `ingestion.openapi.yml`: OpenAPI description of every endpoint
//!
//! Schemas are compiled once per process. The OpenAPI description can check
//! that a URL-encoded request conforms to the published contract, which is how
//! the client's requests are verified in tests.

mod embedded;
mod error;
pub mod openapi;
pub mod schema;

pub use embedded::{read, ENGAGE_SCHEMA, ENTRIES, EVENT_SCHEMA, INGESTION_SPEC};
pub use error::{AssetError, Result};
pub use openapi::{ingestion_spec, IngestionSpec};
pub use schema::{
	compile_schema, engage_schema, event_schema, validate_engage_json, validate_event_json,
	validate_json,
};
