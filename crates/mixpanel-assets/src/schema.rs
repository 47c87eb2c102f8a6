// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! JSON Schema validation of event and profile payloads.

use std::sync::LazyLock;

use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

use crate::embedded::{read, ENGAGE_SCHEMA, EVENT_SCHEMA};
use crate::error::{AssetError, Result};

static EVENT_VALIDATOR: LazyLock<std::result::Result<Validator, String>> =
	LazyLock::new(|| compile_schema(EVENT_SCHEMA).map_err(|e| e.to_string()));

static ENGAGE_VALIDATOR: LazyLock<std::result::Result<Validator, String>> =
	LazyLock::new(|| compile_schema(ENGAGE_SCHEMA).map_err(|e| e.to_string()));

/// Compiles an embedded JSON Schema. Format assertions (`ipv4`, `ipv6`, ...)
/// are enforced.
pub fn compile_schema(name: &str) -> Result<Validator> {
	let source = read(name).ok_or_else(|| AssetError::NotFound(name.to_string()))?;
	let schema: Value = serde_json::from_str(source)?;
	let validator = compile_value(&schema)?;
	debug!(asset = name, "compiled JSON schema");
	Ok(validator)
}

pub(crate) fn compile_value(schema: &Value) -> Result<Validator> {
	jsonschema::options()
		.should_validate_formats(true)
		.build(schema)
		.map_err(|e| AssetError::Schema(e.to_string()))
}

/// The event payload schema, compiled on first use.
pub fn event_schema() -> Result<&'static Validator> {
	EVENT_VALIDATOR
		.as_ref()
		.map_err(|e| AssetError::Schema(e.clone()))
}

/// The profile update schema, compiled on first use.
pub fn engage_schema() -> Result<&'static Validator> {
	ENGAGE_VALIDATOR
		.as_ref()
		.map_err(|e| AssetError::Schema(e.clone()))
}

/// Validates an instance, collecting every violation.
pub fn validate_json(validator: &Validator, instance: &Value) -> Result<()> {
	let errors: Vec<String> = validator
		.iter_errors(instance)
		.map(|e| e.to_string())
		.collect();

	if errors.is_empty() {
		Ok(())
	} else {
		Err(AssetError::Invalid { errors })
	}
}

/// Validates a serialized event against the event schema.
pub fn validate_event_json(json: &[u8]) -> Result<()> {
	let instance: Value = serde_json::from_slice(json)?;
	validate_json(event_schema()?, &instance)
}

/// Validates a serialized profile update against the engage schema.
pub fn validate_engage_json(json: &[u8]) -> Result<()> {
	let instance: Value = serde_json::from_slice(json)?;
	validate_json(engage_schema()?, &instance)
}
