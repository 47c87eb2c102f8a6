// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Conformance checks against the OpenAPI description of the ingestion API.
//!
//! Several operations share a URL path (`/track`, `/engage`) and are told apart
//! by the URL fragment, so routes are looked up by `path#fragment` exactly as
//! written in the description.
//!
//! A URL-encoded body is decoded field by field using the request body schema:
//! string fields stay strings, integer and number fields become numbers, and
//! everything else (objects, arrays, external references) is parsed as JSON.
//! The decoded object is then validated with the request body schema, with
//! references to the embedded JSON Schema files inlined.

use std::collections::HashMap;
use std::sync::LazyLock;

use openapiv3::{OpenAPI, Operation, ReferenceOr, Schema, SchemaKind, Type};
use serde_json::{Map, Value};
use tracing::debug;
use url::{form_urlencoded, Url};

use crate::embedded::{read, INGESTION_SPEC};
use crate::error::{AssetError, Result};
use crate::schema::{compile_value, validate_json};

/// Nesting limit for references between embedded files.
const MAX_REF_DEPTH: usize = 8;

/// Schema keywords that only exist in OpenAPI 3.0 and would confuse a JSON
/// Schema validator.
const OPENAPI_ONLY_KEYWORDS: [&str; 7] = [
	"nullable",
	"discriminator",
	"readOnly",
	"writeOnly",
	"xml",
	"externalDocs",
	"example",
];

static SPEC: LazyLock<std::result::Result<IngestionSpec, String>> =
	LazyLock::new(|| IngestionSpec::load().map_err(|e| e.to_string()));

/// The embedded description, parsed on first use.
pub fn ingestion_spec() -> Result<&'static IngestionSpec> {
	SPEC.as_ref().map_err(|e| AssetError::Schema(e.clone()))
}

/// Parsed OpenAPI description of the ingestion API.
#[derive(Debug, Clone)]
pub struct IngestionSpec {
	api: OpenAPI,
}

impl IngestionSpec {
	/// Parses the embedded `ingestion.openapi.yml`.
	pub fn load() -> Result<Self> {
		let source =
			read(INGESTION_SPEC).ok_or_else(|| AssetError::NotFound(INGESTION_SPEC.to_string()))?;
		Self::parse(source)
	}

	/// Parses an OpenAPI 3 document from YAML (or JSON, which is valid YAML).
	pub fn parse(source: &str) -> Result<Self> {
		let api: OpenAPI = serde_yaml::from_str(source)?;
		if !api.openapi.starts_with("3.") {
			return Err(AssetError::Schema(format!(
				"unsupported OpenAPI version {}",
				api.openapi
			)));
		}
		debug!(
			title = %api.info.title,
			paths = api.paths.paths.len(),
			"loaded OpenAPI description"
		);
		Ok(Self { api })
	}

	pub fn api(&self) -> &OpenAPI {
		&self.api
	}

	/// Path keys (`path#fragment`) that have a `post` operation.
	pub fn operation_keys(&self) -> Vec<&str> {
		self
			.api
			.paths
			.paths
			.iter()
			.filter(|(_, item)| matches!(item, ReferenceOr::Item(item) if item.post.is_some()))
			.map(|(key, _)| key.as_str())
			.collect()
	}

	/// The `post` operation registered under a path key.
	pub fn post_operation(&self, key: &str) -> Option<&Operation> {
		match self.api.paths.paths.get(key)? {
			ReferenceOr::Item(item) => item.post.as_ref(),
			ReferenceOr::Reference { .. } => None,
		}
	}

	/// Checks a URL-encoded request against the operation its URL points to.
	pub fn validate_form(&self, url: &Url, content_type: &str, body: &[u8]) -> Result<()> {
		let key = route_key(url);
		let operation = self
			.post_operation(&key)
			.ok_or_else(|| AssetError::Route(key.clone()))?;

		let request_body = match &operation.request_body {
			Some(ReferenceOr::Item(body)) => body,
			Some(ReferenceOr::Reference { reference }) => {
				return Err(AssetError::Route(format!(
					"{key}: request body reference {reference} is not supported"
				)))
			}
			None => return Err(AssetError::Route(format!("{key}: no request body"))),
		};

		let media_type = content_type.split(';').next().unwrap_or_default().trim();
		let media = request_body.content.get(media_type).ok_or_else(|| {
			AssetError::Route(format!("{key}: content type {media_type:?} is not accepted"))
		})?;

		let schema = match &media.schema {
			Some(ReferenceOr::Item(schema)) => schema,
			_ => {
				return Err(AssetError::Route(format!(
					"{key}: request body has no inline schema"
				)))
			}
		};

		let instance = decode_form(schema, body)?;

		let mut schema_value = serde_json::to_value(schema)?;
		strip_openapi_keywords(&mut schema_value);
		inline_external_refs(&mut schema_value, 0)?;

		let validator = compile_value(&schema_value)?;
		validate_json(&validator, &instance)?;

		debug!(
			route = %key,
			operation_id = operation.operation_id.as_deref().unwrap_or_default(),
			"request conforms to OpenAPI description"
		);
		Ok(())
	}
}

/// `path#fragment`, or just the path when there is no fragment.
pub fn route_key(url: &Url) -> String {
	match url.fragment() {
		Some(fragment) => format!("{}#{}", url.path(), fragment),
		None => url.path().to_string(),
	}
}

fn decode_form(schema: &Schema, body: &[u8]) -> Result<Value> {
	let object = match &schema.schema_kind {
		SchemaKind::Type(Type::Object(object)) => object,
		_ => {
			return Err(AssetError::Form(
				"request body schema must have type object".to_string(),
			))
		}
	};

	let mut values: HashMap<String, String> = HashMap::new();
	for (name, value) in form_urlencoded::parse(body).into_owned() {
		values.entry(name).or_insert(value);
	}

	let mut instance = Map::new();
	for (name, property) in &object.properties {
		let Some(raw) = values.get(name) else {
			if object.required.contains(name) {
				return Err(AssetError::Form(format!("required field {name} is missing")));
			}
			continue;
		};

		let value = match property {
			ReferenceOr::Item(property) => match &property.schema_kind {
				SchemaKind::Type(Type::String(_)) => Value::String(raw.clone()),
				SchemaKind::Type(Type::Integer(_)) | SchemaKind::Type(Type::Number(_)) => {
					parse_number(name, raw)?
				}
				_ => parse_json(name, raw)?,
			},
			ReferenceOr::Reference { .. } => parse_json(name, raw)?,
		};
		instance.insert(name.clone(), value);
	}

	Ok(Value::Object(instance))
}

fn parse_number(name: &str, raw: &str) -> Result<Value> {
	if let Ok(n) = raw.parse::<i64>() {
		return Ok(Value::from(n));
	}
	raw
		.parse::<f64>()
		.ok()
		.and_then(serde_json::Number::from_f64)
		.map(Value::Number)
		.ok_or_else(|| AssetError::Form(format!("invalid number {name} ({raw})")))
}

fn parse_json(name: &str, raw: &str) -> Result<Value> {
	serde_json::from_str(raw).map_err(|e| AssetError::Form(format!("invalid JSON in {name}: {e}")))
}

/// Removes OpenAPI-only keywords from a schema and its subschemas.
fn strip_openapi_keywords(schema: &mut Value) {
	let Value::Object(map) = schema else {
		return;
	};

	for keyword in OPENAPI_ONLY_KEYWORDS {
		map.remove(keyword);
	}
	map.retain(|_, value| !value.is_null());
	// OpenAPI 3.0 uses booleans here, JSON Schema uses numbers.
	for keyword in ["exclusiveMinimum", "exclusiveMaximum"] {
		if map.get(keyword).is_some_and(Value::is_boolean) {
			map.remove(keyword);
		}
	}

	if let Some(Value::Object(properties)) = map.get_mut("properties") {
		properties.values_mut().for_each(strip_openapi_keywords);
	}
	for keyword in ["items", "additionalProperties", "not"] {
		if let Some(subschema) = map.get_mut(keyword) {
			strip_openapi_keywords(subschema);
		}
	}
	for keyword in ["oneOf", "anyOf", "allOf"] {
		if let Some(Value::Array(subschemas)) = map.get_mut(keyword) {
			subschemas.iter_mut().for_each(strip_openapi_keywords);
		}
	}
}

/// Replaces `$ref`s to embedded files with the referenced schema.
fn inline_external_refs(value: &mut Value, depth: usize) -> Result<()> {
	if depth > MAX_REF_DEPTH {
		return Err(AssetError::Schema(
			"external references are nested too deeply".to_string(),
		));
	}

	let external = match value {
		Value::Object(map) => map
			.get("$ref")
			.and_then(Value::as_str)
			.filter(|reference| !reference.starts_with('#'))
			.map(str::to_owned),
		_ => None,
	};

	if let Some(reference) = external {
		let mut resolved = resolve_external(&reference)?;
		inline_external_refs(&mut resolved, depth + 1)?;
		*value = resolved;
		return Ok(());
	}

	match value {
		Value::Object(map) => {
			for child in map.values_mut() {
				inline_external_refs(child, depth)?;
			}
		}
		Value::Array(items) => {
			for item in items {
				inline_external_refs(item, depth)?;
			}
		}
		_ => {}
	}
	Ok(())
}

fn resolve_external(reference: &str) -> Result<Value> {
	let (file, pointer) = reference.split_once('#').unwrap_or((reference, ""));
	let name = format!("openapi/{}", file.trim_start_matches("./"));
	let source = read(&name).ok_or_else(|| AssetError::NotFound(reference.to_string()))?;
	let document: Value = serde_json::from_str(source)?;

	let mut resolved = if pointer.is_empty() {
		document
	} else {
		document
			.pointer(pointer)
			.cloned()
			.ok_or_else(|| AssetError::NotFound(reference.to_string()))?
	};

	if let Value::Object(map) = &mut resolved {
		map.remove("$schema");
		map.remove("$id");
	}
	Ok(resolved)
}
