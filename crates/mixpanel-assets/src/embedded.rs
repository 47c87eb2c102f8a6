// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Files compiled into the binary.

pub const EVENT_SCHEMA: &str = "openapi/event.schema.json";
pub const ENGAGE_SCHEMA: &str = "openapi/engage.schema.json";
pub const INGESTION_SPEC: &str = "openapi/ingestion.openapi.yml";

/// Every embedded file, by path relative to the crate root.
pub const ENTRIES: [(&str, &str); 3] = [
	(EVENT_SCHEMA, include_str!("../openapi/event.schema.json")),
	(ENGAGE_SCHEMA, include_str!("../openapi/engage.schema.json")),
	(INGESTION_SPEC, include_str!("../openapi/ingestion.openapi.yml")),
];

/// Returns the contents of an embedded file.
pub fn read(name: &str) -> Option<&'static str> {
	ENTRIES
		.iter()
		.find(|(path, _)| *path == name)
		.map(|(_, contents)| *contents)
}
