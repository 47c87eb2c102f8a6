// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event tracking payloads.
//!
//! On the wire an event is `{"event": "...", "properties": {...}}` where the
//! properties object mixes a handful of reserved keys with any number of
//! custom keys. [`EventProperties`] keeps the reserved keys as typed fields and
//! the rest in a [`CustomProperties`] map, flattening both into one object when
//! serialized and splitting them apart again when deserialized.

use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer, Unexpected};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::properties::CustomProperties;

const INSERT_ID: &str = "$insert_id";
const DISTINCT_ID: &str = "distinct_id";
const IP: &str = "ip";
const TIME: &str = "time";
const TOKEN: &str = "token";

/// Property keys with a fixed meaning. Everything else is a custom property.
pub const RESERVED_PROPERTIES: [&str; 5] = [INSERT_ID, DISTINCT_ID, IP, TIME, TOKEN];

/// An action that took place within your product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventData {
	/// The name of the action to track.
	pub event: String,
	/// Metadata about the action.
	pub properties: EventProperties,
}

impl EventData {
	/// Creates an event with the given name and project token.
	pub fn new(event: impl Into<String>, token: impl Into<String>) -> Self {
		Self {
			event: event.into(),
			properties: EventProperties::new(token),
		}
	}

	/// Replaces the properties (builder pattern).
	pub fn with_properties(mut self, properties: EventProperties) -> Self {
		self.properties = properties;
		self
	}
}

/// Event metadata: reserved fields plus arbitrary custom properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventProperties {
	/// `$insert_id`: unique event identifier used for deduplication.
	///
	/// At most 36 alphanumeric or hyphen characters; the service truncates
	/// longer values and replaces values with other characters.
	pub insert_id: Option<String>,

	/// `distinct_id`: identifies the user the event belongs to.
	pub distinct_id: Option<String>,

	/// `ip`: address used for geolocation when sending from a backend.
	pub ip: Option<String>,

	/// `time`: when the event occurred. Sent as whole Unix seconds, so
	/// sub-second precision does not survive the wire.
	pub time: Option<DateTime<Utc>>,

	/// `token`: the project token. Always sent, even when empty.
	pub token: String,

	/// Everything else.
	pub custom: CustomProperties,
}

impl EventProperties {
	/// Creates properties carrying only the project token.
	pub fn new(token: impl Into<String>) -> Self {
		Self {
			token: token.into(),
			..Default::default()
		}
	}

	pub fn with_insert_id(mut self, insert_id: impl Into<String>) -> Self {
		self.insert_id = Some(insert_id.into());
		self
	}

	/// Sets `$insert_id` to a freshly generated UUID (36 characters).
	pub fn with_random_insert_id(mut self) -> Self {
		self.insert_id = Some(Uuid::new_v4().to_string());
		self
	}

	pub fn with_distinct_id(mut self, distinct_id: impl Into<String>) -> Self {
		self.distinct_id = Some(distinct_id.into());
		self
	}

	pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
		self.ip = Some(ip.into());
		self
	}

	pub fn with_time(mut self, time: DateTime<Utc>) -> Self {
		self.time = Some(time);
		self
	}

	/// Adds a single custom property.
	pub fn with_custom<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.custom = self.custom.insert(key, value);
		self
	}
}

fn non_empty(value: &Option<String>) -> Option<&str> {
	value.as_deref().filter(|s| !s.is_empty())
}

impl Serialize for EventProperties {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(None)?;

		if let Some(insert_id) = non_empty(&self.insert_id) {
			map.serialize_entry(INSERT_ID, insert_id)?;
		}
		if let Some(distinct_id) = non_empty(&self.distinct_id) {
			map.serialize_entry(DISTINCT_ID, distinct_id)?;
		}
		if let Some(ip) = non_empty(&self.ip) {
			map.serialize_entry(IP, ip)?;
		}
		if let Some(time) = self.time {
			map.serialize_entry(TIME, &time.timestamp())?;
		}
		map.serialize_entry(TOKEN, &self.token)?;

		for (key, value) in self.custom.iter() {
			if RESERVED_PROPERTIES.contains(&key.as_str()) {
				warn!(key = %key, "custom event property shadows a reserved property, skipped");
				continue;
			}
			map.serialize_entry(key, value)?;
		}

		map.end()
	}
}

impl<'de> Deserialize<'de> for EventProperties {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let mut map = Map::<String, Value>::deserialize(deserializer)?;

		let insert_id = take_string::<D::Error>(&mut map, INSERT_ID)?;
		let distinct_id = take_string::<D::Error>(&mut map, DISTINCT_ID)?;
		let ip = take_string::<D::Error>(&mut map, IP)?;
		let time = take_time::<D::Error>(&mut map)?;
		let token = take_string::<D::Error>(&mut map, TOKEN)?.unwrap_or_default();

		Ok(Self {
			insert_id,
			distinct_id,
			ip,
			time,
			token,
			custom: CustomProperties::from(map),
		})
	}
}

fn take_string<E: de::Error>(map: &mut Map<String, Value>, key: &str) -> Result<Option<String>, E> {
	match map.remove(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(s)) if s.is_empty() => Ok(None),
		Some(Value::String(s)) => Ok(Some(s)),
		Some(other) => Err(E::custom(format_args!(
			"property `{key}`: invalid type: {}, expected a string",
			unexpected(&other)
		))),
	}
}

fn take_time<E: de::Error>(map: &mut Map<String, Value>) -> Result<Option<DateTime<Utc>>, E> {
	let value = match map.remove(TIME) {
		None | Some(Value::Null) => return Ok(None),
		Some(value) => value,
	};

	let secs = value.as_i64().ok_or_else(|| {
		E::custom(format_args!(
			"property `{TIME}`: invalid type: {}, expected unix seconds",
			unexpected(&value)
		))
	})?;

	if secs == 0 {
		return Ok(None);
	}

	DateTime::from_timestamp(secs, 0)
		.map(Some)
		.ok_or_else(|| E::custom(format_args!("property `{TIME}`: {secs} is out of range")))
}

fn unexpected(value: &Value) -> Unexpected<'_> {
	match value {
		Value::Null => Unexpected::Unit,
		Value::Bool(b) => Unexpected::Bool(*b),
		Value::Number(n) => {
			if let Some(i) = n.as_i64() {
				Unexpected::Signed(i)
			} else if let Some(u) = n.as_u64() {
				Unexpected::Unsigned(u)
			} else {
				Unexpected::Float(n.as_f64().unwrap_or_default())
			}
		}
		Value::String(s) => Unexpected::Str(s),
		Value::Array(_) => Unexpected::Seq,
		Value::Object(_) => Unexpected::Map,
	}
}
