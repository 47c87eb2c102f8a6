// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Arbitrary key/value metadata attached to events and profile updates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A builder for the custom part of event properties, and for the value maps
/// carried by profile mutations.
///
/// # Example
///
/// ```
/// use mixpanel_ingestion_core::CustomProperties;
///
/// let props = CustomProperties::new()
///     .insert("plan", "premium")
///     .insert("seats", 12)
///     .insert("trial", false);
/// assert_eq!(props.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomProperties {
	inner: Map<String, Value>,
}

impl CustomProperties {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a property. A later insert with the same key overwrites.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<Value>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Adds every property of `other`, overwriting on key collisions.
	pub fn merge(mut self, other: CustomProperties) -> Self {
		self.inner.extend(other.inner);
		self
	}

	/// Removes a key, returning its value if it was present.
	pub fn remove(&mut self, key: &str) -> Option<Value> {
		self.inner.remove(key)
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.inner.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.inner.contains_key(key)
	}

	/// Iterates over the properties in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.inner.iter()
	}

	/// The properties as a JSON object.
	pub fn into_value(self) -> Value {
		Value::Object(self.inner)
	}
}

impl From<CustomProperties> for Value {
	fn from(props: CustomProperties) -> Self {
		props.into_value()
	}
}

impl From<Map<String, Value>> for CustomProperties {
	fn from(inner: Map<String, Value>) -> Self {
		Self { inner }
	}
}

impl From<CustomProperties> for Map<String, Value> {
	fn from(props: CustomProperties) -> Self {
		props.inner
	}
}

impl<K, V> FromIterator<(K, V)> for CustomProperties
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			inner: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl IntoIterator for CustomProperties {
	type Item = (String, Value);
	type IntoIter = serde_json::map::IntoIter;

	fn into_iter(self) -> Self::IntoIter {
		self.inner.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_default_has_no_entries() {
		let props = CustomProperties::default();
		assert_eq!(props.iter().count(), 0);
		assert_eq!(props.into_value(), json!({}));
	}

	#[test]
	fn test_builder_accepts_json_convertible_values() {
		let props = CustomProperties::new()
			.insert("plan", "premium")
			.insert("seats", 12)
			.insert("trial", false)
			.insert("ratio", 0.5)
			.insert("roles", json!(["admin", "billing"]));

		assert_eq!(
			props.into_value(),
			json!({
				"plan": "premium",
				"seats": 12,
				"trial": false,
				"ratio": 0.5,
				"roles": ["admin", "billing"],
			})
		);
	}

	#[test]
	fn test_merge_overwrites_collisions() {
		let base = CustomProperties::new()
			.insert("country", "UK")
			.insert("city", "Leeds");
		let update = CustomProperties::new()
			.insert("city", "London")
			.insert("age", 49);

		let merged = base.merge(update);
		assert_eq!(
			Value::from(merged),
			json!({"country": "UK", "city": "London", "age": 49})
		);
	}

	#[test]
	fn test_remove_returns_previous_value() {
		let mut props = CustomProperties::new().insert("counter", 2);
		assert_eq!(props.remove("counter"), Some(json!(2)));
		assert!(props.remove("counter").is_none());
		assert!(!props.contains_key("counter"));
	}

	#[test]
	fn test_wire_form_is_plain_object() {
		let props = CustomProperties::new().insert("city", "London");
		assert_eq!(serde_json::to_string(&props).unwrap(), r#"{"city":"London"}"#);

		let back: CustomProperties = serde_json::from_str(r#"{"city":"London"}"#).unwrap();
		assert_eq!(back, props);
		assert!(serde_json::from_str::<CustomProperties>(r#"["city"]"#).is_err());
	}

	#[test]
	fn test_collect_and_iterate_in_key_order() {
		let props: CustomProperties = [("b", 2), ("a", 1)].into_iter().collect();
		let keys: Vec<String> = props.into_iter().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["a", "b"]);
	}

	proptest! {
		#[test]
		fn last_insert_wins(key in "[a-z]{1,10}", first in any::<i64>(), second in any::<i64>()) {
			let props = CustomProperties::new()
				.insert(key.clone(), first)
				.insert(key.clone(), second);
			prop_assert_eq!(props.len(), 1);
			prop_assert_eq!(props.get(&key), Some(&Value::from(second)));
		}

		#[test]
		fn map_conversion_is_lossless(
			entries in proptest::collection::btree_map("[a-z]{1,10}", "[a-zA-Z0-9 ]{0,20}", 0..10),
		) {
			let props: CustomProperties = entries.clone().into_iter().collect();
			let map = Map::from(props.clone());
			prop_assert_eq!(map.len(), entries.len());
			prop_assert_eq!(CustomProperties::from(map), props);
		}
	}
}
