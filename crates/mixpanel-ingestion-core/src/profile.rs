// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User profile mutation payloads for the Engage endpoints.
//!
//! Each operation has its own payload struct carrying the project token, the
//! user's distinct ID and an operation-specific value map (or, for unset, a
//! list of property names). [`ProfileMutation`] wraps exactly one of them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::properties::CustomProperties;

/// Sets profile properties, creating the profile if needed and overwriting
/// existing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Set {
	#[serde(rename = "$token")]
	pub token: String,
	#[serde(rename = "$distinct_id")]
	pub distinct_id: String,
	#[serde(rename = "$set")]
	pub set: CustomProperties,
}

/// Sets profile properties only if they are not already present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetOnce {
	#[serde(rename = "$token")]
	pub token: String,
	#[serde(rename = "$distinct_id")]
	pub distinct_id: String,
	#[serde(rename = "$set_once")]
	pub set_once: CustomProperties,
}

/// Increments (or decrements, with negative values) numeric profile
/// properties. Missing properties are treated as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberAdd {
	#[serde(rename = "$token")]
	pub token: String,
	#[serde(rename = "$distinct_id")]
	pub distinct_id: String,
	#[serde(rename = "$add")]
	pub add: CustomProperties,
}

/// Appends values to list profile properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListAppend {
	#[serde(rename = "$token")]
	pub token: String,
	#[serde(rename = "$distinct_id")]
	pub distinct_id: String,
	#[serde(rename = "$append")]
	pub append: CustomProperties,
}

/// Removes values from list profile properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListRemove {
	#[serde(rename = "$token")]
	pub token: String,
	#[serde(rename = "$distinct_id")]
	pub distinct_id: String,
	#[serde(rename = "$remove")]
	pub remove: CustomProperties,
}

/// Removes properties from a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Unset {
	#[serde(rename = "$token")]
	pub token: String,
	#[serde(rename = "$distinct_id")]
	pub distinct_id: String,
	#[serde(rename = "$unset")]
	pub unset: Vec<String>,
}

macro_rules! mutation_constructor {
	($ty:ident, $field:ident, $value:ty) => {
		impl $ty {
			/// Creates the payload for the given project token and user.
			pub fn new(token: impl Into<String>, distinct_id: impl Into<String>, $field: $value) -> Self {
				Self {
					token: token.into(),
					distinct_id: distinct_id.into(),
					$field,
				}
			}
		}

		impl From<$ty> for ProfileMutation {
			fn from(value: $ty) -> Self {
				ProfileMutation::$ty(value)
			}
		}
	};
}

mutation_constructor!(Set, set, CustomProperties);
mutation_constructor!(SetOnce, set_once, CustomProperties);
mutation_constructor!(NumberAdd, add, CustomProperties);
mutation_constructor!(ListAppend, append, CustomProperties);
mutation_constructor!(ListRemove, remove, CustomProperties);
mutation_constructor!(Unset, unset, Vec<String>);

/// One profile update. The wire form is the inner payload object; the
/// operation is identified by its `$set`/`$set_once`/... key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileMutation {
	Set(Set),
	SetOnce(SetOnce),
	NumberAdd(NumberAdd),
	ListAppend(ListAppend),
	ListRemove(ListRemove),
	Unset(Unset),
}

impl ProfileMutation {
	/// Returns which operation this mutation performs.
	pub fn operation(&self) -> ProfileOperation {
		match self {
			ProfileMutation::Set(_) => ProfileOperation::Set,
			ProfileMutation::SetOnce(_) => ProfileOperation::SetOnce,
			ProfileMutation::NumberAdd(_) => ProfileOperation::Add,
			ProfileMutation::ListAppend(_) => ProfileOperation::Append,
			ProfileMutation::ListRemove(_) => ProfileOperation::Remove,
			ProfileMutation::Unset(_) => ProfileOperation::Unset,
		}
	}

	pub fn token(&self) -> &str {
		match self {
			ProfileMutation::Set(m) => &m.token,
			ProfileMutation::SetOnce(m) => &m.token,
			ProfileMutation::NumberAdd(m) => &m.token,
			ProfileMutation::ListAppend(m) => &m.token,
			ProfileMutation::ListRemove(m) => &m.token,
			ProfileMutation::Unset(m) => &m.token,
		}
	}

	pub fn distinct_id(&self) -> &str {
		match self {
			ProfileMutation::Set(m) => &m.distinct_id,
			ProfileMutation::SetOnce(m) => &m.distinct_id,
			ProfileMutation::NumberAdd(m) => &m.distinct_id,
			ProfileMutation::ListAppend(m) => &m.distinct_id,
			ProfileMutation::ListRemove(m) => &m.distinct_id,
			ProfileMutation::Unset(m) => &m.distinct_id,
		}
	}
}

/// Tag for the six profile operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileOperation {
	Set,
	SetOnce,
	Add,
	Append,
	Remove,
	Unset,
}

impl ProfileOperation {
	pub fn as_str(&self) -> &'static str {
		match self {
			ProfileOperation::Set => "set",
			ProfileOperation::SetOnce => "set_once",
			ProfileOperation::Add => "add",
			ProfileOperation::Append => "append",
			ProfileOperation::Remove => "remove",
			ProfileOperation::Unset => "unset",
		}
	}
}

impl fmt::Display for ProfileOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
