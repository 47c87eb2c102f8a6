// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Mixpanel Ingestion API.
//!
//! This crate has no I/O. It models the two payload families the API accepts
//! and turns them into the URL-encoded form bodies the API expects:
//!
//! - [`EventData`] / [`EventProperties`]: event tracking (`/track`)
//! - [`ProfileMutation`] and its variants: user profile updates (`/engage`)
//! - [`IngestionForm`] / [`FormOptions`]: the `data` field plus optional
//!   response-shaping flags

pub mod event;
pub mod form;
pub mod profile;
pub mod properties;

pub use event::{EventData, EventProperties, RESERVED_PROPERTIES};
pub use form::{FormError, FormOptions, IngestionForm, ResponseMode, MAX_BATCH_SIZE};
pub use profile::{
	ListAppend, ListRemove, NumberAdd, ProfileMutation, ProfileOperation, Set, SetOnce, Unset,
};
pub use properties::CustomProperties;
