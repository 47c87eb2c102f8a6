// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP utilities for the Mixpanel ingestion crates.
//!
//! Provides the `reqwest` client the ingestion client sends with by default,
//! identified by a `mixpanel-ingestion/{version} ({platform})` User-Agent.

mod client;

pub use client::{builder, builder_with_user_agent, new_client, platform, user_agent};
