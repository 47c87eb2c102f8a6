// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Checks that every request the client sends conforms to the embedded
//! OpenAPI description, and that payloads conform to the JSON schemas.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use mixpanel_assets::{ingestion_spec, validate_engage_json, validate_event_json};
use mixpanel_ingestion::{
	CustomProperties, EventData, EventProperties, FormOptions, HttpTransport, IngestionClient,
	IngestionForm, ListAppend, ListRemove, NumberAdd, ProfileMutation, Set, SetOnce, Unset,
	EU_SERVER_URL,
};
use proptest::prelude::*;
use reqwest::{Request, Response};
use url::Url;

struct Recorded {
	url: Url,
	content_type: String,
	body: Vec<u8>,
}

/// Records every request and answers with a verbose success.
#[derive(Default)]
struct RecordingTransport {
	requests: Mutex<Vec<Recorded>>,
}

#[async_trait]
impl HttpTransport for RecordingTransport {
	async fn execute(&self, request: Request) -> Result<Response, reqwest::Error> {
		let content_type = request
			.headers()
			.get(reqwest::header::CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
			.unwrap_or_default()
			.to_string();
		let body = request
			.body()
			.and_then(|b| b.as_bytes())
			.map(|b| b.to_vec())
			.unwrap_or_default();
		self.requests.lock().unwrap().push(Recorded {
			url: request.url().clone(),
			content_type,
			body,
		});

		let response = http::Response::builder()
			.status(200)
			.header("Content-Type", "application/json")
			.body(r#"{"status":1,"error":null}"#)
			.unwrap();
		Ok(Response::from(response))
	}
}

fn setup() -> (IngestionClient, Arc<RecordingTransport>) {
	let transport = Arc::new(RecordingTransport::default());
	let client = IngestionClient::builder()
		.server_url(EU_SERVER_URL)
		.shared_transport(transport.clone())
		.build()
		.unwrap();
	(client, transport)
}

fn assert_conforms(transport: &RecordingTransport) {
	let spec = ingestion_spec().unwrap();
	let requests = transport.requests.lock().unwrap();
	assert!(!requests.is_empty());
	for request in requests.iter() {
		let result = spec.validate_form(&request.url, &request.content_type, &request.body);
		assert!(result.is_ok(), "{}: {result:?}", request.url);
	}
}

fn event(name: &str) -> EventData {
	EventData::new(name, "project-token").with_properties(
		EventProperties::new("project-token")
			.with_random_insert_id()
			.with_distinct_id("account@server.com")
			.with_ip("127.0.0.1")
			.with_time(Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap())
			.with_custom("role", "manager")
			.with_custom("age", 49)
			.with_custom("verified", true),
	)
}

fn props() -> CustomProperties {
	CustomProperties::new().insert("counter", 1)
}

#[tokio::test]
async fn track_requests_conform() {
	let (client, transport) = setup();

	client.track(&event("live")).await.unwrap();
	client.track_deduplicate(&event("dedup")).await.unwrap();
	client
		.track_with_options(
			&event("pixel"),
			FormOptions::verbose().with_ip_as_distinct_id(true).with_image(true),
		)
		.await
		.unwrap();
	client
		.track_with_options(&event("jump"), FormOptions::default().with_redirect("https://example.com"))
		.await
		.unwrap();
	client
		.track_with_options(&event("js"), FormOptions::default().with_callback("handle"))
		.await
		.unwrap();

	assert_conforms(&transport);
}

#[tokio::test]
async fn track_batch_conforms() {
	let (client, transport) = setup();
	let events: Vec<EventData> = (0..50).map(|i| event(&format!("past-{i}"))).collect();

	client.track_batch(&events).await.unwrap();
	client.track_batch(&events[..1]).await.unwrap();

	assert_conforms(&transport);
}

#[tokio::test]
async fn profile_requests_conform() {
	let (client, transport) = setup();

	client.set(Set::new("t", "d", props())).await.unwrap();
	client.set_once(SetOnce::new("t", "d", props())).await.unwrap();
	client.add(NumberAdd::new("t", "d", props())).await.unwrap();
	client.append(ListAppend::new("t", "d", props())).await.unwrap();
	client.remove(ListRemove::new("t", "d", props())).await.unwrap();
	client
		.unset(Unset::new("t", "d", vec!["counter".to_string()]))
		.await
		.unwrap();

	let batch: Vec<ProfileMutation> = vec![
		Set::new("t", "d", props()).into(),
		NumberAdd::new("t", "d", props()).into(),
		Unset::new("t", "d", vec!["counter".to_string()]).into(),
	];
	client.engage_batch(&batch).await.unwrap();

	assert_conforms(&transport);
}

#[tokio::test]
async fn non_conforming_payload_detected() {
	let (client, transport) = setup();

	let mut bad = event("bad-ip");
	bad.properties.ip = Some("127:0:1:1".to_string());
	client.track(&bad).await.unwrap();

	let spec = ingestion_spec().unwrap();
	let requests = transport.requests.lock().unwrap();
	let request = &requests[0];
	assert!(spec
		.validate_form(&request.url, &request.content_type, &request.body)
		.is_err());
}

fn custom_value() -> impl Strategy<Value = serde_json::Value> {
	prop_oneof![
		any::<bool>().prop_map(serde_json::Value::from),
		any::<i64>().prop_map(serde_json::Value::from),
		"[a-zA-Z0-9 ]{0,24}".prop_map(serde_json::Value::from),
	]
}

proptest! {
	#[test]
	fn event_payloads_match_event_schema(
		name in "[a-z_]{1,16}",
		distinct_id in proptest::option::of("[a-z0-9@.]{1,24}"),
		seconds in 1i64..4_000_000_000,
		custom in proptest::collection::btree_map("[a-z][a-z_]{0,11}", custom_value(), 0..8),
	) {
		let mut properties = EventProperties::new("token")
			.with_time(Utc.timestamp_opt(seconds, 0).unwrap());
		if let Some(id) = distinct_id {
			properties = properties.with_distinct_id(id);
		}
		for (key, value) in custom {
			properties = properties.with_custom(key, value);
		}
		let event = EventData::new(name, "token").with_properties(properties);

		let form = IngestionForm::event(&event, FormOptions::verbose()).unwrap();
		prop_assert!(validate_event_json(form.data().as_bytes()).is_ok());
	}

	#[test]
	fn set_payloads_match_engage_schema(
		custom in proptest::collection::btree_map("[a-z]{1,12}", custom_value(), 1..8),
	) {
		let properties: CustomProperties = custom.into_iter().collect();
		let mutation: ProfileMutation = Set::new("t", "d", properties).into();

		let form = IngestionForm::profile(&mutation, FormOptions::verbose()).unwrap();
		prop_assert!(validate_engage_json(form.data().as_bytes()).is_ok());
	}
}
