// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire-level tests against a local mock server.

use std::time::Duration;

use mixpanel_ingestion::{
	CustomProperties, ErrorKind, EventData, EventProperties, IngestionClient, NumberAdd,
	ProfileMutation, Set, Unset,
};
use serde_json::Value;
use url::form_urlencoded;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORM: &str = "application/x-www-form-urlencoded";

fn event(name: &str) -> EventData {
	EventData::new(name, "project-token").with_properties(
		EventProperties::new("project-token")
			.with_insert_id(format!("{name}-insert"))
			.with_distinct_id("john@smith.tech")
			.with_custom("city", "London"),
	)
}

fn verbose_ok() -> ResponseTemplate {
	ResponseTemplate::new(200).set_body_raw(r#"{"status":1,"error":null}"#, "application/json")
}

fn data_field(body: &[u8]) -> Value {
	let data = form_urlencoded::parse(body)
		.find(|(k, _)| k == "data")
		.map(|(_, v)| v.into_owned())
		.unwrap();
	serde_json::from_str(&data).unwrap()
}

async fn client(server: &MockServer) -> IngestionClient {
	IngestionClient::new(server.uri()).unwrap()
}

#[tokio::test]
async fn track_posts_form_to_track_path() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/track"))
		.and(header("content-type", FORM))
		.and(body_string_contains("verbose=1"))
		.respond_with(verbose_ok())
		.expect(1)
		.mount(&server)
		.await;

	client(&server).await.track(&event("login")).await.unwrap();

	let requests = server.received_requests().await.unwrap();
	let request = &requests[0];
	let accept: Vec<_> = request
		.headers
		.get_all("accept")
		.iter()
		.map(|v| v.to_str().unwrap().to_string())
		.collect();
	assert_eq!(accept, vec!["text/plain", "application/json"]);
	assert!(request
		.headers
		.get("user-agent")
		.unwrap()
		.to_str()
		.unwrap()
		.starts_with("mixpanel-ingestion/"));
	assert_eq!(
		request.headers.get("content-length").unwrap().to_str().unwrap(),
		request.body.len().to_string()
	);

	let data = data_field(&request.body);
	assert_eq!(data["event"], "login");
	assert_eq!(data["properties"]["$insert_id"], "login-insert");
	assert_eq!(data["properties"]["city"], "London");
}

#[tokio::test]
async fn empty_user_agent_sends_no_header() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(verbose_ok())
		.expect(1)
		.mount(&server)
		.await;

	let client = IngestionClient::builder()
		.server_url(server.uri())
		.user_agent("")
		.build()
		.unwrap();
	client.track(&event("anonymous")).await.unwrap();

	let requests = server.received_requests().await.unwrap();
	assert!(requests[0].headers.get("user-agent").is_none());
}

#[tokio::test]
async fn custom_user_agent_sent_once() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(verbose_ok())
		.expect(1)
		.mount(&server)
		.await;

	let client = IngestionClient::builder()
		.server_url(server.uri())
		.user_agent("billing-service/2.1")
		.build()
		.unwrap();
	client.track(&event("invoice")).await.unwrap();

	let requests = server.received_requests().await.unwrap();
	let agents: Vec<_> = requests[0]
		.headers
		.get_all("user-agent")
		.iter()
		.map(|v| v.to_str().unwrap().to_string())
		.collect();
	assert_eq!(agents, vec!["billing-service/2.1"]);
}

#[tokio::test]
async fn plain_text_answers() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/track"))
		.respond_with(ResponseTemplate::new(200).set_body_raw("1", "text/plain"))
		.up_to_n_times(1)
		.mount(&server)
		.await;
	Mock::given(method("POST"))
		.and(path("/track"))
		.respond_with(ResponseTemplate::new(200).set_body_raw("0", "text/plain"))
		.mount(&server)
		.await;

	let client = client(&server).await;
	client.track(&event("first")).await.unwrap();
	let err = client.track(&event("second")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidResponseData);
}

#[tokio::test]
async fn verbose_failure_carries_message() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/track"))
		.respond_with(
			ResponseTemplate::new(200)
				.set_body_raw(r#"{"status":0,"error":"bad token"}"#, "application/json"),
		)
		.mount(&server)
		.await;

	let err = client(&server)
		.await
		.track_deduplicate(&event("login"))
		.await
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidResponseData);
	assert!(err.to_string().contains("bad token"));
}

#[tokio::test]
async fn forbidden_is_request_failed() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/engage"))
		.respond_with(
			ResponseTemplate::new(403)
				.set_body_raw(r#"{"status":"error","error":"invalid token"}"#, "application/json"),
		)
		.mount(&server)
		.await;

	let set = Set::new("bad", "user", CustomProperties::new().insert("plan", "pro"));
	let err = client(&server).await.set(set).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::RequestFailed);
	assert_eq!(err.status(), Some(403));
	assert!(err.to_string().contains("invalid token"));
}

#[tokio::test]
async fn unauthorized_without_message_is_request_failed() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/track"))
		.respond_with(
			ResponseTemplate::new(401).set_body_raw(r#"{"status":"error"}"#, "application/json"),
		)
		.mount(&server)
		.await;

	let err = client(&server).await.track(&event("login")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::RequestFailed);
	assert_eq!(err.status(), Some(401));
	assert!(err.to_string().contains("error details not provided"));
}

#[tokio::test]
async fn server_error_is_invalid_content() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(ResponseTemplate::new(500).set_body_raw("boom", "text/html"))
		.mount(&server)
		.await;

	let err = client(&server).await.track(&event("login")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidResponseContent);
	assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn track_batch_sends_json_array() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/track"))
		.respond_with(verbose_ok())
		.expect(1)
		.mount(&server)
		.await;

	let events: Vec<EventData> = (0..3).map(|i| event(&format!("e{i}"))).collect();
	client(&server).await.track_batch(&events).await.unwrap();

	let requests = server.received_requests().await.unwrap();
	let data = data_field(&requests[0].body);
	let items = data.as_array().unwrap();
	assert_eq!(items.len(), 3);
	assert_eq!(items[2]["event"], "e2");
}

#[tokio::test]
async fn oversized_batch_never_reaches_server() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(verbose_ok())
		.expect(0)
		.mount(&server)
		.await;

	let events = vec![event("e"); 51];
	let err = client(&server).await.track_batch(&events).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[tokio::test]
async fn engage_batch_mixes_operations() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.and(path("/engage"))
		.respond_with(verbose_ok())
		.expect(1)
		.mount(&server)
		.await;

	let batch: Vec<ProfileMutation> = vec![
		NumberAdd::new("t", "user", CustomProperties::new().insert("logins", 1)).into(),
		Unset::new("t", "user", vec!["trial".to_string()]).into(),
	];
	client(&server).await.engage_batch(&batch).await.unwrap();

	let requests = server.received_requests().await.unwrap();
	let data = data_field(&requests[0].body);
	assert_eq!(data[0]["$add"]["logins"], 1);
	assert_eq!(data[1]["$unset"][0], "trial");
}

#[tokio::test]
async fn request_timeout_is_transport_error() {
	let server = MockServer::start().await;
	Mock::given(method("POST"))
		.respond_with(verbose_ok().set_delay(Duration::from_millis(500)))
		.mount(&server)
		.await;

	let client = IngestionClient::builder()
		.server_url(server.uri())
		.request_timeout(Duration::from_millis(50))
		.build()
		.unwrap();
	let err = client.track(&event("slow")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
	let client = IngestionClient::new("http://127.0.0.1:1").unwrap();
	let err = client.track(&event("login")).await.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Transport);
}
