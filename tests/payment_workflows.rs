//! End-to-end tests for the moneta payment workflows.
//!
//! These tests run the real HTTP client against a local mock server.

use moneta::http::{HttpClient, HttpClientConfig};
use moneta::prelude::*;
use moneta::{ProcessExternalPayment, SavedStateRecord};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIRST_FORM: &str = r#"{
    "title": "Mobile top-up",
    "hidden_fields": {"scid": "923"},
    "form": [
        {"type": "tel", "name": "phone", "required": true},
        {"type": "amount", "name": "sum", "required": true, "min": 10, "max": 15000, "step": 0.01},
        {"type": "submit", "label": "Continue"}
    ]
}"#;

const SECOND_FORM: &str = r#"{
    "title": "Confirm",
    "form": [{"type": "checkbox", "name": "agree", "required": true}]
}"#;

fn api_client(server: &MockServer) -> ApiClient {
    let transport = Arc::new(HttpClient::new(HttpClientConfig::default()).unwrap());
    let config = ClientConfig::builder()
        .money_api(format!("{}/api", server.uri()))
        .web_host(server.uri())
        .instance_id("instance-1")
        .build()
        .unwrap();
    ApiClient::new(transport, config)
}

// =============================================================================
// Showcase Wizard
// =============================================================================

#[tokio::test]
async fn test_showcase_wizard_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/showcase/923"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/json")
                .insert_header("Last-Modified", "Wed, 01 May 2024 12:00:00 GMT")
                .set_body_string(FIRST_FORM),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/submit/1"))
        .and(header("if-modified-since", "Wed, 01 May 2024 12:00:00 GMT"))
        .and(body_string_contains("scid=923"))
        .and(body_string_contains("sum=100.50"))
        .respond_with(
            ResponseTemplate::new(300)
                .insert_header("Location", "/submit/2")
                .set_body_string(SECOND_FORM),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/submit/2"))
        .and(body_string_contains("agree=true"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"params": {"pattern_id": "923", "sum": "100.50"}}"#),
        )
        .mount(&server)
        .await;

    let client = api_client(&server);
    let resource = client.execute(FetchShowcase::new(923)).await.unwrap();
    assert_eq!(resource.content_type.as_deref(), Some("application/json"));

    let submit_url = format!("{}/submit/1", server.uri());
    let mut context = ShowcaseContext::from_resource(resource, submit_url, &SystemClock);

    let step = context.current_step_mut().unwrap();
    assert!(!step.showcase.is_valid());
    step.showcase.form.set_value("phone", "79001234567");
    step.showcase.form.set_value("sum", "100.50");
    assert!(step.showcase.is_valid());

    assert_eq!(context.submit(&client).await.unwrap(), ShowcaseState::HasNextStep);
    assert_eq!(context.history_size(), 1);
    assert_eq!(
        context.current_step().unwrap().submit_url,
        format!("{}/submit/2", server.uri())
    );

    let step = context.current_step_mut().unwrap();
    step.showcase.form.set_value("agree", "true");

    assert_eq!(context.submit(&client).await.unwrap(), ShowcaseState::Completed);
    assert_eq!(context.params().get("sum"), Some("100.50"));

    context.pop_step();
    assert_eq!(context.state(), ShowcaseState::HasNextStep);
    assert!(context.params().is_empty());
    assert_eq!(context.history_size(), 1);
}

#[tokio::test]
async fn test_showcase_not_found_leaves_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = api_client(&server);
    let mut context = ShowcaseContext::new(
        Showcase::new("Empty", Group::default()),
        format!("{}/gone", server.uri()),
        chrono::Utc::now(),
    );

    let err = context.submit(&client).await.unwrap_err();
    assert!(matches!(err, PaymentError::ResourceNotFound { .. }));
    assert_eq!(context.state(), ShowcaseState::Unknown);
    assert_eq!(context.history_size(), 0);
}

// =============================================================================
// External Payment Process
// =============================================================================

#[tokio::test]
async fn test_external_payment_with_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/request-external-payment"))
        .and(body_string_contains("instance_id=instance-1"))
        .and(body_string_contains("pattern_id=923"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status": "success", "request_id": "req-7", "contract_amount": "100.50"}"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/process-external-payment"))
        .and(body_string_contains("request_id=req-7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"status": "ext_auth_required", "acs_uri": "https://bank.test/3ds", "next_retry": 10}"#,
        ))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/process-external-payment"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"status": "in_progress", "next_retry": 10}"#),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/process-external-payment"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"status": "success", "invoice_id": "inv-1"}"#),
        )
        .mount(&server)
        .await;

    let client = api_client(&server);
    let parameters = ExternalPaymentParameters {
        pattern_id: "923".to_string(),
        payment_parameters: ParameterMap::new().with("sum", "100.50"),
        ext_auth_success_uri: "app://success".to_string(),
        ext_auth_fail_uri: "app://fail".to_string(),
        ..Default::default()
    };
    let flow = ExternalPaymentFlow::from_config(client, parameters).unwrap();
    let mut process = PaymentProcess::new(flow);

    assert!(!process.proceed().await.unwrap());
    assert_eq!(process.state(), ProcessState::Started);

    // First external authorization hands control back to the caller
    assert!(!process.proceed().await.unwrap());
    assert_eq!(process.state(), ProcessState::Processing);
    let pending = process.process_payment().unwrap();
    assert_eq!(pending.acs_uri.as_deref(), Some("https://bank.test/3ds"));

    // Persist and resume in a fresh process
    let record = SavedStateRecord::from(process.saved_state());
    let json = serde_json::to_string(&record).unwrap();
    let record: SavedStateRecord<moneta::RequestExternalPayment, ProcessExternalPayment> =
        serde_json::from_str(&json).unwrap();
    assert_eq!(record.flags, 2);

    let client = api_client(&server);
    let flow = ExternalPaymentFlow::from_config(client, process.flow().provider().clone()).unwrap();
    let mut resumed = PaymentProcess::new(flow);
    resumed.restore_saved_state(record.try_into().unwrap());

    assert!(resumed.proceed().await.unwrap());
    let done = resumed.process_payment().unwrap();
    assert_eq!(done.status, ProcessStatus::Success);
    assert_eq!(done.invoice_id.as_deref(), Some("inv-1"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 4);
}

#[tokio::test]
async fn test_unauthorized_request_maps_to_invalid_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/request-external-payment"))
        .respond_with(
            ResponseTemplate::new(401).insert_header("WWW-Authenticate", "Bearer error=\"invalid_token\""),
        )
        .mount(&server)
        .await;

    let client = api_client(&server);
    let parameters = ExternalPaymentParameters {
        pattern_id: "p2p".to_string(),
        payment_parameters: ParameterMap::new().with("to", "4100175017397"),
        ..Default::default()
    };
    let mut process = PaymentProcess::new(ExternalPaymentFlow::from_config(client, parameters).unwrap());

    let err = process.proceed().await.unwrap_err();
    assert!(matches!(err, PaymentError::InvalidToken(_)));
    assert_eq!(process.state(), ProcessState::Created);
}
