//! Self-hosted config server workflow tests

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_bytes, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use deploy_models::ZoneId;
use vespa_deploy::http::client::HttpClient;
use vespa_deploy::target::custom::CustomTarget;
use vespa_deploy::target::TargetType;
use vespa_deploy::{activate, deploy, prepare, DeployError, DeploymentOptions};

use crate::common::{
    cloud_options, package, request_count, self_hosted_options, application_zip, certified_zip,
};

const SESSION_PATH: &str = "/application/v2/tenant/default/session";

#[tokio::test]
async fn test_prepare_uploads_and_prepares_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .and(header("content-type", "application/zip"))
        .and(body_bytes(application_zip()))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"session-id":"42","log":[{"time":1,"level":"info","message":"ok"}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/application/v2/tenant/default/session/42/prepared"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = prepare(&self_hosted_options(&server)).await.unwrap();
    assert_eq!(result.id, 42);
    assert_eq!(result.log_lines.len(), 1);
    assert_eq!(result.log_lines[0].level, "info");
}

#[tokio::test]
async fn test_prepare_surfaces_rejected_package() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"session-id":"5"}"#))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/application/v2/tenant/default/session/5/prepared"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error-code":"INVALID_APPLICATION_PACKAGE","message":"a: b: c"}"#,
        ))
        .mount(&server)
        .await;

    let err = prepare(&self_hosted_options(&server)).await.unwrap_err();
    match err {
        DeployError::InvalidPackage { status, message } => {
            assert_eq!(status, "400 Bad Request");
            assert_eq!(message, "a:\nb:\nc");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_prepare_stops_after_failed_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("out of disk"))
        .mount(&server)
        .await;

    let err = prepare(&self_hosted_options(&server)).await.unwrap_err();
    assert!(matches!(err, DeployError::Service { .. }));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_prepare_rejects_malformed_session_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SESSION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"session-id":"x1"}"#))
        .mount(&server)
        .await;

    let err = prepare(&self_hosted_options(&server)).await.unwrap_err();
    assert!(matches!(err, DeployError::MalformedResponse(_)));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_activate_session() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/application/v2/tenant/default/session/7/active"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    activate(7, &self_hosted_options(&server)).await.unwrap();
}

#[tokio::test]
async fn test_activate_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/application/v2/tenant/default/session/7/active"))
        .respond_with(ResponseTemplate::new(500).set_body_string(r#"{"message":"busy"}"#))
        .mount(&server)
        .await;

    let err = activate(7, &self_hosted_options(&server)).await.unwrap_err();
    let host = server.address().to_string();
    match err {
        DeployError::Service { service, host: error_host, status, body } => {
            assert_eq!(service, "deploy service");
            assert_eq!(error_host, host);
            assert_eq!(status, "500 Internal Server Error");
            assert_eq!(body, "{\n    \"message\": \"busy\"\n}");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_session_operations_unsupported_on_cloud() {
    let server = MockServer::start().await;
    for target_type in [TargetType::Cloud, TargetType::Hosted] {
        let options = cloud_options(
            &server,
            target_type,
            ZoneId::new("dev", "us-north-1"),
            &certified_zip(),
        );

        let err = prepare(&options).await.unwrap_err();
        assert!(matches!(err, DeployError::UnsupportedOperation { operation: "prepare", .. }));

        let err = activate(1, &options).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("activate is not supported with {} target", target_type)
        );
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_deploy_prepares_and_activates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/application/v2/tenant/default/prepareandactivate"))
        .and(header("content-type", "application/zip"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"session-id":"3"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let result = deploy(&self_hosted_options(&server)).await.unwrap();
    assert_eq!(result.id, 3);
    assert!(result.log_lines.is_empty());
}

#[tokio::test]
async fn test_deploy_accepts_non_json_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/application/v2/tenant/default/prepareandactivate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Deployed"))
        .mount(&server)
        .await;

    let result = deploy(&self_hosted_options(&server)).await.unwrap();
    assert_eq!(result.id, 0);
    assert!(result.log_lines.is_empty());
}

#[tokio::test]
async fn test_deploy_waits_for_config_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/application/v2/tenant/default/prepareandactivate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"session-id":"8"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let target = CustomTarget::new(&server.uri(), HttpClient::new().unwrap());
    let options = DeploymentOptions::new(
        Arc::new(target),
        package(&application_zip()),
        Duration::from_secs(5),
    );
    assert_eq!(deploy(&options).await.unwrap().id, 8);
}

#[tokio::test]
async fn test_deploy_fails_when_config_server_never_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status.html"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let target = CustomTarget::new(&server.uri(), HttpClient::new().unwrap());
    let options = DeploymentOptions::new(
        Arc::new(target),
        package(&application_zip()),
        Duration::from_millis(100),
    );
    let err = deploy(&options).await.unwrap_err();
    assert!(matches!(err, DeployError::TargetUnavailable(_)));
}

#[tokio::test]
async fn test_options_display() {
    let server = MockServer::start().await;
    let options = self_hosted_options(&server);
    assert!(!options.is_cloud());
    assert_eq!(
        options.to_string(),
        "deployment of default.application.default in . to custom"
    );
    let url = options.resolve_url("/application/v2/tenant/default/session").await.unwrap();
    assert_eq!(url.as_str(), format!("{}/application/v2/tenant/default/session", server.uri()));
}
