//! Cloud controller workflow tests

use wiremock::matchers::{body_bytes, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use std::sync::Arc;
use std::time::Duration;

use deploy_models::ZoneId;
use vespa_deploy::http::client::HttpClient;
use vespa_deploy::target::cloud::CloudTarget;
use vespa_deploy::target::TargetType;
use vespa_deploy::{deploy, submit, DeployError, DeploymentOptions};

use crate::common::{
    application_zip, certified_zip, cloud_deployment, cloud_options, package, request_count,
    self_hosted_options, TEST_ZIP,
};

const DEPLOY_PATH: &str = "/application/v4/tenant/t1/application/a1/instance/i1/deploy/dev-us-north-1";
const SUBMIT_PATH: &str = "/application/v4/tenant/t1/application/a1/submit";

fn zone() -> ZoneId {
    ZoneId::new("dev", "us-north-1")
}

#[tokio::test]
async fn test_deploy_returns_run_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DEPLOY_PATH))
        .and(header("content-type", "application/zip"))
        .and(header("x-key-id", "t1:a1:i1"))
        .and(header_exists("x-authorization"))
        .and(header_exists("x-content-hash"))
        .and(header_exists("x-key"))
        .and(body_bytes(certified_zip()))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"run":7,"log":[{"time":1,"level":"info","message":"Deploying"}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let options = cloud_options(&server, TargetType::Cloud, zone(), &certified_zip());
    assert!(options.is_cloud());
    let result = deploy(&options).await.unwrap();
    assert_eq!(result.id, 7);
    assert_eq!(result.log_lines[0].message, "Deploying");
}

#[tokio::test]
async fn test_deploy_requires_zone() {
    let server = MockServer::start().await;
    let options = cloud_options(&server, TargetType::Cloud, ZoneId::new("dev", ""), &certified_zip());

    let err = deploy(&options).await.unwrap_err();
    assert!(matches!(err, DeployError::MissingZone(_)));
    assert_eq!(
        err.to_string(),
        "deployment of t1.a1.i1 in dev. to cloud: missing zone"
    );
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_deploy_requires_certificate_on_cloud() {
    let server = MockServer::start().await;
    let options = cloud_options(&server, TargetType::Cloud, zone(), &application_zip());

    let err = deploy(&options).await.unwrap_err();
    assert!(matches!(err, DeployError::MissingCertificate(_)));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_hosted_deploy_without_certificate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DEPLOY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"run":12}"#))
        .expect(1)
        .mount(&server)
        .await;

    let options = cloud_options(&server, TargetType::Hosted, zone(), &application_zip());
    assert_eq!(deploy(&options).await.unwrap().id, 12);
}

#[tokio::test]
async fn test_deploy_rejected_package() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DEPLOY_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            r#"{"error-code":"INVALID_APPLICATION_PACKAGE","message":"services.xml: line 3: bad"}"#,
        ))
        .mount(&server)
        .await;

    let options = cloud_options(&server, TargetType::Cloud, zone(), &certified_zip());
    let err = deploy(&options).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid application package (400 Bad Request)\nservices.xml:\nline 3:\nbad"
    );
}

#[tokio::test]
async fn test_deploy_gateway_error_is_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(DEPLOY_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let options = cloud_options(&server, TargetType::Cloud, zone(), &certified_zip());
    match deploy(&options).await.unwrap_err() {
        DeployError::Service { body, .. } => assert_eq!(body, "<html>bad gateway</html>"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_sends_signed_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .and(header("x-key-id", "t1:a1:i1"))
        .and(header_exists("x-authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"message":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let options = cloud_options(&server, TargetType::Cloud, zone(), &certified_zip());
    submit(&options).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let request = &requests[0];
    let content_type = request.headers.get("content-type").unwrap().to_str().unwrap();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();

    let body = String::from_utf8_lossy(&request.body);
    let options_part = body.find("name=\"submitOptions\"\r\n\r\n{}\r\n").unwrap();
    let application_part = body
        .find("name=\"applicationZip\"; filename=\"application.zip\"")
        .unwrap();
    let test_part = body
        .find("name=\"applicationTestZip\"; filename=\"application-test.zip\"")
        .unwrap();
    assert!(options_part < application_part && application_part < test_part);
    assert!(body.contains(std::str::from_utf8(TEST_ZIP).unwrap()));
    assert!(body.starts_with(&format!("--{}\r\n", boundary)));
    assert!(body.ends_with(&format!("--{}--\r\n", boundary)));
}

#[tokio::test]
async fn test_submit_requires_cloud_target() {
    let server = MockServer::start().await;
    let err = submit(&self_hosted_options(&server)).await.unwrap_err();
    assert!(matches!(err, DeployError::UnsupportedOperation { operation: "submit", .. }));
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_submit_requires_certificate_on_cloud() {
    let server = MockServer::start().await;
    let options = cloud_options(&server, TargetType::Cloud, zone(), &application_zip());
    let err = submit(&options).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "deployment of t1.a1.i1 in dev.us-north-1 to cloud: missing certificate in package"
    );
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_submit_error_names_submit_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let options = cloud_options(&server, TargetType::Hosted, zone(), &certified_zip());
    match submit(&options).await.unwrap_err() {
        DeployError::Service { service, .. } => assert_eq!(service, "submit service"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_hosted_submit_without_certificate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .and(header("x-key-id", "t1:a1:i1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"message":"ok"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let options = cloud_options(&server, TargetType::Hosted, zone(), &application_zip());
    submit(&options).await.unwrap();
}

#[tokio::test]
async fn test_cloud_requests_require_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"run":3}"#))
        .mount(&server)
        .await;

    for target_type in [TargetType::Cloud, TargetType::Hosted] {
        let target = CloudTarget::new(
            target_type,
            cloud_deployment(&server, zone()),
            None,
            HttpClient::new().unwrap(),
        )
        .unwrap();
        let options = DeploymentOptions::new(Arc::new(target), package(&certified_zip()), Duration::ZERO);

        let err = deploy(&options).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("signing error: no API key configured for {} target", target_type)
        );
        assert!(matches!(submit(&options).await, Err(DeployError::Signing(_))));
    }
    assert_eq!(request_count(&server).await, 0);
}
