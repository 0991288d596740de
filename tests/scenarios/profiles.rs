use apicontract::scenario::own_profile::OwnProfile;
use apicontract::scenario::public_profile::PublicProfile;
use apicontract::scenario::{Outcome, Scenario};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    assert_failed_with, assert_passed, auth, context, BAD_TOKEN, FORBIDDEN_TOKEN, GOOD_TOKEN,
};

const PUBLIC: &str = r#"
public_profile:
  endpoint: "/users/{{ username }}"
  username: octocat
  wrong_username: wrong_user_name_09090909332
  items: [login, id, bio]
"#;

const OWN: &str = r#"
own_profile:
  endpoint: /user
  items: [login, id, private_gists]
"#;

async fn mount_public(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/users/octocat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/wrong_user_name_09090909332"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"message": "Not Found"})),
        )
        .mount(server)
        .await;
}

async fn mount_own(server: &MockServer, body: serde_json::Value) {
    // conditional request outranks the plain one
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", auth(GOOD_TOKEN).as_str()))
        .and(header("if-none-match", "\"etag-1\""))
        .respond_with(ResponseTemplate::new(304))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", auth(GOOD_TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"etag-1\"")
                .set_body_json(body),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", auth(BAD_TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", auth(FORBIDDEN_TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "Forbidden"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_public_profile_all_checks_pass() {
    let server = MockServer::start().await;
    mount_public(&server, json!({"login": "octocat", "id": 1, "bio": null})).await;

    let ctx = context(&server, false, PUBLIC);
    let report = PublicProfile.run(&ctx).await;

    assert_eq!(report.checks.len(), 3);
    assert_passed(&report, "response_200");
    assert_passed(&report, "response_404");
    assert_passed(&report, "response_items");
}

#[tokio::test]
async fn test_public_profile_login_mismatch_and_extra_field() {
    let server = MockServer::start().await;
    mount_public(
        &server,
        json!({"login": "someone-else", "id": 1, "bio": null, "extra": true}),
    )
    .await;

    let ctx = context(&server, false, PUBLIC);
    let report = PublicProfile.run(&ctx).await;

    assert_failed_with(&report, "response_200", "login");
    assert_passed(&report, "response_404");
    assert_failed_with(&report, "response_items", "unexpected [\"extra\"]");
}

#[tokio::test]
async fn test_missing_setting_fails_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(
        &server,
        false,
        "public_profile:\n  endpoint: \"/users/{{ username }}\"\n",
    );
    let report = PublicProfile.run(&ctx).await;

    assert_failed_with(&report, "response_200", "Missing setting `username`");
    assert_failed_with(&report, "response_404", "wrong_username");
    server.verify().await;
}

#[tokio::test]
async fn test_own_profile_all_checks_pass() {
    let server = MockServer::start().await;
    mount_own(
        &server,
        json!({"login": "me", "id": 7, "private_gists": 0}),
    )
    .await;

    let ctx = context(&server, true, OWN);
    let report = OwnProfile.run(&ctx).await;

    for check in [
        "response_200",
        "response_401",
        "response_304",
        "response_403",
        "response_items",
    ] {
        assert_passed(&report, check);
    }
}

#[tokio::test]
async fn test_own_profile_forbidden_check_skipped_without_token() {
    let server = MockServer::start().await;
    mount_own(
        &server,
        json!({"login": "me", "id": 7, "private_gists": 0}),
    )
    .await;

    let ctx = context(&server, false, OWN);
    let report = OwnProfile.run(&ctx).await;

    assert!(matches!(
        report.outcome("response_403"),
        Some(Outcome::Skipped(_))
    ));
    assert_eq!(report.failed(), 0);
}

#[tokio::test]
async fn test_own_profile_missing_private_fields_fails_items() {
    let server = MockServer::start().await;
    mount_own(&server, json!({"login": "me", "id": 7})).await;

    let ctx = context(&server, true, OWN);
    let report = OwnProfile.run(&ctx).await;

    assert_passed(&report, "response_200");
    assert_failed_with(&report, "response_items", "missing [\"private_gists\"]");
}

#[tokio::test]
async fn test_own_profile_without_etag_fails_304_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"login": "me"})),
        )
        .mount(&server)
        .await;

    let ctx = context(&server, false, OWN);
    let report = OwnProfile.run(&ctx).await;

    assert_failed_with(&report, "response_304", "ETag");
    // 200 for a bad token is a contract violation
    assert_failed_with(&report, "response_401", "Expected status code 401, but got 200");
}
