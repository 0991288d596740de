use apicontract::scenario::profile_update::ProfileUpdate;
use apicontract::scenario::Scenario;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{assert_failed_with, assert_passed, auth, context, BAD_TOKEN, GOOD_TOKEN};

const UPDATE: &str = r#"
profile_update:
  endpoint: /user
  new_name: X
  new_bio: Y
  new_blog: Z
"#;

async fn mount_profile(server: &MockServer, profile: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("if-none-match", "\"p1\""))
        .respond_with(ResponseTemplate::new(304))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", auth(GOOD_TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"p1\"")
                .set_body_json(profile),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", auth(BAD_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/user"))
        .and(|req: &wiremock::Request| !req.headers.contains_key("authorization"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Requires authentication"})),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_update_then_read_back() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/user"))
        .and(header("authorization", auth(GOOD_TOKEN).as_str()))
        .and(body_json(json!({"name": "X", "bio": "Y", "blog": "Z"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "X", "bio": "Y", "blog": "Z"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_profile(&server, json!({"login": "me", "name": "X", "bio": "Y", "blog": "Z"})).await;

    let ctx = context(&server, false, UPDATE);
    let report = ProfileUpdate.run(&ctx).await;

    assert_passed(&report, "response_200");
    assert_passed(&report, "response_401");
    assert_passed(&report, "response_304");
    assert_passed(&report, "update_profile");
    assert_passed(&report, "unauthorized_update");
    assert_eq!(report.skipped(), 1);
    server.verify().await;
}

#[tokio::test]
async fn test_update_not_reflected_fails() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/user"))
        .and(header("authorization", auth(GOOD_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    // stale read: blog never changed
    mount_profile(&server, json!({"login": "me", "name": "X", "bio": "Y", "blog": "old"})).await;

    let ctx = context(&server, false, UPDATE);
    let report = ProfileUpdate.run(&ctx).await;

    assert_failed_with(&report, "update_profile", "Field `blog` mismatch");
}

#[tokio::test]
async fn test_rejected_patch_fails_before_read_back() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/user"))
        .and(header("authorization", auth(GOOD_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;
    mount_profile(&server, json!({"login": "me"})).await;

    let ctx = context(&server, false, UPDATE);
    let report = ProfileUpdate.run(&ctx).await;

    assert_failed_with(&report, "update_profile", "Expected status code 200, but got 422");
}
