use apicontract::scenario::own_repos::OwnRepos;
use apicontract::scenario::user_repos::UserRepos;
use apicontract::scenario::{Outcome, Scenario};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{
    assert_failed_with, assert_passed, auth, context, BAD_TOKEN, FORBIDDEN_TOKEN, GOOD_TOKEN,
};

const USER_REPOS: &str = r#"
user_repos:
  endpoint: "/users/{{ username }}/repos"
  username: octocat
  wrong_username: nobody-here-123
  items: [id, name, owner, private]
"#;

const OWN_REPOS: &str = r#"
own_repos:
  endpoint: /user/repos
  items: [id, name, owner, private, permissions]
"#;

fn repo(name: &str, private: bool) -> Value {
    json!({"id": 1, "name": name, "owner": {"login": "octocat"}, "private": private})
}

#[tokio::test]
async fn test_user_repos_all_checks_pass() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([repo("a", false), repo("b", false)])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/nobody-here-123/repos"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ctx = context(&server, false, USER_REPOS);
    let report = UserRepos.run(&ctx).await;

    assert_passed(&report, "response_200");
    assert_passed(&report, "response_404");
    assert_passed(&report, "response_items");
}

#[tokio::test]
async fn test_user_repos_empty_list_fails_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/octocat/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let ctx = context(&server, false, USER_REPOS);
    let report = UserRepos.run(&ctx).await;

    assert_passed(&report, "response_200");
    assert_failed_with(&report, "response_items", "list is empty");
    // unmatched requests get wiremock's 404, which is what response_404 wants
    assert_passed(&report, "response_404");
}

#[tokio::test]
async fn test_own_repos_checks() {
    let server = MockServer::start().await;
    let mut private = repo("secret", true);
    private["permissions"] = json!({"admin": true});
    let mut public = repo("open", false);
    public["permissions"] = json!({"admin": true});

    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(header("if-none-match", "\"r1\""))
        .respond_with(ResponseTemplate::new(304))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(header("authorization", auth(GOOD_TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"r1\"")
                .set_body_json(json!([private, public])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(header("authorization", auth(BAD_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(header("authorization", auth(FORBIDDEN_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let ctx = context(&server, true, OWN_REPOS);
    let report = OwnRepos.run(&ctx).await;

    for check in [
        "response_200",
        "response_401",
        "response_304",
        "response_403",
        "response_items",
    ] {
        assert_passed(&report, check);
    }
    assert!(report.checks.iter().all(|c| c.outcome == Outcome::Passed));
}

#[tokio::test]
async fn test_own_repos_object_body_is_schema_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"items": []})),
        )
        .mount(&server)
        .await;

    let ctx = context(&server, false, OWN_REPOS);
    let report = OwnRepos.run(&ctx).await;

    assert_failed_with(&report, "response_200", "expected an array, got object");
    assert_failed_with(&report, "response_items", "expected an array");
}
