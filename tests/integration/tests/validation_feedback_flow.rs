use std::{fs, path::Path};

use httpmock::prelude::*;
use pr_feedback::{
    feedback_comment::extract_fenced_log, render_feedback_comment, run_validation_feedback,
    validation_log::bound_log_text, CommentTemplate, FeedbackConfig, FeedbackOutcome,
    GithubApiClient, PullRequestRef, UpsertAction, UpsertResult, FEEDBACK_MARKER,
};
use serde_json::{json, Value};
use tempfile::tempdir;

const COMMENTS_PATH: &str = "/repos/agent0ai/a0-plugins/issues/17/comments";

fn config_for(log_path: &Path) -> FeedbackConfig {
    FeedbackConfig::new(
        log_path,
        PullRequestRef::parse("agent0ai/a0-plugins", 17).expect("request"),
    )
}

fn client_for(server: &MockServer) -> GithubApiClient {
    GithubApiClient::new(&server.base_url(), "test-token").expect("client")
}

fn expected_body(log: &str) -> String {
    render_feedback_comment(&CommentTemplate::default(), &bound_log_text(log, 60_000))
}

fn applied(outcome: FeedbackOutcome) -> UpsertResult {
    match outcome {
        FeedbackOutcome::Applied(result) => result,
        other => panic!("expected applied outcome, got {other:?}"),
    }
}

fn human_comment(id: u64, body: &str) -> Value {
    json!({
        "id": id,
        "body": body,
        "html_url": format!("https://github.test/agent0ai/a0-plugins/pull/17#issuecomment-{id}"),
        "user": {"login": "plugin-author", "type": "User"}
    })
}

fn bot_comment(id: u64, body: &str) -> Value {
    json!({
        "id": id,
        "body": body,
        "html_url": format!("https://github.test/agent0ai/a0-plugins/pull/17#issuecomment-{id}"),
        "user": {"login": "github-actions[bot]", "type": "Bot"}
    })
}

#[tokio::test]
async fn integration_scenarios_create_then_update_single_status_comment() {
    let server = MockServer::start();
    let temp = tempdir().expect("tempdir");
    let log_path = temp.path().join("validation.log");
    let client = client_for(&server);
    let config = config_for(&log_path);

    // First run: no status comment yet.
    fs::write(&log_path, "schema error: missing field 'title'").expect("write log");
    let mut first_list = server.mock(|when, then| {
        when.method(GET).path(COMMENTS_PATH);
        then.status(200)
            .json_body(json!([human_comment(1, "Adding my plugin")]));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path(COMMENTS_PATH)
            .json_body(json!({"body": expected_body("schema error: missing field 'title'")}));
        then.status(201).json_body(bot_comment(
            501,
            &expected_body("schema error: missing field 'title'"),
        ));
    });

    let first = applied(
        run_validation_feedback(&config, &client)
            .await
            .expect("first run"),
    );
    assert_eq!(first.action, UpsertAction::Created);
    assert_eq!(first.comment_id, 501);
    assert_eq!(
        first.url.as_deref(),
        Some("https://github.test/agent0ai/a0-plugins/pull/17#issuecomment-501")
    );
    let first_body = expected_body("schema error: missing field 'title'");
    assert_eq!(
        extract_fenced_log(&first_body),
        Some("schema error: missing field 'title'")
    );
    first_list.assert_calls(1);
    create.assert_calls(1);
    first_list.delete();

    // Second run: the comment from the first run is listed and replaced.
    fs::write(&log_path, "thumbnail too large").expect("write log");
    let second_list = server.mock(|when, then| {
        when.method(GET).path(COMMENTS_PATH);
        then.status(200).json_body(json!([
            human_comment(1, "Adding my plugin"),
            bot_comment(501, &first_body)
        ]));
    });
    let update = server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/agent0ai/a0-plugins/issues/comments/501")
            .json_body(json!({"body": expected_body("thumbnail too large")}));
        then.status(200)
            .json_body(bot_comment(501, &expected_body("thumbnail too large")));
    });

    let second = applied(
        run_validation_feedback(&config, &client)
            .await
            .expect("second run"),
    );
    assert_eq!(second.action, UpsertAction::Updated);
    assert_eq!(second.comment_id, first.comment_id);
    let second_body = expected_body("thumbnail too large");
    assert!(second_body.starts_with(FEEDBACK_MARKER));
    assert_eq!(extract_fenced_log(&second_body), Some("thumbnail too large"));
    assert!(!second_body.contains("missing field"));
    second_list.assert_calls(1);
    update.assert_calls(1);
    create.assert_calls(1);
}

#[tokio::test]
async fn integration_human_comment_quoting_marker_is_not_updated() {
    let server = MockServer::start();
    let temp = tempdir().expect("tempdir");
    let log_path = temp.path().join("validation.log");
    fs::write(&log_path, "bad yaml").expect("write log");

    let _list = server.mock(|when, then| {
        when.method(GET).path(COMMENTS_PATH);
        then.status(200).json_body(json!([human_comment(
            3,
            &format!("> {FEEDBACK_MARKER}\n> why did this fail?")
        )]));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path(COMMENTS_PATH);
        then.status(201).json_body(bot_comment(600, "created"));
    });
    let update = server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/agent0ai/a0-plugins/issues/comments/3");
        then.status(200).json_body(bot_comment(3, "hijacked"));
    });

    let result = applied(
        run_validation_feedback(&config_for(&log_path), &client_for(&server))
            .await
            .expect("run"),
    );
    assert_eq!(result.action, UpsertAction::Created);
    assert_eq!(result.comment_id, 600);
    create.assert_calls(1);
    update.assert_calls(0);
}

#[tokio::test]
async fn integration_marker_comment_on_later_page_is_found() {
    let server = MockServer::start();
    let temp = tempdir().expect("tempdir");
    let log_path = temp.path().join("validation.log");
    fs::write(&log_path, "thumbnail must be square").expect("write log");

    let first_page = Value::Array(
        (1..=100)
            .map(|id| human_comment(id, "bump"))
            .collect::<Vec<_>>(),
    );
    let page_one = server.mock(|when, then| {
        when.method(GET)
            .path(COMMENTS_PATH)
            .query_param("page", "1");
        then.status(200).json_body(first_page);
    });
    let page_two = server.mock(|when, then| {
        when.method(GET)
            .path(COMMENTS_PATH)
            .query_param("page", "2");
        then.status(200).json_body(json!([
            bot_comment(900, &format!("{FEEDBACK_MARKER}\nold")),
            bot_comment(901, &format!("{FEEDBACK_MARKER}\nduplicate"))
        ]));
    });
    let update = server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/agent0ai/a0-plugins/issues/comments/900")
            .body_includes("thumbnail must be square");
        then.status(200).json_body(bot_comment(900, "updated"));
    });
    let duplicate_update = server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/agent0ai/a0-plugins/issues/comments/901");
        then.status(200).json_body(bot_comment(901, "updated"));
    });

    let result = applied(
        run_validation_feedback(&config_for(&log_path), &client_for(&server))
            .await
            .expect("run"),
    );
    assert_eq!(result.action, UpsertAction::Updated);
    assert_eq!(result.comment_id, 900);
    page_one.assert_calls(1);
    page_two.assert_calls(1);
    update.assert_calls(1);
    duplicate_update.assert_calls(0);
}

#[tokio::test]
async fn integration_long_log_is_truncated_in_posted_body() {
    let server = MockServer::start();
    let temp = tempdir().expect("tempdir");
    let log_path = temp.path().join("validation.log");
    fs::write(&log_path, "e".repeat(40)).expect("write log");

    let _list = server.mock(|when, then| {
        when.method(GET).path(COMMENTS_PATH);
        then.status(200).json_body(json!([]));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path(COMMENTS_PATH)
            .body_includes(format!("{}\\n... (truncated)", "e".repeat(16)));
        then.status(201).json_body(bot_comment(700, "created"));
    });

    let mut config = config_for(&log_path);
    config.max_log_chars = 16;
    let result = applied(
        run_validation_feedback(&config, &client_for(&server))
            .await
            .expect("run"),
    );
    assert_eq!(result.action, UpsertAction::Created);
    create.assert_calls(1);
}

#[tokio::test]
async fn integration_listing_failure_aborts_without_writing() {
    let server = MockServer::start();
    let temp = tempdir().expect("tempdir");
    let log_path = temp.path().join("validation.log");
    fs::write(&log_path, "bad yaml").expect("write log");

    let list = server.mock(|when, then| {
        when.method(GET).path(COMMENTS_PATH);
        then.status(401)
            .json_body(json!({"message": "Bad credentials"}));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path(COMMENTS_PATH);
        then.status(201).json_body(bot_comment(1, "never"));
    });

    let error = run_validation_feedback(&config_for(&log_path), &client_for(&server))
        .await
        .expect_err("401 should fail");
    assert!(error.is_transport_error());
    assert!(error.to_string().contains("status 401"));
    assert!(error.to_string().contains("Bad credentials"));
    list.assert_calls(1);
    create.assert_calls(0);
}

#[tokio::test]
async fn integration_missing_log_posts_nothing() {
    let server = MockServer::start();
    let temp = tempdir().expect("tempdir");
    let list = server.mock(|when, then| {
        when.method(GET).path(COMMENTS_PATH);
        then.status(200).json_body(json!([]));
    });

    let error = run_validation_feedback(
        &config_for(&temp.path().join("missing.log")),
        &client_for(&server),
    )
    .await
    .expect_err("missing log should fail");
    assert!(error.is_input_error());
    list.assert_calls(0);
}
