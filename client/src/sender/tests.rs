use std::time::Duration;

use rstest::{fixture, rstest};
use serde_json::{json, Value};

use benchlog_payloads::phase1::Phase1Row;
use benchlog_payloads::BenchmarkRow;

use super::*;
use crate::test_support::{unreachable_base_url, MockServer};

#[fixture]
fn row() -> BenchmarkRow {
    r#"{"task_id":1,"latency_us":2.4}"#.parse().expect("valid row")
}

fn config_for(server: &MockServer) -> Config {
    Config::new(&server.base_url(), "abc123").expect("valid config")
}

#[rstest]
fn posts_once_to_the_table_with_auth_headers(row: BenchmarkRow) {
    let server = MockServer::respond(201, r#"[{"task_id":1,"latency_us":2.4,"id":99}]"#);

    log_row(&row, &config_for(&server)).expect("insert should succeed");

    let captured = server.next_request();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.path, "/rest/v1/phase1_benchmarks");
    assert_eq!(captured.header("apikey"), Some("abc123"));
    assert_eq!(captured.header("authorization"), Some("Bearer abc123"));
    assert_eq!(captured.header("content-type"), Some("application/json"));
    assert_eq!(captured.header("prefer"), Some("return=representation"));
    assert_eq!(captured.body, r#"{"task_id":1,"latency_us":2.4}"#);

    server.assert_no_more_requests();
}

#[rstest]
fn returns_the_body_unmodified(row: BenchmarkRow) {
    let body = r#"[{"task_id":1,"latency_us":2.4,"id":99}]"#;
    let server = MockServer::respond(201, body);

    let inserted = log_row(&row, &config_for(&server)).unwrap();

    assert_eq!(inserted.status, StatusCode::CREATED);
    assert_eq!(inserted.to_string(), body);
    assert_eq!(inserted.rows, json!([{"task_id": 1, "latency_us": 2.4, "id": 99}]));
}

#[rstest]
fn empty_success_body_is_null(row: BenchmarkRow) {
    let server = MockServer::respond(201, "");

    let inserted = log_row(&row, &config_for(&server)).unwrap();

    assert_eq!(inserted.rows, Value::Null);
    assert_eq!(inserted.body, "");
}

#[rstest]
#[case(400, r#"{"message":"null value in column \"task_name\""}"#)]
#[case(401, r#"{"message":"Invalid API key"}"#)]
#[case(409, r#"{"code":"23505"}"#)]
#[case(500, "boom")]
fn non_2xx_is_an_http_error(row: BenchmarkRow, #[case] status: u16, #[case] body: &str) {
    let server = MockServer::respond(status, body);

    let err = log_row(&row, &config_for(&server)).unwrap_err();

    match err {
        Error::Http {
            status: got,
            body: got_body,
        } => {
            assert_eq!(got.as_u16(), status);
            assert_eq!(got_body, body);
        }
        other => panic!("expected an HTTP error, got {:?}", other),
    }

    // One attempt, no retries.
    server.next_request();
    server.assert_no_more_requests();
}

#[rstest]
fn success_body_that_is_not_json_is_a_decode_error(row: BenchmarkRow) {
    let server = MockServer::respond(200, "<html>ok</html>");

    let err = log_row(&row, &config_for(&server)).unwrap_err();

    assert!(matches!(err, Error::Decode(_)), "{:?}", err);
}

#[rstest]
fn refused_connection_is_a_transport_error(row: BenchmarkRow) {
    let config = Config::new(&unreachable_base_url(), "abc123")
        .unwrap()
        .with_timeout(Duration::from_secs(5));

    let err = log_row(&row, &config).unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "{:?}", err);
    assert_eq!(err.status(), None);
}

#[test]
fn echoed_rows_come_back_equal() {
    let server = MockServer::echo(201);
    let logger = RowLogger::new(&config_for(&server)).unwrap();

    let rows = [
        json!({}),
        json!({"task_id": 1, "task_name": "openSession", "latency_us": 2.4, "iteration": 1, "outlier": false}),
        json!({"hardware_config": {"os": "linux", "cores": [0, 1, 2, 3]}, "note": "ünïcödé", "missing": null}),
    ];

    for value in rows {
        let row = BenchmarkRow::try_from(value.clone()).unwrap();
        let inserted = logger.log_row(&row).unwrap();
        assert_eq!(inserted.rows, value);
        server.next_request();
    }
}

#[test]
fn logger_is_reusable_for_typed_rows() {
    let server = MockServer::echo(201);
    let logger = RowLogger::new(&config_for(&server)).unwrap();
    assert_eq!(logger.endpoint().path(), "/rest/v1/phase1_benchmarks");

    for iteration in 1..=3 {
        let row = Phase1Row {
            task_id: 2,
            task_name: "closeSession".to_string(),
            latency_us: 3.5,
            iteration,
            hardware_config: json!({}),
            outlier: false,
        };
        let inserted = logger.log_row(&row.into()).unwrap();
        assert_eq!(inserted.rows["iteration"], json!(iteration));
    }

    for _ in 1..=3 {
        server.next_request();
    }
    server.assert_no_more_requests();
}

#[test]
fn long_bodies_are_truncated_on_char_boundaries() {
    let body = "é".repeat(MAX_LOGGED_BODY);
    let cut = loggable(&body);
    assert!(cut.len() <= MAX_LOGGED_BODY);
    assert!(body.starts_with(cut));

    assert_eq!(loggable("short"), "short");
}
