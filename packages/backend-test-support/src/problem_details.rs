//! Problem Details test helpers
//!
//! Assertions for the stable HTTP error contract without depending on
//! backend types.

use actix_web::http::StatusCode;
use serde::Deserialize;

/// Local mirror of the backend's Problem Details body.
#[derive(Debug, Deserialize)]
struct ProblemDetailsLike {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    type_: String,
    #[allow(dead_code)]
    title: String,
    status: u16,
    detail: String,
    code: String,
    trace_id: String,
}

/// Assert that a `ServiceResponse` conforms to the error contract:
/// expected status, `application/problem+json` content type, matching
/// `code`, a non-empty `trace_id` mirrored in the `x-trace-id` header, and
/// (optionally) a substring of `detail`.
pub async fn assert_problem_details(
    resp: actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
    expected_code: &str,
    expected_status: StatusCode,
    expected_detail_contains: Option<&str>,
) {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_eq!(status, expected_status);

    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    let problem: ProblemDetailsLike =
        serde_json::from_slice(&body).expect("response body should be valid ProblemDetails JSON");

    let trace_id_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be valid UTF-8");
    assert!(!trace_id_header.is_empty());
    assert_eq!(
        problem.trace_id, trace_id_header,
        "trace_id in body should match x-trace-id header"
    );

    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());

    if let Some(expected_detail) = expected_detail_contains {
        assert!(
            problem.detail.contains(expected_detail),
            "expected detail to contain '{expected_detail}', got '{}'",
            problem.detail
        );
    }
}
