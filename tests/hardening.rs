mod common;
use axum::{
    body::Bytes,
    http::{HeaderName, HeaderValue, StatusCode},
};
use lectern::web::{middlewares::REQUESTS_PER_WINDOW, routes::MAX_BODY_BYTES};

use crate::common::{setup_server, setup_test_db};

#[tokio::test]
async fn route_rate_limit_test() {
    let pool = setup_test_db().await;
    let server = setup_server(&pool).await;

    for i in 0..REQUESTS_PER_WINDOW {
        let response = server.get("/api/v1/health").await;
        assert_eq!(response.status_code(), StatusCode::OK, "request #{}", i + 1);
        assert_eq!(
            response.header("ratelimit-policy").to_str().unwrap(),
            format!("{REQUESTS_PER_WINDOW};w=60")
        );
    }

    let limited = server.get("/api/v1/health").await;
    assert_eq!(limited.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert!(limited.text().contains("Too many requests"));
    assert!(
        limited
            .header("ratelimit")
            .to_str()
            .unwrap()
            .contains("remaining=0")
    );
    assert!(limited.maybe_header("retry-after").is_some());

    // another client keeps its own budget
    let other = server
        .get("/api/v1/health")
        .add_header(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("198.51.100.1"),
        )
        .await;
    assert_eq!(other.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn route_security_headers_test() {
    let pool = setup_test_db().await;
    let server = setup_server(&pool).await;

    let response = server.get("/api/v1/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("x-content-type-options"), "nosniff");
    assert_eq!(response.header("x-frame-options"), "SAMEORIGIN");
    assert_eq!(response.header("referrer-policy"), "no-referrer");
    assert!(
        response
            .header("content-security-policy")
            .to_str()
            .unwrap()
            .starts_with("default-src 'self'")
    );

    // error responses are covered too
    let missing = server.get("/api/v1/auth/me").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(missing.header("x-content-type-options"), "nosniff");
}

#[tokio::test]
async fn route_body_limit_test() {
    let pool = setup_test_db().await;
    let server = setup_server(&pool).await;

    let oversized = server
        .post("/api/v1/auth/login")
        .bytes(Bytes::from(vec![b' '; MAX_BODY_BYTES + 1]))
        .content_type("application/json")
        .await;
    assert_eq!(oversized.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

    let fits = server
        .post("/api/v1/auth/login")
        .bytes(Bytes::from_static(
            br#"{"email":"nobody@example.com","password":"wrong-password"}"#,
        ))
        .content_type("application/json")
        .await;
    assert_eq!(fits.status_code(), StatusCode::UNAUTHORIZED);
}
