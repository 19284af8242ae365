mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, assign_course_action, create_course_action, login_action, login_admin_action,
    setup_server, setup_test_db, signup_action,
};

const MISSING_ID: &str = "00000000-0000-0000-0000-000000000000";

#[tokio::test]
async fn route_admin_gate_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(signup_action("plain@example.com", "correct-horse").with_save_as("user"))
        .step(
            Action::new("users_anonymous", "GET", "/api/v1/admin/users")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            Action::new("users_as_user", "GET", "/api/v1/admin/users")
                .with_bearer_from("user")
                .assert_body(|body| assert!(body.contains("Forbidden")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(login_admin_action())
        .step(
            Action::new("users_as_admin", "GET", "/api/v1/admin/users")
                .with_bearer_from("admin")
                .with_param("limit", "5")
                .with_param("offset", "0")
                .assert_body(|body| {
                    assert!(body.contains("\"total\":2"));
                    assert!(body.contains("items"));
                    assert!(!body.contains("password_hash"));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_admin_user_crud_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action())
        .step(
            Action::new("create_user", "POST", "/api/v1/admin/users")
                .with_body(json!({
                    "email": "Managed@Example.com",
                    "password": "correct-horse",
                    "role": "USER",
                    "plan_status": "INACTIVE",
                }))
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("managed@example.com"));
                    assert!(body.contains("\"plan_status\":\"INACTIVE\""));
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("managed"),
        )
        .step(
            Action::new("create_user_twice", "POST", "/api/v1/admin/users")
                .with_body(json!({
                    "email": "managed@example.com",
                    "password": "correct-horse",
                }))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("Email already exists")))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("update_nothing", "PATCH", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.str_at("managed", "/id")))
                .with_body(json!({}))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("No fields to update")))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("activate", "PATCH", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.str_at("managed", "/id")))
                .with_body(json!({
                    "plan_status": "ACTIVE",
                    "plan_active_until": "2099-01-01T00:00:00Z",
                }))
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("\"plan_status\":\"ACTIVE\""));
                    assert!(body.contains("2099-01-01"));
                }),
        )
        // explicit null clears the date
        .step(
            Action::new("clear_until", "PATCH", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.str_at("managed", "/id")))
                .with_body(json!({ "plan_active_until": null }))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("\"plan_active_until\":null"))),
        )
        .step(
            Action::new("delete_user", "DELETE", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.str_at("managed", "/id")))
                .with_bearer_from("admin"),
        )
        .step(
            Action::new("get_deleted", "GET", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.str_at("managed", "/id")))
                .with_bearer_from("admin")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_admin_password_reset_revokes_sessions_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            signup_action("reset@example.com", "correct-horse")
                .with_clear_cookies(true)
                .with_save_as("user"),
        )
        .step(login_admin_action())
        .step(
            Action::new("reset_password", "PATCH", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.str_at("user", "/user/id")))
                .with_body(json!({ "password": "battery-staple" }))
                .with_bearer_from("admin"),
        )
        .step(
            Action::new("refresh_after_reset", "POST", "/api/v1/auth/refresh")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(
            login_action("reset@example.com", "correct-horse")
                .with_save_cookies(false)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(login_action("reset@example.com", "battery-staple").with_save_cookies(false))
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_storage_provider_secret_hidden_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action())
        .step(
            Action::new("create_provider", "POST", "/api/v1/admin/storage-providers")
                .with_body(json!({
                    "name": "primary-r2",
                    "endpoint": "https://example.r2.cloudflarestorage.com",
                    "region": "auto",
                    "bucket": "lectures",
                    "access_key_id": "AKIDEXAMPLE",
                    "secret_access_key": "very-secret-access-key",
                    "is_default": true,
                }))
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("primary-r2"));
                    assert!(!body.contains("very-secret-access-key"));
                    assert!(!body.contains("secret"));
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("provider"),
        )
        .step(
            Action::new("list_providers", "GET", "/api/v1/admin/storage-providers")
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("\"total\":1"));
                    assert!(body.contains("\"is_default\":true"));
                    assert!(!body.contains("secret"));
                }),
        )
        .step(
            Action::new("rotate_secret", "PATCH", "")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/admin/storage-providers/{}", ctx.str_at("provider", "/id"))
                })
                .with_body(json!({ "secret_access_key": "another-secret", "endpoint": null }))
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(!body.contains("another-secret"));
                    assert!(body.contains("\"endpoint\":null"));
                }),
        )
        .step(
            Action::new("duplicate_name", "POST", "/api/v1/admin/storage-providers")
                .with_body(json!({
                    "name": "primary-r2",
                    "bucket": "other",
                    "access_key_id": "AKID2",
                    "secret_access_key": "x",
                }))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("Storage provider name already exists")))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("create_backup", "POST", "/api/v1/admin/storage-providers")
                .with_body(json!({
                    "name": "backup-s3",
                    "bucket": "backup",
                    "access_key_id": "AKID3",
                    "secret_access_key": "y",
                }))
                .with_bearer_from("admin")
                .with_expect(StatusCode::CREATED)
                .with_save_as("backup"),
        )
        .step(
            Action::new("rename_onto_taken", "PATCH", "")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/admin/storage-providers/{}", ctx.str_at("backup", "/id"))
                })
                .with_body(json!({ "name": "primary-r2" }))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("Storage provider name already exists")))
                .with_expect(StatusCode::CONFLICT),
        )
        // taking over the default flag is not a conflict
        .step(
            Action::new("backup_becomes_default", "PATCH", "")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/admin/storage-providers/{}", ctx.str_at("backup", "/id"))
                })
                .with_body(json!({ "is_default": true }))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("\"is_default\":true"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_coupon_rules_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action())
        .step(
            Action::new("overpriced_course", "POST", "/api/v1/admin/courses")
                .with_body(json!({
                    "title": "Too expensive",
                    "description": "Price past the ceiling",
                    "price_inr_paise": i64::MAX / 10,
                }))
                .with_bearer_from("admin")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(create_course_action(49_900))
        .step(
            Action::new("both_discounts", "POST", "/api/v1/admin/coupons")
                .with_body(json!({ "code": "BOTH", "percent_off": 10, "amount_off_paise": 100 }))
                .with_bearer_from("admin")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("bad_code", "POST", "/api/v1/admin/coupons")
                .with_body(json!({ "code": "no spaces", "percent_off": 10 }))
                .with_bearer_from("admin")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("create_coupon", "POST", "/api/v1/admin/coupons")
                .with_dyn_body(|ctx| {
                    json!({
                        "code": "launch50",
                        "course_id": ctx.str_at("course", "/id"),
                        "percent_off": 50,
                        "max_redemptions": 10,
                    })
                })
                .with_bearer_from("admin")
                .assert_body(|body| {
                    // codes are stored uppercase
                    assert!(body.contains("LAUNCH50"));
                    assert!(body.contains("\"redeemed_count\":0"));
                })
                .with_expect(StatusCode::CREATED)
                .with_save_as("coupon"),
        )
        .step(
            Action::new("same_code", "POST", "/api/v1/admin/coupons")
                .with_body(json!({ "code": "LAUNCH50", "amount_off_paise": 100 }))
                .with_bearer_from("admin")
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("deactivate", "PATCH", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/coupons/{}", ctx.str_at("coupon", "/id")))
                .with_body(json!({ "active": false, "max_redemptions": null }))
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("\"active\":false"));
                    assert!(body.contains("\"max_redemptions\":null"));
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_assignments_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action())
        .step(create_course_action(0))
        .step(signup_action("pupil@example.com", "correct-horse").with_save_as("pupil"))
        .step(
            Action::new("assign_unknown_user", "POST", "/api/v1/admin/assignments")
                .with_dyn_body(|ctx| {
                    json!({ "user_id": MISSING_ID, "course_id": ctx.str_at("course", "/id") })
                })
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("User not found")))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("assign_unknown_course", "POST", "/api/v1/admin/assignments")
                .with_dyn_body(|ctx| {
                    json!({ "user_id": ctx.str_at("pupil", "/user/id"), "course_id": MISSING_ID })
                })
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("Course not found")))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(assign_course_action("pupil").with_save_as("assignment"))
        .step(
            assign_course_action("pupil")
                .assert_body(|body| assert!(body.contains("Course already assigned to this user")))
                .with_expect(StatusCode::CONFLICT),
        )
        .step(
            Action::new("list_assignments", "GET", "/api/v1/admin/assignments")
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("pupil@example.com"));
                    assert!(body.contains("Rust for video engineers"));
                }),
        )
        .step(
            Action::new("pupil_sees_course", "GET", "/api/v1/courses")
                .with_bearer_from("pupil")
                .assert_body(|body| assert!(body.contains("\"assigned\":true"))),
        )
        .step(
            Action::new("unassign", "DELETE", "")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/admin/assignments/{}", ctx.str_at("assignment", "/id"))
                })
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("\"ok\":true"))),
        )
        .step(
            Action::new("list_after_unassign", "GET", "/api/v1/admin/assignments")
                .with_bearer_from("admin")
                .assert_body(|body| assert_eq!(body, "[]")),
        )
        .step(
            Action::new("pupil_lost_course", "GET", "/api/v1/courses")
                .with_bearer_from("pupil")
                .assert_body(|body| assert!(body.contains("\"assigned\":false"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_upload_presign_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action())
        .step(
            Action::new("presign_default_ttl", "POST", "/api/v1/admin/uploads/presign")
                .with_body(json!({ "key": "videos/new.mp4", "content_type": "video/mp4" }))
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("\"key\":\"videos/new.mp4\""));
                    assert!(body.contains("X-Amz-Expires=300"));
                }),
        )
        .step(
            Action::new("presign_max_ttl", "POST", "/api/v1/admin/uploads/presign")
                .with_body(json!({
                    "key": "videos/new.mp4",
                    "content_type": "video/mp4",
                    "expires_in_seconds": 1800,
                }))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("X-Amz-Expires=1800"))),
        )
        .step(
            Action::new("presign_past_cap", "POST", "/api/v1/admin/uploads/presign")
                .with_body(json!({
                    "key": "videos/new.mp4",
                    "content_type": "video/mp4",
                    "expires_in_seconds": 3600,
                }))
                .with_bearer_from("admin")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("presign_unknown_provider", "POST", "/api/v1/admin/uploads/presign")
                .with_body(json!({
                    "key": "videos/new.mp4",
                    "content_type": "video/mp4",
                    "provider_id": MISSING_ID,
                }))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("Storage provider not found")))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(signup_action("uploader@example.com", "correct-horse").with_save_as("uploader"))
        .step(
            Action::new("presign_not_admin", "POST", "/api/v1/admin/uploads/presign")
                .with_body(json!({ "key": "videos/new.mp4", "content_type": "video/mp4" }))
                .with_bearer_from("uploader")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, pool)
        .await;
}
