mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, Flow, assign_course_action, create_course_action, create_lecture_action,
    login_admin_action, setup_server, setup_test_db, signup_action,
};

fn lecture_path(suffix: &'static str) -> impl Fn(&common::FlowContext) -> String {
    move |ctx| format!("/api/v1/lectures/{}{}", ctx.str_at("lecture", "/id"), suffix)
}

#[tokio::test]
async fn route_lecture_access_and_progress_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action())
        .step(create_course_action(0))
        .step(create_lecture_action())
        .step(signup_action("viewer@example.com", "correct-horse").with_save_as("viewer"))
        .step(
            Action::new("lecture_unassigned", "GET", "")
                .with_dyn_path(lecture_path(""))
                .with_bearer_from("viewer")
                .assert_body(|body| assert!(body.contains("Course not assigned")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("course_locked", "GET", "")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}", ctx.str_at("course", "/id")))
                .with_bearer_from("viewer")
                .assert_body(|body| {
                    assert!(body.contains("\"assigned\":false"));
                    assert!(!body.contains("Lifetimes"));
                }),
        )
        .step(assign_course_action("viewer"))
        .step(
            Action::new("course_unlocked", "GET", "")
                .with_dyn_path(|ctx| format!("/api/v1/courses/{}", ctx.str_at("course", "/id")))
                .with_bearer_from("viewer")
                .assert_body(|body| {
                    assert!(body.contains("\"assigned\":true"));
                    assert!(body.contains("Lifetimes"));
                }),
        )
        .step(
            Action::new("lecture_detail", "GET", "")
                .with_dyn_path(lecture_path(""))
                .with_bearer_from("viewer")
                .assert_body(|body| {
                    assert!(body.contains("Lifetimes"));
                    assert!(body.contains("\"progress_pct\":0"));
                    assert!(!body.contains("video_key"));
                }),
        )
        // no provider rows: the config bucket signs the URL
        .step(
            Action::new("stream_url", "GET", "")
                .with_dyn_path(lecture_path("/stream-url"))
                .with_bearer_from("viewer")
                .assert_body(|body| {
                    assert!(body.contains("lectern-dev"));
                    assert!(body.contains("videos/lifetimes.mp4"));
                    assert!(body.contains("X-Amz-Signature"));
                    assert!(body.contains("\"expires_in_seconds\":60"));
                }),
        )
        .step(
            Action::new("progress_out_of_range", "PUT", "")
                .with_dyn_path(lecture_path("/progress"))
                .with_body(json!({ "progress_pct": 150.0 }))
                .with_bearer_from("viewer")
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("progress_save", "PUT", "")
                .with_dyn_path(lecture_path("/progress"))
                .with_body(json!({ "progress_pct": 42.5 }))
                .with_bearer_from("viewer")
                .assert_body(|body| assert!(body.contains("42.5"))),
        )
        // upsert keeps a single row
        .step(
            Action::new("progress_overwrite", "PUT", "")
                .with_dyn_path(lecture_path("/progress"))
                .with_body(json!({ "progress_pct": 80.0 }))
                .with_bearer_from("viewer"),
        )
        .step(
            Action::new("lecture_detail_progress", "GET", "")
                .with_dyn_path(lecture_path(""))
                .with_bearer_from("viewer")
                .assert_body(|body| assert!(body.contains("\"progress_pct\":80"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_plan_expired_blocked_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action())
        .step(create_course_action(0))
        .step(create_lecture_action())
        .step(signup_action("lapsed@example.com", "correct-horse").with_save_as("lapsed"))
        .step(assign_course_action("lapsed"))
        .step(
            Action::new("lecture_while_active", "GET", "")
                .with_dyn_path(lecture_path(""))
                .with_bearer_from("lapsed"),
        )
        .step(
            Action::new("expire_plan", "PATCH", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.str_at("lapsed", "/user/id")))
                .with_body(json!({ "plan_active_until": "2020-01-01T00:00:00Z" }))
                .with_bearer_from("admin"),
        )
        .step(
            Action::new("lecture_expired", "GET", "")
                .with_dyn_path(lecture_path(""))
                .with_bearer_from("lapsed")
                .assert_body(|body| assert!(body.contains("PLAN_EXPIRED")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("stream_expired", "GET", "")
                .with_dyn_path(lecture_path("/stream-url"))
                .with_bearer_from("lapsed")
                .with_expect(StatusCode::FORBIDDEN),
        )
        // browsing is not plan-gated
        .step(
            Action::new("courses_still_listed", "GET", "/api/v1/courses")
                .with_bearer_from("lapsed")
                .assert_body(|body| assert!(body.contains("\"assigned\":true"))),
        )
        .step(
            Action::new("deactivate_plan", "PATCH", "")
                .with_dyn_path(|ctx| format!("/api/v1/admin/users/{}", ctx.str_at("lapsed", "/user/id")))
                .with_body(json!({ "plan_status": "INACTIVE", "plan_active_until": null }))
                .with_bearer_from("admin"),
        )
        .step(
            Action::new("lecture_inactive", "GET", "")
                .with_dyn_path(lecture_path(""))
                .with_bearer_from("lapsed")
                .assert_body(|body| assert!(body.contains("PLAN_INACTIVE")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .run(&mut server, pool)
        .await;
}

fn provider_body(
    name: &str,
    bucket: &str,
    access_key_id: &str,
    is_default: bool,
) -> serde_json::Value {
    json!({
        "name": name,
        "endpoint": "http://127.0.0.1:9000",
        "region": "us-east-1",
        "bucket": bucket,
        "access_key_id": access_key_id,
        "secret_access_key": format!("{name}-secret"),
        "force_path_style": true,
        "is_default": is_default,
    })
}

#[tokio::test]
async fn route_stream_url_provider_selection_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(login_admin_action())
        .step(create_course_action(0))
        .step(create_lecture_action())
        .step(
            Action::new("create_default_provider", "POST", "/api/v1/admin/storage-providers")
                .with_body(provider_body("db-default", "lectures-db", "AKIDDBDEFAULT", true))
                .with_bearer_from("admin")
                .with_expect(StatusCode::CREATED),
        )
        // the stored default wins over the config bucket, its sealed secret signs the URL
        .step(
            Action::new("stream_via_default", "GET", "")
                .with_dyn_path(lecture_path("/stream-url"))
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("lectures-db"));
                    assert!(body.contains("AKIDDBDEFAULT"));
                    assert!(!body.contains("lectern-dev"));
                    assert!(body.contains("X-Amz-Signature"));
                }),
        )
        .step(
            Action::new("create_archive_provider", "POST", "/api/v1/admin/storage-providers")
                .with_body(provider_body("archive", "archive-bucket", "AKIDARCHIVE", false))
                .with_bearer_from("admin")
                .with_expect(StatusCode::CREATED)
                .with_save_as("archive"),
        )
        .step(
            Action::new("create_archived_lecture", "POST", "")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/admin/courses/{}/lectures", ctx.str_at("course", "/id"))
                })
                .with_dyn_body(|ctx| {
                    json!({
                        "title": "Pinning",
                        "description": "Self-referential structs",
                        "video_key": "videos/pinning.mp4",
                        "order_index": 1,
                        "storage_provider_id": ctx.str_at("archive", "/id"),
                    })
                })
                .with_bearer_from("admin")
                .with_expect(StatusCode::CREATED)
                .with_save_as("archived_lecture"),
        )
        .step(
            Action::new("stream_via_explicit", "GET", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/lectures/{}/stream-url",
                        ctx.str_at("archived_lecture", "/id")
                    )
                })
                .with_bearer_from("admin")
                .assert_body(|body| {
                    assert!(body.contains("archive-bucket"));
                    assert!(body.contains("AKIDARCHIVE"));
                    assert!(body.contains("videos/pinning.mp4"));
                }),
        )
        .step(
            Action::new("deactivate_archive", "PATCH", "")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/admin/storage-providers/{}", ctx.str_at("archive", "/id"))
                })
                .with_body(json!({ "active": false }))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("\"active\":false"))),
        )
        .step(
            Action::new("stream_via_inactive", "GET", "")
                .with_dyn_path(|ctx| {
                    format!(
                        "/api/v1/lectures/{}/stream-url",
                        ctx.str_at("archived_lecture", "/id")
                    )
                })
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("Storage provider is inactive")))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        // the default lecture is unaffected
        .step(
            Action::new("stream_default_still_works", "GET", "")
                .with_dyn_path(lecture_path("/stream-url"))
                .with_bearer_from("admin")
                .assert_body(|body| assert!(body.contains("lectures-db"))),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_user_attachments_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    let course_attachments = |ctx: &common::FlowContext| {
        format!("/api/v1/attachments/courses/{}", ctx.str_at("course", "/id"))
    };
    let download_url = |ctx: &common::FlowContext| {
        format!("/api/v1/attachments/{}/download-url", ctx.str_at("attachment", "/id"))
    };

    Flow::new()
        .step(login_admin_action())
        .step(create_course_action(0))
        .step(
            Action::new("create_attachment", "POST", "")
                .with_dyn_path(|ctx| {
                    format!("/api/v1/admin/attachments/courses/{}", ctx.str_at("course", "/id"))
                })
                .with_body(json!({
                    "title": "Cheat sheet",
                    "file_key": "notes/cheat-sheet.pdf",
                    "mime_type": "application/pdf",
                    "size_bytes": 2048,
                }))
                .with_bearer_from("admin")
                .with_expect(StatusCode::CREATED)
                .with_save_as("attachment"),
        )
        .step(signup_action("reader@example.com", "correct-horse").with_save_as("reader"))
        .step(
            Action::new("list_unassigned", "GET", "")
                .with_dyn_path(course_attachments)
                .with_bearer_from("reader")
                .assert_body(|body| assert!(body.contains("Course not assigned")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("download_unassigned", "GET", "")
                .with_dyn_path(download_url)
                .with_bearer_from("reader")
                .assert_body(|body| assert!(body.contains("Course not assigned")))
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("list_anonymous", "GET", "")
                .with_dyn_path(course_attachments)
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .step(assign_course_action("reader"))
        .step(
            Action::new("list_assigned", "GET", "")
                .with_dyn_path(course_attachments)
                .with_bearer_from("reader")
                .assert_body(|body| {
                    assert!(body.contains("Cheat sheet"));
                    assert!(body.contains("application/pdf"));
                    assert!(!body.contains("file_key"));
                    assert!(!body.contains("notes/cheat-sheet.pdf"));
                }),
        )
        .step(
            Action::new("download_assigned", "GET", "")
                .with_dyn_path(download_url)
                .with_bearer_from("reader")
                .assert_body(|body| {
                    assert!(body.contains("notes/cheat-sheet.pdf"));
                    assert!(body.contains("X-Amz-Signature"));
                    assert!(body.contains("\"expires_in_seconds\":300"));
                }),
        )
        .step(
            Action::new(
                "download_missing",
                "GET",
                "/api/v1/attachments/00000000-0000-0000-0000-000000000000/download-url",
            )
                .with_bearer_from("reader")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
