use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::get,
};
use serde::Deserialize;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped,
        entity::{Course, CourseAssignment, Lecture},
    },
    web::{
        AppState, AuthenticatedUser, WebError, WebResult, doc::ApiDoc, dto::OkResponse,
        middlewares,
    },
};

pub mod admin;
pub mod attachments;
pub mod auth;
pub mod courses;
pub mod lectures;
pub mod payments;
pub mod webhooks;

#[derive(Debug, Clone, Deserialize, utoipa::IntoParams, utoipa::ToSchema)]
pub struct PaginationQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl PaginationQuery {
    pub fn limit(&self) -> i64 {
        self.limit.clamp(1, 200)
    }

    pub fn offset(&self) -> i64 {
        self.offset.max(0)
    }
}

/// Course must exist; plain users must also have it assigned.
pub(crate) async fn require_course_access(
    state: &AppState,
    user: &AuthenticatedUser,
    course_id: Uuid,
) -> WebResult<Course> {
    let course = Course::find_by_id(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    if user.is_admin() {
        return Ok(course);
    }

    CourseAssignment::find_by_user_course(state.pool(), user.user_id(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(CourseAssignment::get_resource_type(), e))?
        .ok_or(WebError::course_not_assigned())?;

    Ok(course)
}

pub(crate) async fn require_lecture_access(
    state: &AppState,
    user: &AuthenticatedUser,
    lecture_id: Uuid,
) -> WebResult<Lecture> {
    let lecture = Lecture::find_by_id(state.pool(), user, lecture_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lecture::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lecture::get_resource_type()))?;

    require_course_access(state, user, lecture.course_id()).await?;
    Ok(lecture)
}

pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Hardening headers sent with every API response unless a handler set them.
const SECURITY_HEADERS: [(&str, &str); 12] = [
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';\
         frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';\
         script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SECURITY_HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

fn cors(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!("invalid app.cors_origin {:?}, cross-origin requests disabled", origin);
            layer
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses((status = 200, description = "Service is up", body = OkResponse)),
    tag = "health"
)]
async fn health_handler() -> Json<OkResponse> {
    Json(OkResponse::ok())
}

pub fn build_app<S: Send + Sync + Clone + 'static>(state: AppState) -> Router<S> {
    let config = state.config();

    let router = Router::new()
        .route("/api/v1/health", get(health_handler))
        .nest("/api/v1/auth", auth::routes(state.clone()))
        .nest("/api/v1/courses", courses::routes(state.clone()))
        .nest("/api/v1/lectures", lectures::routes(state.clone()))
        .nest("/api/v1/attachments", attachments::routes(state.clone()))
        .nest("/api/v1/payments", payments::routes(state.clone()))
        .nest("/api/v1/webhooks", webhooks::routes(state.clone()))
        .nest("/api/v1/admin", admin::routes(state.clone()))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CookieManagerLayer::default())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::rate_limit_fn,
        ))
        .layer(cors(config.app().cors_origin()));

    let mut router = with_security_headers(router).with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}
