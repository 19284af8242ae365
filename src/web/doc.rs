use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};

use crate::web::routes::auth::REFRESH_COOKIE;

pub struct AuthSchemesModifier;

impl Modify for AuthSchemesModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(schema) = openapi.components.as_mut() {
            schema.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Short-lived access token"))
                        .build(),
                ),
            );
            schema.add_security_scheme(
                "refresh_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    REFRESH_COOKIE,
                    "Rotating refresh token, scoped to /api/v1/auth",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Lectern API"),
    paths(
        crate::web::routes::health_handler,
        crate::web::routes::auth::signup_handler,
        crate::web::routes::auth::login_handler,
        crate::web::routes::auth::refresh_handler,
        crate::web::routes::auth::logout_handler,
        crate::web::routes::auth::me_handler,
        crate::web::routes::courses::course_list_handler,
        crate::web::routes::courses::course_detail_handler,
        crate::web::routes::lectures::lecture_detail_handler,
        crate::web::routes::lectures::lecture_stream_url_handler,
        crate::web::routes::lectures::lecture_progress_handler,
        crate::web::routes::attachments::course_attachments_handler,
        crate::web::routes::attachments::lecture_attachments_handler,
        crate::web::routes::attachments::attachment_download_url_handler,
        crate::web::routes::payments::create_order_handler,
        crate::web::routes::payments::order_status_handler,
        crate::web::routes::webhooks::cashfree_webhook_handler,
        crate::web::routes::admin::users::user_list_handler,
        crate::web::routes::admin::users::user_create_handler,
        crate::web::routes::admin::users::user_get_handler,
        crate::web::routes::admin::users::user_update_handler,
        crate::web::routes::admin::users::user_delete_handler,
        crate::web::routes::admin::courses::admin_course_list_handler,
        crate::web::routes::admin::courses::course_create_handler,
        crate::web::routes::admin::courses::course_get_handler,
        crate::web::routes::admin::courses::course_update_handler,
        crate::web::routes::admin::courses::course_delete_handler,
        crate::web::routes::admin::lectures::lecture_create_handler,
        crate::web::routes::admin::lectures::lecture_update_handler,
        crate::web::routes::admin::lectures::lecture_delete_handler,
        crate::web::routes::admin::assignments::assignment_list_handler,
        crate::web::routes::admin::assignments::assignment_create_handler,
        crate::web::routes::admin::assignments::assignment_delete_handler,
        crate::web::routes::admin::coupons::coupon_list_handler,
        crate::web::routes::admin::coupons::coupon_create_handler,
        crate::web::routes::admin::coupons::coupon_get_handler,
        crate::web::routes::admin::coupons::coupon_update_handler,
        crate::web::routes::admin::coupons::coupon_delete_handler,
        crate::web::routes::admin::attachments::admin_course_attachments_handler,
        crate::web::routes::admin::attachments::course_attachment_create_handler,
        crate::web::routes::admin::attachments::admin_lecture_attachments_handler,
        crate::web::routes::admin::attachments::lecture_attachment_create_handler,
        crate::web::routes::admin::attachments::attachment_delete_handler,
        crate::web::routes::admin::attachments::admin_attachment_download_url_handler,
        crate::web::routes::admin::storage_providers::provider_list_handler,
        crate::web::routes::admin::storage_providers::provider_create_handler,
        crate::web::routes::admin::storage_providers::provider_get_handler,
        crate::web::routes::admin::storage_providers::provider_update_handler,
        crate::web::routes::admin::storage_providers::provider_delete_handler,
        crate::web::routes::admin::uploads::presign_upload_handler,
    ),
    modifiers(&AuthSchemesModifier),
    tags(
        (name = "auth", description = "Signup, login and refresh-token rotation"),
        (name = "courses", description = "Courses for the signed-in user"),
        (name = "lectures", description = "Playback and progress, active plan required"),
        (name = "attachments", description = "Course and lecture files"),
        (name = "payments", description = "Cashfree checkout"),
        (name = "webhooks", description = "Signed Cashfree callbacks"),
        (name = "admin", description = "Back office"),
    ),
)]
pub struct ApiDoc;
