use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{DatabaseError, ResourceType},
    payments::PaymentError,
    session::SessionError,
    storage::StorageError,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationEmailConflict")]
    RegistrationEmailConflict,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationTokenInvalid. Error: {0}")]
    AuthenticationTokenInvalid(String),

    #[error("AuthenticationRefreshMissing, cookie: {cookie}")]
    AuthenticationRefreshMissing { cookie: String },

    #[error("AuthenticationRefreshInvalid")]
    AuthenticationRefreshInvalid,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("AccessAdminRequired")]
    AccessAdminRequired,

    #[error("AccessPlanInactive")]
    AccessPlanInactive,

    #[error("AccessPlanExpired")]
    AccessPlanExpired,

    #[error("AccessCourseNotAssigned")]
    AccessCourseNotAssigned,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceConflict: {resource_type:?}. {message}")]
    ResourceConflict {
        resource_type: ResourceType,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("RequestValidation: {0}")]
    RequestValidation(#[from] validator::ValidationErrors),

    #[error("RequestNoFieldsToUpdate")]
    RequestNoFieldsToUpdate,

    #[error("RequestBadRequest: {message}")]
    RequestBadRequest { message: String },

    #[error("RequestRateLimited: retry in {retry_after_secs}s")]
    RequestRateLimited { retry_after_secs: u64 },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn client_display(&self) -> String {
        String::from("Internal server error.")
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationEmailConflict => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationEmailConflict => String::from("Email already in use"),
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationRequired => String::from("Unauthorized"),
            Self::AuthenticationTokenInvalid(_) => {
                String::from("Invalid or expired access token")
            }
            Self::AuthenticationRefreshMissing { .. } => String::from("Missing refresh token"),
            Self::AuthenticationRefreshInvalid => String::from("Invalid refresh token"),
            Self::AuthenticationInvalidCredentials => String::from("Invalid credentials"),
        }
    }
}

impl AccessError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AccessAdminRequired => String::from("Forbidden"),
            Self::AccessPlanInactive => String::from("Plan inactive"),
            Self::AccessPlanExpired => String::from("Plan expired"),
            Self::AccessCourseNotAssigned => String::from("Course not assigned"),
        }
    }

    /// Machine-readable code the client branches on.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::AccessPlanInactive => Some("PLAN_INACTIVE"),
            Self::AccessPlanExpired => Some("PLAN_EXPIRED"),
            _ => None,
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { resource_type } => format!("{resource_type} not found"),
            Self::ResourceForbidden { .. } => String::from("Forbidden"),
            Self::ResourceFetchError { .. } => String::from("Internal server error."),
            Self::ResourceConflict { message, .. } => message.clone(),
        }
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestRateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RequestValidation(_) => String::from("Validation error"),
            Self::RequestNoFieldsToUpdate => String::from("No fields to update"),
            Self::RequestBadRequest { message } => message.clone(),
            Self::RequestRateLimited { .. } => {
                String::from("Too many requests, please try again later.")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("AccessError - {0}")]
    AccessError(#[from] AccessError),
    #[error("RequestError - {0}")]
    RequestError(#[from] RequestError),
    #[error("PaymentError - {0}")]
    PaymentError(#[from] PaymentError),
    #[error("StorageError - {0}")]
    StorageError(#[from] StorageError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_conflict<S: Into<String>>(r#type: ResourceType, message: S) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
            message: message.into(),
        })
    }

    /// Maps database errors of a write: `Forbidden` stays 403, unique
    /// violations become 409 with `conflict`, the rest is a fetch error.
    pub fn from_write(r#type: ResourceType, error: DatabaseError, conflict: &str) -> Self {
        if error.is_unique_violation() {
            return Self::resource_conflict(r#type, conflict);
        }
        Self::from_db(r#type, error)
    }

    pub fn from_db(r#type: ResourceType, error: DatabaseError) -> Self {
        match error {
            DatabaseError::Forbidden => Self::resource_forbidden(r#type),
            error => Self::resource_fetch_error(r#type, error),
        }
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_token_invalid<S: Into<String>>(reason: S) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid(
            reason.into(),
        ))
    }

    pub fn auth_refresh_missing<S: Into<String>>(cookie: S) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRefreshMissing {
            cookie: cookie.into(),
        })
    }

    pub fn auth_refresh_invalid() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRefreshInvalid)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationEmailConflict)
    }

    pub fn admin_required() -> Self {
        Self::AccessError(AccessError::AccessAdminRequired)
    }

    pub fn plan_inactive() -> Self {
        Self::AccessError(AccessError::AccessPlanInactive)
    }

    pub fn plan_expired() -> Self {
        Self::AccessError(AccessError::AccessPlanExpired)
    }

    pub fn course_not_assigned() -> Self {
        Self::AccessError(AccessError::AccessCourseNotAssigned)
    }

    pub fn no_fields_to_update() -> Self {
        Self::RequestError(RequestError::RequestNoFieldsToUpdate)
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::RequestError(RequestError::RequestBadRequest {
            message: message.into(),
        })
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        Self::RequestError(RequestError::RequestRateLimited { retry_after_secs })
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::AccessError(e) => e.status_code(),
            Self::RequestError(e) => e.status_code(),
            Self::PaymentError(e) => e.status_code(),
            Self::StorageError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::AccessError(e) => e.client_display(),
            Self::RequestError(e) => e.client_display(),
            Self::PaymentError(e) => e.client_display(),
            Self::StorageError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::AccessError(e) => e.code(),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for WebError {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::RequestError(RequestError::RequestValidation(value))
    }
}

impl From<SessionError> for WebError {
    fn from(value: SessionError) -> Self {
        match value {
            SessionError::EmailTaken => Self::registration_conflict(),
            SessionError::InvalidCredentials => Self::auth_invalid_credentials(),
            SessionError::RefreshInvalid => Self::auth_refresh_invalid(),
            SessionError::Crypt(e) => Self::server_crypt_error(e),
            SessionError::Database(e) => Self::resource_fetch_error(ResourceType::User, e),
        }
    }
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Machine-readable error code, e.g. `PLAN_EXPIRED`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            log_error(&self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        let body = ErrorResponse {
            message: self.client_display(),
            status_code: status_code.as_str().to_string(),
            code: self.code().map(str::to_string),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plan_errors_carry_codes() {
        assert_eq!(WebError::plan_expired().code(), Some("PLAN_EXPIRED"));
        assert_eq!(WebError::plan_inactive().code(), Some("PLAN_INACTIVE"));
        assert_eq!(WebError::plan_expired().status_code(), StatusCode::FORBIDDEN);
        assert_eq!(WebError::course_not_assigned().code(), None);
    }

    #[test]
    fn not_found_names_the_resource() {
        let e = WebError::resource_not_found(ResourceType::StorageProvider);
        assert_eq!(e.client_display(), "Storage provider not found");
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn session_errors_map_to_http() {
        assert_eq!(
            WebError::from(SessionError::EmailTaken).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            WebError::from(SessionError::InvalidCredentials).client_display(),
            "Invalid credentials"
        );
    }
}
