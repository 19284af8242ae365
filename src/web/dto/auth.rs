use serde::Serialize;

use crate::web::dto::users::UserResponse;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
}
