use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_cookies::{
    Cookie, Cookies,
    cookie::{SameSite, time::Duration},
};
use validator::Validate;

use crate::{
    Config,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    session::{self, Session},
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{
            OkResponse,
            auth::{AuthResponse, MeResponse},
        },
        error::ErrorResponse,
        middlewares,
    },
};

pub const REFRESH_COOKIE: &str = "lectern_refresh";
const REFRESH_COOKIE_PATH: &str = "/api/v1/auth";

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct SignupBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/me", get(me_handler))
        .route_layer(middleware::from_fn(middlewares::require_user_fn))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/logout", post(logout_handler))
        .merge(protected)
        .with_state(state)
}

fn refresh_cookie_base(config: &Config, value: String) -> Cookie<'static> {
    let secure = config.cookies().secure();
    let mut cookie = Cookie::build((REFRESH_COOKIE, value))
        .http_only(true)
        .path(REFRESH_COOKIE_PATH)
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .build();

    if let Some(domain) = config.cookies().domain() {
        cookie.set_domain(domain.to_string());
    }

    cookie
}

pub(crate) fn refresh_cookie(config: &Config, token: String) -> Cookie<'static> {
    let mut cookie = refresh_cookie_base(config, token);
    cookie.set_max_age(Duration::seconds(config.jwt().refresh_ttl_seconds()));
    cookie
}

fn start_session(config: &Config, cookies: &Cookies, session: Session) -> AuthResponse {
    cookies.add(refresh_cookie(config, session.refresh_token));

    AuthResponse {
        access_token: session.access_token,
        user: session.user.into(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/signup",
    request_body = SignupBody,
    description = "Registers a new user and opens a session",
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
async fn signup_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<SignupBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let config = state.config();
    let session = session::register(
        state.pool(),
        config.jwt(),
        &payload.email,
        &payload.password,
        payload.name,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(start_session(config, &cookies, session))))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    description = "Signs a user in",
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
async fn login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginBody>,
) -> WebResult<impl IntoResponse> {
    payload.validate()?;

    let config = state.config();
    let session =
        session::login(state.pool(), config.jwt(), &payload.email, &payload.password).await?;

    Ok(Json(start_session(config, &cookies, session)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/refresh",
    description = "Trades the refresh cookie for a new token pair",
    responses(
        (status = 200, description = "Session rotated", body = AuthResponse),
        (status = 401, description = "Missing or invalid refresh token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
async fn refresh_handler(
    State(state): State<AppState>,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    let current = cookies
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(WebError::auth_refresh_missing(REFRESH_COOKIE))?;

    let config = state.config();
    let session = session::rotate(state.pool(), config.jwt(), &current).await?;

    Ok(Json(start_session(config, &cookies, session)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    description = "Revokes the refresh cookie if present and clears it",
    responses(
        (status = 200, description = "Signed out", body = OkResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
async fn logout_handler(
    State(state): State<AppState>,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    if let Some(token) = cookies.get(REFRESH_COOKIE).map(|c| c.value().to_string()) {
        session::revoke(state.pool(), &token).await?;
    }

    cookies.remove(refresh_cookie_base(state.config(), String::new()));
    Ok(Json(OkResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    description = "Returns the current user",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
    ),
    tag = "auth",
    security(("bearer" = []))
)]
async fn me_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_required())?;

    Ok(Json(MeResponse { user: found.into() }))
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(cookies: &str) -> Config {
        let raw = format!(
            r#"
            [host]
            bindto = "127.0.0.1:0"

            [app]
            database_uri = "postgres://localhost/test"

            [jwt]
            access_secret = "access"
            refresh_secret = "refresh"
            refresh_ttl_seconds = 600

            {cookies}
            "#
        );
        Config::from_slice(raw.as_bytes()).unwrap()
    }

    #[test]
    #[cfg(debug_assertions)]
    fn local_refresh_cookie_is_lax() {
        let config = config("");
        let cookie = refresh_cookie(&config, "token".into());

        assert_eq!(cookie.name(), REFRESH_COOKIE);
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/api/v1/auth"));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(600)));
        assert_eq!(cookie.domain(), None);
    }

    #[test]
    fn secure_refresh_cookie_is_cross_site() {
        let config = config("[cookies]\nsecure = true\ndomain = \"example.com\"");
        let cookie = refresh_cookie(&config, "token".into());

        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.domain(), Some("example.com"));
    }
}
