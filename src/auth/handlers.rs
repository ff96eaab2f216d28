use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;

use crate::{
    error::{ApiError, ApiResult},
    models::user::PublicUser,
    services::{
        auth_service::LoginRequest, entitlement, user_service::CreateUserRequest,
    },
    AppState,
};

/// Single session key holding the authenticated user id.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Public authentication endpoints.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/user", get(current_user_handler))
}

/// Endpoints that require an authenticated session up front.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/account/subscription", get(subscription_handler))
        .layer(axum::middleware::from_fn(
            crate::auth::middleware::require_auth,
        ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    pub display_name: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub has_active_subscription: bool,
    pub trial_days_remaining: Option<i64>,
}

pub async fn register_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<RegisterPayload>,
) -> ApiResult<impl IntoResponse> {
    let request = CreateUserRequest {
        email: payload.email,
        password: payload.password,
        first_name: payload.first_name,
        display_name: payload.display_name,
        status: payload.status,
    };

    let user = state.user_service.create_user(request).await?;

    establish_session(&session, user.id).await?;

    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<LoginPayload>,
) -> ApiResult<impl IntoResponse> {
    let request = LoginRequest {
        email: payload.email,
        password: payload.password,
    };

    let user = state.auth_service.authenticate(request).await?;

    establish_session(&session, user.id).await?;

    Ok(Json(PublicUser::from(user)))
}

pub async fn logout_handler(session: Session) -> ApiResult<impl IntoResponse> {
    session
        .flush()
        .await
        .map_err(|e| ApiError::Session(e.to_string()))?;

    Ok(Json(json!({ "message": "Logged out" })))
}

/// Resolve the current session to a sanitized user.
///
/// No session at all is the ordinary signed-out state and maps to 401; a
/// session whose user row has vanished maps to 404 so clients know to force
/// a full re-authentication instead of retrying.
pub async fn current_user_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<PublicUser>> {
    let user_id = authenticated_user_id(&session).await?;
    let user = state.auth_service.get_user_by_id(user_id).await?;

    Ok(Json(PublicUser::from(user)))
}

pub async fn subscription_handler(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Json<SubscriptionView>> {
    let user_id = authenticated_user_id(&session).await?;
    let user = state.auth_service.get_user_by_id(user_id).await?;

    let now = Utc::now();
    Ok(Json(SubscriptionView {
        has_active_subscription: user.has_active_subscription(now),
        trial_days_remaining: entitlement::trial_days_remaining(
            user.subscription_status,
            user.trial_ends_at,
            now,
        ),
    }))
}

async fn establish_session(session: &Session, user_id: i64) -> ApiResult<()> {
    session
        .insert(SESSION_USER_ID_KEY, user_id)
        .await
        .map_err(|e| ApiError::Session(e.to_string()))
}

async fn authenticated_user_id(session: &Session) -> ApiResult<i64> {
    session
        .get::<i64>(SESSION_USER_ID_KEY)
        .await
        .map_err(|e| ApiError::Session(e.to_string()))?
        .ok_or(ApiError::Unauthenticated)
}
