use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::auth::handlers::SESSION_USER_ID_KEY;
use crate::error::ApiError;

/// Reject unauthenticated requests with a JSON 401 before the handler runs.
pub async fn require_auth(session: Session, request: Request, next: Next) -> Response {
    if let Ok(Some(_user_id)) = session.get::<i64>(SESSION_USER_ID_KEY).await {
        next.run(request).await
    } else {
        ApiError::Unauthenticated.into_response()
    }
}
