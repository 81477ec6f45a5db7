use crate::schemas::{AppState, ErrorResponse};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use model::entities::{api_token, user};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

/// The user a request was authenticated as. Inserted into request
/// extensions by [`require_auth`] so handlers can extract it.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
}

/// Create and persist a new opaque bearer token for the given user.
pub async fn issue_token<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<String, DbErr> {
    trace!("Issuing new token for user_id: {}", user_id);

    let token_value = Uuid::new_v4().simple().to_string();
    let token = api_token::ActiveModel {
        user_id: Set(user_id),
        token: Set(token_value),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!("Token issued for user_id: {}", user_id);
    Ok(token.token)
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "NOT_AUTHENTICATED".to_string(),
            success: false,
        }),
    )
}

/// Middleware guarding the authenticated part of the API.
///
/// Expects an `Authorization: Bearer <token>` header, resolves the token
/// against the database and stores the owning user in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering require_auth middleware");

    let header_value = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        Some(value) => value,
        None => {
            warn!("Request rejected: missing Authorization header");
            return Err(unauthorized("Authentication credentials were not provided"));
        }
    };

    let token_value = match header_value.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => token,
        _ => {
            warn!("Request rejected: malformed Authorization header");
            return Err(unauthorized("Invalid authorization header"));
        }
    };

    trace!("Looking up bearer token in database");
    let token = match api_token::Entity::find()
        .filter(api_token::Column::Token.eq(token_value))
        .one(&state.db)
        .await
    {
        Ok(Some(token)) => token,
        Ok(None) => {
            warn!("Request rejected: unknown token");
            return Err(unauthorized("Invalid token"));
        }
        Err(db_error) => {
            error!("Failed to look up token: {}", db_error);
            return Err(unauthorized("Invalid token"));
        }
    };

    let user = match user::Entity::find_by_id(token.user_id).one(&state.db).await {
        Ok(Some(user)) if user.is_active => user,
        Ok(Some(_)) => {
            warn!("Request rejected: user {} is inactive", token.user_id);
            return Err(unauthorized("User account is inactive"));
        }
        Ok(None) => {
            warn!("Request rejected: token owner {} no longer exists", token.user_id);
            return Err(unauthorized("Invalid token"));
        }
        Err(db_error) => {
            error!("Failed to look up token owner: {}", db_error);
            return Err(unauthorized("Invalid token"));
        }
    };

    debug!("Request authenticated as user {} ({})", user.id, user.email);
    request.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        email: user.email,
    });

    Ok(next.run(request).await)
}
