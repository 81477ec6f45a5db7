use crate::auth::{issue_token, AuthenticatedUser};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json, Extension};
use model::entities::user::{self, UserError};
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for registering a new user.
///
/// Fields are optional at the deserialization level so an incomplete
/// body yields a 400 with an error payload instead of a bare 422.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    /// Email address (must be unique, stored lowercased)
    #[validate(email)]
    pub email: Option<String>,
    /// Password (minimum 5 characters)
    #[validate(length(min = 5))]
    pub password: Option<String>,
    /// Display name
    pub name: Option<String>,
}

/// Request body for obtaining an API token
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for updating the authenticated user's profile
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateMeRequest {
    /// New display name
    pub name: Option<String>,
    /// New password (minimum 5 characters)
    #[validate(length(min = 5))]
    pub password: Option<String>,
}

/// User response model. Never exposes the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            name: model.name,
        }
    }
}

/// Token response model
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Opaque bearer token for the Authorization header
    pub token: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(request))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_user function");

    if let Err(validation_errors) = request.validate() {
        warn!("User creation rejected: {}", validation_errors);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid payload: {}", validation_errors),
                code: "VALIDATION_ERROR".to_string(),
                success: false,
            }),
        ));
    }

    let (email, password, name) = match (request.email, request.password, request.name) {
        (Some(email), Some(password), Some(name)) => (email, password, name),
        _ => {
            warn!("User creation rejected: missing required fields");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Email, password and name are required".to_string(),
                    code: "VALIDATION_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    debug!("Creating user with email: {}", email);
    trace!("Attempting to insert new user into database");
    match user::create_user(&state.db, &email, &password, &name).await {
        Ok(user_model) => {
            info!(
                "User created successfully with ID: {}, email: {}",
                user_model.id, user_model.email
            );
            let response = ApiResponse {
                data: UserResponse::from(user_model),
                message: "User created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(UserError::MissingEmail) => {
            warn!("User creation rejected: empty email");
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Users must have an email address".to_string(),
                    code: "INVALID_EMAIL".to_string(),
                    success: false,
                }),
            ))
        }
        Err(UserError::Db(db_error)) => {
            error!("Failed to create user '{}': {}", email, db_error);

            // Unique violations on the email column map to a client error
            let (status, error_response) = match db_error {
                DbErr::Exec(ref exec_err) => {
                    let error_msg = exec_err.to_string().to_lowercase();
                    if error_msg.contains("unique") || error_msg.contains("constraint") {
                        (
                            StatusCode::BAD_REQUEST,
                            ErrorResponse {
                                error: format!("A user with email '{}' already exists", email),
                                code: "EMAIL_ALREADY_EXISTS".to_string(),
                                success: false,
                            },
                        )
                    } else {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            ErrorResponse {
                                error: "Failed to create user due to database constraint".to_string(),
                                code: "DATABASE_CONSTRAINT_ERROR".to_string(),
                                success: false,
                            },
                        )
                    }
                }
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal server error while creating user".to_string(),
                        code: "DATABASE_ERROR".to_string(),
                        success: false,
                    },
                ),
            };

            Err((status, Json(error_response)))
        }
        Err(UserError::Hash(hash_error)) => {
            error!("Failed to hash password: {}", hash_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while creating user".to_string(),
                    code: "PASSWORD_HASH_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Exchange email and password for an API token
#[utoipa::path(
    post,
    path = "/api/v1/users/token",
    tag = "users",
    request_body = CreateTokenRequest,
    responses(
        (status = 200, description = "Token created successfully", body = ApiResponse<TokenResponse>),
        (status = 400, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(request))]
pub async fn create_token(
    State(state): State<AppState>,
    Json(request): Json<CreateTokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_token function");

    let invalid_credentials = || {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Unable to authenticate with provided credentials".to_string(),
                code: "INVALID_CREDENTIALS".to_string(),
                success: false,
            }),
        )
    };

    let missing_credentials = || {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Email and password are required".to_string(),
                code: "MISSING_CREDENTIALS".to_string(),
                success: false,
            }),
        )
    };

    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) => (email.trim().to_lowercase(), password),
        _ => {
            warn!("Token request rejected: missing email or password");
            return Err(missing_credentials());
        }
    };
    debug!("Token requested for email: {}", email);

    if email.is_empty() || password.is_empty() {
        warn!("Token request rejected: empty email or password");
        return Err(missing_credentials());
    }

    trace!("Looking up user for token request");
    let user_model = match user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await
    {
        Ok(Some(user_model)) => user_model,
        Ok(None) => {
            warn!("Token request rejected: no user with email {}", email);
            return Err(invalid_credentials());
        }
        Err(db_error) => {
            error!("Failed to look up user '{}': {}", email, db_error);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while creating token".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    if !user_model.verify_password(&password) {
        warn!("Token request rejected: bad password for user {}", user_model.id);
        return Err(invalid_credentials());
    }

    if !user_model.is_active {
        warn!("Token request rejected: user {} is inactive", user_model.id);
        return Err(invalid_credentials());
    }

    match issue_token(&state.db, user_model.id).await {
        Ok(token) => {
            info!("Token issued for user {}", user_model.id);
            Ok(Json(ApiResponse {
                data: TokenResponse { token },
                message: "Token created successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to persist token for user {}: {}", user_model.id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while creating token".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_me(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, StatusCode> {
    trace!("Entering get_me function for user_id: {}", auth_user.id);

    match user::Entity::find_by_id(auth_user.id).one(&state.db).await {
        Ok(Some(user_model)) => {
            debug!("Retrieved profile for user {}", user_model.id);
            Ok(Json(ApiResponse {
                data: UserResponse::from(user_model),
                message: "Profile retrieved successfully".to_string(),
                success: true,
            }))
        }
        Ok(None) => {
            warn!("Authenticated user {} no longer exists", auth_user.id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve user {}: {}", auth_user.id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update the authenticated user's profile
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "users",
    security(("bearer_token" = [])),
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(request))]
pub async fn update_me(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<UpdateMeRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_me function for user_id: {}", auth_user.id);

    if let Err(validation_errors) = request.validate() {
        warn!("Profile update rejected: {}", validation_errors);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid payload: {}", validation_errors),
                code: "VALIDATION_ERROR".to_string(),
                success: false,
            }),
        ));
    }

    let internal_error = || {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error while updating profile".to_string(),
                code: "DATABASE_ERROR".to_string(),
                success: false,
            }),
        )
    };

    let existing_user = match user::Entity::find_by_id(auth_user.id).one(&state.db).await {
        Ok(Some(user_model)) => user_model,
        Ok(None) => {
            warn!("Authenticated user {} no longer exists", auth_user.id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "User not found".to_string(),
                    code: "NOT_FOUND".to_string(),
                    success: false,
                }),
            ));
        }
        Err(db_error) => {
            error!("Failed to look up user {}: {}", auth_user.id, db_error);
            return Err(internal_error());
        }
    };

    let mut user_active: user::ActiveModel = existing_user.into();

    if let Some(name) = request.name {
        debug!("Updating name for user {}", auth_user.id);
        user_active.name = Set(name);
    }

    if let Some(password) = request.password {
        debug!("Updating password for user {}", auth_user.id);
        let password_hash = match user::hash_password(&password) {
            Ok(hash) => hash,
            Err(hash_error) => {
                error!("Failed to hash new password: {}", hash_error);
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Internal server error while updating profile".to_string(),
                        code: "PASSWORD_HASH_ERROR".to_string(),
                        success: false,
                    }),
                ));
            }
        };
        user_active.password_hash = Set(password_hash);
    }

    match user_active.update(&state.db).await {
        Ok(updated_user) => {
            info!("Profile updated for user {}", updated_user.id);
            Ok(Json(ApiResponse {
                data: UserResponse::from(updated_user),
                message: "Profile updated successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to update user {}: {}", auth_user.id, db_error);
            Err(internal_error())
        }
    }
}
