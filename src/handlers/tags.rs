use crate::auth::AuthenticatedUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json, Extension};
use model::entities::tag;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new tag
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTagRequest {
    /// Tag name
    pub name: String,
}

/// Tag response model
#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    pub id: i32,
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(model: tag::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// List the authenticated user's tags
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "tags",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Tags retrieved successfully", body = ApiResponse<Vec<TagResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_tags(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TagResponse>>>, StatusCode> {
    trace!("Entering get_tags function for user_id: {}", auth_user.id);
    debug!("Fetching tags for user {}", auth_user.id);

    match tag::Entity::find()
        .filter(tag::Column::UserId.eq(auth_user.id))
        .order_by_desc(tag::Column::Name)
        .all(&state.db)
        .await
    {
        Ok(tags) => {
            let tag_count = tags.len();
            debug!("Retrieved {} tags for user {}", tag_count, auth_user.id);

            let tag_responses: Vec<TagResponse> = tags.into_iter().map(TagResponse::from).collect();

            info!("Successfully retrieved {} tags", tag_count);
            Ok(Json(ApiResponse {
                data: tag_responses,
                message: "Tags retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to retrieve tags for user {}: {}", auth_user.id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Create a new tag owned by the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    tag = "tags",
    security(("bearer_token" = [])),
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created successfully", body = ApiResponse<TagResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_tag(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TagResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_tag function for user_id: {}", auth_user.id);
    debug!("Creating tag '{}' for user {}", request.name, auth_user.id);

    if request.name.trim().is_empty() {
        warn!("Tag creation rejected: empty name");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Tag name must not be empty".to_string(),
                code: "VALIDATION_ERROR".to_string(),
                success: false,
            }),
        ));
    }

    let new_tag = tag::ActiveModel {
        name: Set(request.name.clone()),
        user_id: Set(auth_user.id),
        ..Default::default()
    };

    trace!("Attempting to insert new tag into database");
    match new_tag.insert(&state.db).await {
        Ok(tag_model) => {
            info!(
                "Tag created successfully with ID: {}, name: {}",
                tag_model.id, tag_model.name
            );
            let response = ApiResponse {
                data: TagResponse::from(tag_model),
                message: "Tag created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create tag '{}': {}", request.name, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while creating tag".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
