use crate::auth::AuthenticatedUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json, Extension};
use model::entities::ingredient;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new ingredient
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateIngredientRequest {
    /// Ingredient name
    pub name: String,
}

/// Ingredient response model
#[derive(Debug, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: i32,
    pub name: String,
}

impl From<ingredient::Model> for IngredientResponse {
    fn from(model: ingredient::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// List the authenticated user's ingredients
#[utoipa::path(
    get,
    path = "/api/v1/ingredients",
    tag = "ingredients",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Ingredients retrieved successfully", body = ApiResponse<Vec<IngredientResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_ingredients(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<IngredientResponse>>>, StatusCode> {
    trace!("Entering get_ingredients function for user_id: {}", auth_user.id);
    debug!("Fetching ingredients for user {}", auth_user.id);

    match ingredient::Entity::find()
        .filter(ingredient::Column::UserId.eq(auth_user.id))
        .order_by_desc(ingredient::Column::Name)
        .all(&state.db)
        .await
    {
        Ok(ingredients) => {
            let ingredient_count = ingredients.len();
            debug!(
                "Retrieved {} ingredients for user {}",
                ingredient_count, auth_user.id
            );

            let ingredient_responses: Vec<IngredientResponse> = ingredients
                .into_iter()
                .map(IngredientResponse::from)
                .collect();

            info!("Successfully retrieved {} ingredients", ingredient_count);
            Ok(Json(ApiResponse {
                data: ingredient_responses,
                message: "Ingredients retrieved successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve ingredients for user {}: {}",
                auth_user.id, db_error
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Create a new ingredient owned by the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/ingredients",
    tag = "ingredients",
    security(("bearer_token" = [])),
    request_body = CreateIngredientRequest,
    responses(
        (status = 201, description = "Ingredient created successfully", body = ApiResponse<IngredientResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_ingredient(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<IngredientResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_ingredient function for user_id: {}", auth_user.id);
    debug!("Creating ingredient '{}' for user {}", request.name, auth_user.id);

    if request.name.trim().is_empty() {
        warn!("Ingredient creation rejected: empty name");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Ingredient name must not be empty".to_string(),
                code: "VALIDATION_ERROR".to_string(),
                success: false,
            }),
        ));
    }

    let new_ingredient = ingredient::ActiveModel {
        name: Set(request.name.clone()),
        user_id: Set(auth_user.id),
        ..Default::default()
    };

    trace!("Attempting to insert new ingredient into database");
    match new_ingredient.insert(&state.db).await {
        Ok(ingredient_model) => {
            info!(
                "Ingredient created successfully with ID: {}, name: {}",
                ingredient_model.id, ingredient_model.name
            );
            let response = ApiResponse {
                data: IngredientResponse::from(ingredient_model),
                message: "Ingredient created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create ingredient '{}': {}", request.name, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error while creating ingredient".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
