use crate::auth::AuthenticatedUser;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use model::entities::{ingredient, recipe, recipe_ingredient, recipe_tag, tag};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for creating a new recipe
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateRecipeRequest {
    /// Recipe title
    pub title: String,
    /// Preparation time in minutes
    pub time_minutes: i32,
    /// Price as a decimal string (e.g. "5.50")
    pub price: Decimal,
    /// Optional external link
    pub link: Option<String>,
    /// IDs of tags to attach (must belong to the caller)
    #[serde(default)]
    pub tag_ids: Vec<i32>,
    /// IDs of ingredients to attach (must belong to the caller)
    #[serde(default)]
    pub ingredient_ids: Vec<i32>,
}

/// Request body for updating a recipe
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub link: Option<String>,
    /// When provided, replaces the full set of attached tags
    pub tag_ids: Option<Vec<i32>>,
    /// When provided, replaces the full set of attached ingredients
    pub ingredient_ids: Option<Vec<i32>>,
}

/// Recipe response model
#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub tag_ids: Vec<i32>,
    pub ingredient_ids: Vec<i32>,
}

impl RecipeResponse {
    fn from_parts(model: recipe::Model, tag_ids: Vec<i32>, ingredient_ids: Vec<i32>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            time_minutes: model.time_minutes,
            price: model.price,
            link: model.link,
            tag_ids,
            ingredient_ids,
        }
    }
}

fn bad_request(error: String, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
            success: false,
        }),
    )
}

fn internal_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}

/// Check that every referenced tag exists and belongs to the given user.
async fn all_tags_owned(db: &DatabaseConnection, user_id: i32, ids: &[i32]) -> Result<bool, DbErr> {
    if ids.is_empty() {
        return Ok(true);
    }
    let count = tag::Entity::find()
        .filter(tag::Column::UserId.eq(user_id))
        .filter(tag::Column::Id.is_in(ids.to_vec()))
        .count(db)
        .await?;
    Ok(count as usize == ids.len())
}

/// Check that every referenced ingredient exists and belongs to the given user.
async fn all_ingredients_owned(
    db: &DatabaseConnection,
    user_id: i32,
    ids: &[i32],
) -> Result<bool, DbErr> {
    if ids.is_empty() {
        return Ok(true);
    }
    let count = ingredient::Entity::find()
        .filter(ingredient::Column::UserId.eq(user_id))
        .filter(ingredient::Column::Id.is_in(ids.to_vec()))
        .count(db)
        .await?;
    Ok(count as usize == ids.len())
}

/// Load the tag and ingredient IDs linked to a recipe.
async fn load_linked_ids(
    db: &DatabaseConnection,
    recipe_id: i32,
) -> Result<(Vec<i32>, Vec<i32>), DbErr> {
    let tag_ids = recipe_tag::Entity::find()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.tag_id)
        .collect();

    let ingredient_ids = recipe_ingredient::Entity::find()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.ingredient_id)
        .collect();

    Ok((tag_ids, ingredient_ids))
}

/// Replace the tag links of a recipe with the given set.
async fn replace_tag_links(
    db: &DatabaseConnection,
    recipe_id: i32,
    tag_ids: &[i32],
) -> Result<(), DbErr> {
    recipe_tag::Entity::delete_many()
        .filter(recipe_tag::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    for tag_id in tag_ids {
        recipe_tag::ActiveModel {
            recipe_id: Set(recipe_id),
            tag_id: Set(*tag_id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Replace the ingredient links of a recipe with the given set.
async fn replace_ingredient_links(
    db: &DatabaseConnection,
    recipe_id: i32,
    ingredient_ids: &[i32],
) -> Result<(), DbErr> {
    recipe_ingredient::Entity::delete_many()
        .filter(recipe_ingredient::Column::RecipeId.eq(recipe_id))
        .exec(db)
        .await?;
    for ingredient_id in ingredient_ids {
        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe_id),
            ingredient_id: Set(*ingredient_id),
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

/// Find a recipe by ID scoped to its owner. Other users' recipes look absent.
async fn find_owned_recipe(
    db: &DatabaseConnection,
    recipe_id: i32,
    user_id: i32,
) -> Result<Option<recipe::Model>, DbErr> {
    recipe::Entity::find_by_id(recipe_id)
        .filter(recipe::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// List the authenticated user's recipes
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    tag = "recipes",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Recipes retrieved successfully", body = ApiResponse<Vec<RecipeResponse>>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_recipes(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RecipeResponse>>>, StatusCode> {
    trace!("Entering get_recipes function for user_id: {}", auth_user.id);
    debug!("Fetching recipes for user {}", auth_user.id);

    let recipes = match recipe::Entity::find()
        .filter(recipe::Column::UserId.eq(auth_user.id))
        .order_by_desc(recipe::Column::Id)
        .all(&state.db)
        .await
    {
        Ok(recipes) => recipes,
        Err(db_error) => {
            error!("Failed to retrieve recipes for user {}: {}", auth_user.id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let recipe_count = recipes.len();
    debug!("Retrieved {} recipes for user {}", recipe_count, auth_user.id);

    let mut recipe_responses = Vec::with_capacity(recipe_count);
    for recipe_model in recipes {
        let (tag_ids, ingredient_ids) = match load_linked_ids(&state.db, recipe_model.id).await {
            Ok(ids) => ids,
            Err(db_error) => {
                error!("Failed to load links for recipe {}: {}", recipe_model.id, db_error);
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };
        recipe_responses.push(RecipeResponse::from_parts(recipe_model, tag_ids, ingredient_ids));
    }

    info!("Successfully retrieved {} recipes", recipe_count);
    Ok(Json(ApiResponse {
        data: recipe_responses,
        message: "Recipes retrieved successfully".to_string(),
        success: true,
    }))
}

/// Create a new recipe owned by the authenticated user
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    tag = "recipes",
    security(("bearer_token" = [])),
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = ApiResponse<RecipeResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_recipe(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Json(request): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RecipeResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_recipe function for user_id: {}", auth_user.id);
    debug!("Creating recipe '{}' for user {}", request.title, auth_user.id);

    if request.title.trim().is_empty() {
        warn!("Recipe creation rejected: empty title");
        return Err(bad_request(
            "Recipe title must not be empty".to_string(),
            "VALIDATION_ERROR",
        ));
    }

    match all_tags_owned(&state.db, auth_user.id, &request.tag_ids).await {
        Ok(true) => {}
        Ok(false) => {
            warn!("Recipe creation rejected: tag not owned by user {}", auth_user.id);
            return Err(bad_request(
                "One or more tags do not exist".to_string(),
                "INVALID_TAG_ID",
            ));
        }
        Err(db_error) => {
            error!("Failed to validate tags: {}", db_error);
            return Err(internal_error("Internal server error while creating recipe"));
        }
    }

    match all_ingredients_owned(&state.db, auth_user.id, &request.ingredient_ids).await {
        Ok(true) => {}
        Ok(false) => {
            warn!(
                "Recipe creation rejected: ingredient not owned by user {}",
                auth_user.id
            );
            return Err(bad_request(
                "One or more ingredients do not exist".to_string(),
                "INVALID_INGREDIENT_ID",
            ));
        }
        Err(db_error) => {
            error!("Failed to validate ingredients: {}", db_error);
            return Err(internal_error("Internal server error while creating recipe"));
        }
    }

    let new_recipe = recipe::ActiveModel {
        title: Set(request.title.clone()),
        user_id: Set(auth_user.id),
        time_minutes: Set(request.time_minutes),
        price: Set(request.price),
        link: Set(request.link.clone()),
        ..Default::default()
    };

    trace!("Attempting to insert new recipe into database");
    let recipe_model = match new_recipe.insert(&state.db).await {
        Ok(recipe_model) => recipe_model,
        Err(db_error) => {
            error!("Failed to create recipe '{}': {}", request.title, db_error);
            return Err(internal_error("Internal server error while creating recipe"));
        }
    };

    if let Err(db_error) = replace_tag_links(&state.db, recipe_model.id, &request.tag_ids).await {
        error!("Failed to link tags to recipe {}: {}", recipe_model.id, db_error);
        return Err(internal_error("Internal server error while creating recipe"));
    }
    if let Err(db_error) =
        replace_ingredient_links(&state.db, recipe_model.id, &request.ingredient_ids).await
    {
        error!(
            "Failed to link ingredients to recipe {}: {}",
            recipe_model.id, db_error
        );
        return Err(internal_error("Internal server error while creating recipe"));
    }

    info!(
        "Recipe created successfully with ID: {}, title: {}",
        recipe_model.id, recipe_model.title
    );
    let response = ApiResponse {
        data: RecipeResponse::from_parts(
            recipe_model,
            request.tag_ids,
            request.ingredient_ids,
        ),
        message: "Recipe created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a specific recipe by ID
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{recipe_id}",
    tag = "recipes",
    security(("bearer_token" = [])),
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 200, description = "Recipe retrieved successfully", body = ApiResponse<RecipeResponse>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_recipe(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(recipe_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RecipeResponse>>, StatusCode> {
    trace!("Entering get_recipe function for recipe_id: {}", recipe_id);
    debug!("Fetching recipe {} for user {}", recipe_id, auth_user.id);

    match find_owned_recipe(&state.db, recipe_id, auth_user.id).await {
        Ok(Some(recipe_model)) => {
            let (tag_ids, ingredient_ids) = match load_linked_ids(&state.db, recipe_model.id).await
            {
                Ok(ids) => ids,
                Err(db_error) => {
                    error!("Failed to load links for recipe {}: {}", recipe_id, db_error);
                    return Err(StatusCode::INTERNAL_SERVER_ERROR);
                }
            };
            info!("Successfully retrieved recipe with ID: {}", recipe_id);
            Ok(Json(ApiResponse {
                data: RecipeResponse::from_parts(recipe_model, tag_ids, ingredient_ids),
                message: "Recipe retrieved successfully".to_string(),
                success: true,
            }))
        }
        Ok(None) => {
            warn!("Recipe {} not found for user {}", recipe_id, auth_user.id);
            Err(StatusCode::NOT_FOUND)
        }
        Err(db_error) => {
            error!("Failed to retrieve recipe {}: {}", recipe_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Update a recipe
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{recipe_id}",
    tag = "recipes",
    security(("bearer_token" = [])),
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = ApiResponse<RecipeResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_recipe(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(recipe_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateRecipeRequest>,
) -> Result<Json<ApiResponse<RecipeResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_recipe function for recipe_id: {}", recipe_id);
    debug!("Updating recipe {} for user {}", recipe_id, auth_user.id);

    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Recipe not found".to_string(),
                code: "NOT_FOUND".to_string(),
                success: false,
            }),
        )
    };

    let existing_recipe = match find_owned_recipe(&state.db, recipe_id, auth_user.id).await {
        Ok(Some(recipe_model)) => recipe_model,
        Ok(None) => {
            warn!("Recipe {} not found for user {}", recipe_id, auth_user.id);
            return Err(not_found());
        }
        Err(db_error) => {
            error!("Failed to look up recipe {}: {}", recipe_id, db_error);
            return Err(internal_error("Internal server error while updating recipe"));
        }
    };

    if let Some(ref title) = request.title {
        if title.trim().is_empty() {
            warn!("Recipe update rejected: empty title");
            return Err(bad_request(
                "Recipe title must not be empty".to_string(),
                "VALIDATION_ERROR",
            ));
        }
    }

    if let Some(ref tag_ids) = request.tag_ids {
        match all_tags_owned(&state.db, auth_user.id, tag_ids).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Recipe update rejected: tag not owned by user {}", auth_user.id);
                return Err(bad_request(
                    "One or more tags do not exist".to_string(),
                    "INVALID_TAG_ID",
                ));
            }
            Err(db_error) => {
                error!("Failed to validate tags: {}", db_error);
                return Err(internal_error("Internal server error while updating recipe"));
            }
        }
    }

    if let Some(ref ingredient_ids) = request.ingredient_ids {
        match all_ingredients_owned(&state.db, auth_user.id, ingredient_ids).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(
                    "Recipe update rejected: ingredient not owned by user {}",
                    auth_user.id
                );
                return Err(bad_request(
                    "One or more ingredients do not exist".to_string(),
                    "INVALID_INGREDIENT_ID",
                ));
            }
            Err(db_error) => {
                error!("Failed to validate ingredients: {}", db_error);
                return Err(internal_error("Internal server error while updating recipe"));
            }
        }
    }

    let mut recipe_active: recipe::ActiveModel = existing_recipe.into();

    if let Some(title) = request.title {
        recipe_active.title = Set(title);
    }
    if let Some(time_minutes) = request.time_minutes {
        recipe_active.time_minutes = Set(time_minutes);
    }
    if let Some(price) = request.price {
        recipe_active.price = Set(price);
    }
    if let Some(link) = request.link {
        recipe_active.link = Set(Some(link));
    }

    trace!("Attempting to update recipe in database");
    let updated_recipe = match recipe_active.update(&state.db).await {
        Ok(updated_recipe) => updated_recipe,
        Err(db_error) => {
            error!("Failed to update recipe {}: {}", recipe_id, db_error);
            return Err(internal_error("Internal server error while updating recipe"));
        }
    };

    if let Some(ref tag_ids) = request.tag_ids {
        if let Err(db_error) = replace_tag_links(&state.db, updated_recipe.id, tag_ids).await {
            error!("Failed to relink tags for recipe {}: {}", recipe_id, db_error);
            return Err(internal_error("Internal server error while updating recipe"));
        }
    }
    if let Some(ref ingredient_ids) = request.ingredient_ids {
        if let Err(db_error) =
            replace_ingredient_links(&state.db, updated_recipe.id, ingredient_ids).await
        {
            error!(
                "Failed to relink ingredients for recipe {}: {}",
                recipe_id, db_error
            );
            return Err(internal_error("Internal server error while updating recipe"));
        }
    }

    let (tag_ids, ingredient_ids) = match load_linked_ids(&state.db, updated_recipe.id).await {
        Ok(ids) => ids,
        Err(db_error) => {
            error!("Failed to load links for recipe {}: {}", recipe_id, db_error);
            return Err(internal_error("Internal server error while updating recipe"));
        }
    };

    info!("Recipe with ID {} updated successfully", recipe_id);
    Ok(Json(ApiResponse {
        data: RecipeResponse::from_parts(updated_recipe, tag_ids, ingredient_ids),
        message: "Recipe updated successfully".to_string(),
        success: true,
    }))
}

/// Delete a recipe
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{recipe_id}",
    tag = "recipes",
    security(("bearer_token" = [])),
    params(
        ("recipe_id" = i32, Path, description = "Recipe ID"),
    ),
    responses(
        (status = 200, description = "Recipe deleted successfully", body = ApiResponse<String>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_recipe(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(recipe_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, StatusCode> {
    trace!("Entering delete_recipe function for recipe_id: {}", recipe_id);
    debug!("Attempting to delete recipe {} for user {}", recipe_id, auth_user.id);

    match find_owned_recipe(&state.db, recipe_id, auth_user.id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Recipe {} not found for user {}", recipe_id, auth_user.id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(db_error) => {
            error!("Failed to look up recipe {}: {}", recipe_id, db_error);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    match recipe::Entity::delete_by_id(recipe_id).exec(&state.db).await {
        Ok(delete_result) => {
            debug!(
                "Delete operation completed. Rows affected: {}",
                delete_result.rows_affected
            );
            info!("Recipe with ID {} deleted successfully", recipe_id);
            Ok(Json(ApiResponse {
                data: format!("Recipe {} deleted", recipe_id),
                message: "Recipe deleted successfully".to_string(),
                success: true,
            }))
        }
        Err(db_error) => {
            error!("Failed to delete recipe {}: {}", recipe_id, db_error);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
