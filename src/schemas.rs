use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::create_token,
        crate::handlers::users::get_me,
        crate::handlers::users::update_me,
        crate::handlers::tags::get_tags,
        crate::handlers::tags::create_tag,
        crate::handlers::ingredients::get_ingredients,
        crate::handlers::ingredients::create_ingredient,
        crate::handlers::recipes::get_recipes,
        crate::handlers::recipes::create_recipe,
        crate::handlers::recipes::get_recipe,
        crate::handlers::recipes::update_recipe,
        crate::handlers::recipes::delete_recipe,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::users::UserResponse>,
            ApiResponse<crate::handlers::users::TokenResponse>,
            ApiResponse<crate::handlers::tags::TagResponse>,
            ApiResponse<Vec<crate::handlers::tags::TagResponse>>,
            ApiResponse<crate::handlers::ingredients::IngredientResponse>,
            ApiResponse<Vec<crate::handlers::ingredients::IngredientResponse>>,
            ApiResponse<crate::handlers::recipes::RecipeResponse>,
            ApiResponse<Vec<crate::handlers::recipes::RecipeResponse>>,
            ApiResponse<String>,
            ErrorResponse,
            HealthResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::CreateTokenRequest,
            crate::handlers::users::UpdateMeRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::users::TokenResponse,
            crate::handlers::tags::CreateTagRequest,
            crate::handlers::tags::TagResponse,
            crate::handlers::ingredients::CreateIngredientRequest,
            crate::handlers::ingredients::IngredientResponse,
            crate::handlers::recipes::CreateRecipeRequest,
            crate::handlers::recipes::UpdateRecipeRequest,
            crate::handlers::recipes::RecipeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User registration, token issuance and profile management"),
        (name = "tags", description = "Recipe tag endpoints"),
        (name = "ingredients", description = "Recipe ingredient endpoints"),
        (name = "recipes", description = "Recipe CRUD endpoints"),
    ),
    info(
        title = "RecipeBox API",
        description = "Recipe management API - user accounts with token authentication and per-user recipes, tags and ingredients",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Registers the bearer token security scheme used by the protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
