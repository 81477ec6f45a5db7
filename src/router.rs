use crate::auth::require_auth;
use crate::handlers::{
    health::health_check,
    ingredients::{create_ingredient, get_ingredients},
    recipes::{create_recipe, delete_recipe, get_recipe, get_recipes, update_recipe},
    tags::{create_tag, get_tags},
    users::{create_token, create_user, get_me, update_me},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Routes behind token authentication
    let protected = Router::new()
        .route("/api/v1/users/me", get(get_me))
        .route("/api/v1/users/me", put(update_me))
        .route("/api/v1/tags", get(get_tags))
        .route("/api/v1/tags", post(create_tag))
        .route("/api/v1/ingredients", get(get_ingredients))
        .route("/api/v1/ingredients", post(create_ingredient))
        .route("/api/v1/recipes", get(get_recipes))
        .route("/api/v1/recipes", post(create_recipe))
        .route("/api/v1/recipes/:recipe_id", get(get_recipe))
        .route("/api/v1/recipes/:recipe_id", put(update_recipe))
        .route("/api/v1/recipes/:recipe_id", delete(delete_recipe))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Public user routes (registration and token issuance)
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users/token", post(create_token))
        .merge(protected)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
