//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the recipe management application here:
//! user accounts, their opaque API tokens, and the per-user domain
//! records (tags, ingredients, recipes) with their join tables.

pub mod api_token;
pub mod ingredient;
pub mod recipe;
pub mod recipe_ingredient;
pub mod recipe_tag;
pub mod tag;
pub mod user;

// Define join tables for many-to-many relationships.
// SeaORM uses these to understand how to link entities.
pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::api_token::Entity as ApiToken;
    pub use super::ingredient::Entity as Ingredient;
    pub use super::recipe::Entity as Recipe;
    pub use super::recipe_ingredient::Entity as RecipeIngredient;
    pub use super::recipe_tag::Entity as RecipeTag;
    pub use super::tag::Entity as Tag;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        // Setup database
        let db = setup_db().await?;

        // Create users through the factory
        let user1 = user::create_user(&db, "user1@gmail.com", "testpass", "User One")
            .await
            .expect("Failed to create user1");
        let user2 = user::create_user(&db, "user2@gmail.com", "testpass", "User Two")
            .await
            .expect("Failed to create user2");

        // Create tags for each user
        let tag1 = tag::ActiveModel {
            name: Set("Vegan".to_string()),
            user_id: Set(user1.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let tag2 = tag::ActiveModel {
            name: Set("Dessert".to_string()),
            user_id: Set(user2.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create ingredients
        let ingredient1 = ingredient::ActiveModel {
            name: Set("Salt".to_string()),
            user_id: Set(user1.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let ingredient2 = ingredient::ActiveModel {
            name: Set("Sugar".to_string()),
            user_id: Set(user2.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create a recipe for user1
        let recipe1 = recipe::ActiveModel {
            title: Set("Avocado toast".to_string()),
            user_id: Set(user1.id),
            time_minutes: Set(10),
            price: Set(Decimal::new(550, 2)), // 5.50
            link: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Link recipe to user1's tag and ingredient
        recipe_tag::ActiveModel {
            recipe_id: Set(recipe1.id),
            tag_id: Set(tag1.id),
        }
        .insert(&db)
        .await?;

        recipe_ingredient::ActiveModel {
            recipe_id: Set(recipe1.id),
            ingredient_id: Set(ingredient1.id),
        }
        .insert(&db)
        .await?;

        // Issue a token for user1
        let token1 = api_token::ActiveModel {
            user_id: Set(user1.id),
            token: Set("sometoken".to_string()),
            created_at: Set(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify data

        // Verify users
        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.email == "user1@gmail.com"));
        assert!(users.iter().any(|u| u.email == "user2@gmail.com"));

        // Verify per-user scoping of tags
        let user1_tags = Tag::find()
            .filter(tag::Column::UserId.eq(user1.id))
            .all(&db)
            .await?;
        assert_eq!(user1_tags.len(), 1);
        assert_eq!(user1_tags[0].id, tag1.id);
        assert_eq!(user1_tags[0].name, "Vegan");

        let user2_tags = Tag::find()
            .filter(tag::Column::UserId.eq(user2.id))
            .all(&db)
            .await?;
        assert_eq!(user2_tags.len(), 1);
        assert_eq!(user2_tags[0].id, tag2.id);

        // Verify per-user scoping of ingredients
        let user1_ingredients = Ingredient::find()
            .filter(ingredient::Column::UserId.eq(user1.id))
            .all(&db)
            .await?;
        assert_eq!(user1_ingredients.len(), 1);
        assert_eq!(user1_ingredients[0].id, ingredient1.id);
        assert_ne!(user1_ingredients[0].id, ingredient2.id);

        // Verify the recipe and its links
        let recipes = Recipe::find()
            .filter(recipe::Column::UserId.eq(user1.id))
            .all(&db)
            .await?;
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].title, "Avocado toast");
        assert_eq!(recipes[0].price, Decimal::new(550, 2));

        let recipe_tags = RecipeTag::find()
            .filter(recipe_tag::Column::RecipeId.eq(recipe1.id))
            .all(&db)
            .await?;
        assert_eq!(recipe_tags.len(), 1);
        assert_eq!(recipe_tags[0].tag_id, tag1.id);

        let recipe_ingredients = RecipeIngredient::find()
            .filter(recipe_ingredient::Column::RecipeId.eq(recipe1.id))
            .all(&db)
            .await?;
        assert_eq!(recipe_ingredients.len(), 1);
        assert_eq!(recipe_ingredients[0].ingredient_id, ingredient1.id);

        // Verify the token row points back at its user
        let tokens = ApiToken::find()
            .filter(api_token::Column::UserId.eq(user1.id))
            .all(&db)
            .await?;
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].id, token1.id);
        assert_eq!(tokens[0].token, "sometoken");

        // Test relationships using the Related trait: tags of recipe1
        let linked_tags = recipe1.find_related(Tag).all(&db).await?;
        assert_eq!(linked_tags.len(), 1);
        assert_eq!(linked_tags[0].id, tag1.id);

        let linked_ingredients = recipe1.find_related(Ingredient).all(&db).await?;
        assert_eq!(linked_ingredients.len(), 1);
        assert_eq!(linked_ingredients[0].id, ingredient1.id);

        // Join rows resolve back to their tag and ingredient
        let tags_of_link = recipe_tags[0].find_related(Tag).all(&db).await?;
        assert_eq!(tags_of_link.len(), 1);
        assert_eq!(tags_of_link[0].name, "Vegan");

        let ingredients_of_link = recipe_ingredients[0].find_related(Ingredient).all(&db).await?;
        assert_eq!(ingredients_of_link.len(), 1);
        assert_eq!(ingredients_of_link[0].name, "Salt");

        Ok(())
    }

    #[tokio::test]
    async fn test_deleting_user_cascades_to_owned_records() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let user = user::create_user(&db, "owner@gmail.com", "testpass", "Owner")
            .await
            .expect("Failed to create user");

        tag::ActiveModel {
            name: Set("Breakfast".to_string()),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        ingredient::ActiveModel {
            name: Set("Eggs".to_string()),
            user_id: Set(user.id),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        User::delete_by_id(user.id).exec(&db).await?;

        assert_eq!(Tag::find().all(&db).await?.len(), 0);
        assert_eq!(Ingredient::find().all(&db).await?.len(), 0);

        Ok(())
    }
}
