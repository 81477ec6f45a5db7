use super::{ingredient, recipe};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recipes_ingredients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub recipe_id: i32,
    #[sea_orm(primary_key)]
    pub ingredient_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "recipe::Entity",
        from = "Column::RecipeId",
        to = "recipe::Column::Id"
    )]
    Recipe,
    #[sea_orm(
        belongs_to = "ingredient::Entity",
        from = "Column::IngredientId",
        to = "ingredient::Column::Id"
    )]
    Ingredient,
}

impl Related<recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipe.def()
    }
}

impl Related<ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
