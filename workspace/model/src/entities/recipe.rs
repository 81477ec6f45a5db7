use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use std::fmt;

/// A recipe owned by a single user. Tags and ingredients are attached
/// through the `recipes_tags` and `recipes_ingredients` join tables.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    /// The user who owns this recipe.
    pub user_id: i32,
    /// Preparation time in minutes.
    pub time_minutes: i32,
    /// Estimated cost of the recipe.
    pub price: Decimal,
    /// Optional link to an external source for the recipe.
    pub link: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::recipe_tag::Entity")]
    RecipeTag,
    #[sea_orm(has_many = "super::recipe_ingredient::Entity")]
    RecipeIngredient,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::recipe_tag::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::recipe_tag::Relation::Recipe.def().rev())
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        super::recipe_ingredient::Relation::Ingredient.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::recipe_ingredient::Relation::Recipe.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_str() {
        let recipe = Model {
            id: 1,
            title: "Steak and mushroom sauce".to_string(),
            user_id: 1,
            time_minutes: 5,
            price: Decimal::new(500, 2),
            link: None,
        };
        assert_eq!(recipe.to_string(), recipe.title);
    }
}
