use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, Set};
use thiserror::Error;

/// Errors produced by the user account factory.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("users must have an email address")]
    MissingEmail,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Represents a user account that owns tags, ingredients and recipes.
/// Passwords are only ever stored as bcrypt hashes.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Stored lowercased; lookups go through the normalized form.
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::api_token::Entity")]
    ApiToken,
    #[sea_orm(has_many = "super::tag::Entity")]
    Tag,
    #[sea_orm(has_many = "super::ingredient::Entity")]
    Ingredient,
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipe,
}

impl ActiveModelBehavior for ActiveModel {}

/// Normalizes an email address for storage. Empty input is rejected.
fn normalize_email(email: &str) -> Result<String, UserError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(UserError::MissingEmail);
    }
    Ok(email.to_lowercase())
}

/// Hashes a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, UserError> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Creates a regular user with a normalized email and a hashed password.
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
    name: &str,
) -> Result<Model, UserError> {
    let user = ActiveModel {
        email: Set(normalize_email(email)?),
        password_hash: Set(hash_password(password)?),
        name: Set(name.to_string()),
        is_active: Set(true),
        is_staff: Set(false),
        is_superuser: Set(false),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

/// Creates a superuser. Same normalization and hashing as `create_user`,
/// with the staff and superuser flags set.
pub async fn create_superuser<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> Result<Model, UserError> {
    let user = ActiveModel {
        email: Set(normalize_email(email)?),
        password_hash: Set(hash_password(password)?),
        name: Set(String::new()),
        is_active: Set(true),
        is_staff: Set(true),
        is_superuser: Set(true),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

impl Model {
    /// Checks a plaintext password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::SqliteQueryBuilder;
    use sea_orm::{Database, DatabaseConnection, DbBackend, Schema, Statement};

    async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        // Create the users table
        let schema = Schema::new(DbBackend::Sqlite);
        let stmt = schema.create_table_from_entity(Entity);
        let statement =
            Statement::from_string(DbBackend::Sqlite, stmt.to_string(SqliteQueryBuilder));
        db.execute(statement).await.unwrap();

        db
    }

    #[tokio::test]
    async fn test_create_user_with_email_successful() {
        let db = setup_test_db().await;

        let user = create_user(&db, "luke@gmail.com", "testpass", "Luke Skywalker")
            .await
            .unwrap();

        assert_eq!(user.email, "luke@gmail.com");
        assert_eq!(user.name, "Luke Skywalker");
        assert!(user.is_active);
        assert!(!user.is_staff);
        assert!(!user.is_superuser);
        // The stored hash verifies against the original password and
        // never equals the plaintext.
        assert!(user.verify_password("testpass"));
        assert!(!user.verify_password("wrongpass"));
        assert_ne!(user.password_hash, "testpass");
    }

    #[tokio::test]
    async fn test_new_user_email_normalized() {
        let db = setup_test_db().await;

        let user = create_user(&db, "Luke@GMAIL.COM", "testpass", "")
            .await
            .unwrap();

        assert_eq!(user.email, "luke@gmail.com");
    }

    #[tokio::test]
    async fn test_new_user_invalid_email() {
        let db = setup_test_db().await;

        let result = create_user(&db, "", "testpass", "").await;
        assert!(matches!(result, Err(UserError::MissingEmail)));

        let result = create_user(&db, "   ", "testpass", "").await;
        assert!(matches!(result, Err(UserError::MissingEmail)));
    }

    #[tokio::test]
    async fn test_create_new_superuser() {
        let db = setup_test_db().await;

        let user = create_superuser(&db, "admin@gmail.com", "admin123")
            .await
            .unwrap();

        assert!(user.is_superuser);
        assert!(user.is_staff);
        assert!(user.verify_password("admin123"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = setup_test_db().await;

        create_user(&db, "han@gmail.com", "testpass", "Han Solo")
            .await
            .unwrap();
        let result = create_user(&db, "han@gmail.com", "otherpass", "Other Han").await;

        assert!(matches!(result, Err(UserError::Db(_))));
    }
}
