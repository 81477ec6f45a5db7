#[cfg(test)]
pub mod test_utils {
    use crate::auth::issue_token;
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        AppState { db }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// This function sets up a tracing subscriber that outputs logs to STDERR,
    /// which is useful for debugging tests. The log level is determined by the
    /// RUST_LOG environment variable, defaulting to WARN if not set.
    ///
    /// The subscriber is installed globally; in later calls the install is a
    /// no-op since only the first global subscriber wins.
    fn init_test_tracing() {
        // Get log level from environment variable or default to WARN
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let (router, _) = setup_test_app_with_state().await;
        router
    }

    /// Create axum app for testing, keeping a handle on the state so tests
    /// can inspect or seed the database directly.
    pub async fn setup_test_app_with_state() -> (Router, AppState) {
        // Initialize tracing for tests
        init_test_tracing();

        let state = setup_test_app_state().await;
        println!("Test database setup complete");
        let router = create_router(state.clone());
        println!("Test router created");
        (router, state)
    }

    /// Register a user directly in the database and issue a token for it.
    pub async fn create_user_and_token(
        db: &DatabaseConnection,
        email: &str,
        password: &str,
    ) -> (model::entities::user::Model, String) {
        let user = model::entities::user::create_user(db, email, password, "Test User")
            .await
            .expect("Failed to create test user");
        let token = issue_token(db, user.id)
            .await
            .expect("Failed to issue test token");
        (user, token)
    }
}
