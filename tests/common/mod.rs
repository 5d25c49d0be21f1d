use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;
use vendorhub_api::{config::AppConfig, db, migrator::Migrator, AppState};

/// Helper harness backed by a file-based SQLite database with a single
/// connection, so concurrent service calls exercise real serialization.
pub struct TestApp {
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("vendorhub_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let db = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("database connection");
        Migrator::up(&db, None).await.expect("migrations");

        Self {
            state: AppState::new(Arc::new(db), cfg, None),
            _dir: dir,
        }
    }
}
