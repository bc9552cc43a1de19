use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::{course, user};

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn seed_person(db: &DatabaseConnection, name: &str, role: user::Role) -> user::Model {
    user::Model::create(db, name, role, true)
        .await
        .expect("Failed to seed person")
}

pub async fn seed_course(db: &DatabaseConnection, name: &str) -> course::Model {
    course::Model::create(db, name)
        .await
        .expect("Failed to seed course")
}
