use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection};
use uuid::Uuid;

use engine::{Engine, users};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn seed_user(db: &DatabaseConnection, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let user = users::ActiveModel {
        id: ActiveValue::Set(id.to_string()),
        email: ActiveValue::Set(email.to_string()),
        created_at: ActiveValue::Set(now),
        last_seen_at: ActiveValue::Set(now),
    };
    user.insert(db).await.unwrap();
    id
}

/// Fresh engine with one user, one budget and one checking account.
pub async fn engine_with_budget() -> (Engine, DatabaseConnection, Uuid, Uuid, Uuid) {
    let (engine, db) = engine_with_db().await;
    let user_id = seed_user(&db, "alice@example.com").await;
    let budget = engine.new_budget("Main", "EUR", user_id).await.unwrap();
    let account = engine
        .new_account(budget.id, user_id, "Checking", "checking", None)
        .await
        .unwrap();
    (engine, db, user_id, budget.id, account.id)
}
