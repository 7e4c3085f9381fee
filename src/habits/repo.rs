use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Habit, HabitDraft, HabitRow};
use crate::error::StoreError;

/// Owner-scoped habit storage. Every method filters on `owner`, and a habit
/// whose owner no longer exists is treated as absent. `None`/`false` means
/// "no such habit for this owner" regardless of whether the id exists.
#[async_trait]
pub trait HabitRepo: Send + Sync {
    async fn list(&self, owner: Uuid) -> Result<Vec<Habit>, StoreError>;
    async fn get(&self, owner: Uuid, id: i64) -> Result<Option<Habit>, StoreError>;
    /// Returns `None` if `owner` is not a live user.
    async fn insert(&self, owner: Uuid, draft: &HabitDraft) -> Result<Option<Habit>, StoreError>;
    async fn update(&self, owner: Uuid, id: i64, draft: &HabitDraft) -> Result<Option<Habit>, StoreError>;
    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgHabitRepo {
    db: PgPool,
}

impl PgHabitRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn convert(rows: Vec<HabitRow>) -> Result<Vec<Habit>, StoreError> {
    rows.into_iter().map(Habit::try_from).collect()
}

#[async_trait]
impl HabitRepo for PgHabitRepo {
    async fn list(&self, owner: Uuid) -> Result<Vec<Habit>, StoreError> {
        let rows = sqlx::query_as::<_, HabitRow>(
            r#"
            SELECT h.id, h.user_id, h.name, h.category, h.frequency, h.completed_days
              FROM habits h
              JOIN users u ON u.id = h.user_id
             WHERE h.user_id = $1
             ORDER BY h.id ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;
        convert(rows)
    }

    async fn get(&self, owner: Uuid, id: i64) -> Result<Option<Habit>, StoreError> {
        let row = sqlx::query_as::<_, HabitRow>(
            r#"
            SELECT h.id, h.user_id, h.name, h.category, h.frequency, h.completed_days
              FROM habits h
              JOIN users u ON u.id = h.user_id
             WHERE h.id = $1 AND h.user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;
        row.map(Habit::try_from).transpose()
    }

    async fn insert(&self, owner: Uuid, draft: &HabitDraft) -> Result<Option<Habit>, StoreError> {
        let row = sqlx::query_as::<_, HabitRow>(
            r#"
            INSERT INTO habits (user_id, name, category, frequency, completed_days)
            SELECT u.id, $2, $3, $4, $5
              FROM users u
             WHERE u.id = $1
            RETURNING id, user_id, name, category, frequency, completed_days
            "#,
        )
        .bind(owner)
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.frequency.as_str())
        .bind(draft.completed_days)
        .fetch_optional(&self.db)
        .await?;
        row.map(Habit::try_from).transpose()
    }

    async fn update(&self, owner: Uuid, id: i64, draft: &HabitDraft) -> Result<Option<Habit>, StoreError> {
        let row = sqlx::query_as::<_, HabitRow>(
            r#"
            UPDATE habits h
               SET name = $3, category = $4, frequency = $5, completed_days = $6
             WHERE h.id = $1 AND h.user_id = $2
               AND EXISTS (SELECT 1 FROM users u WHERE u.id = h.user_id)
            RETURNING h.id, h.user_id, h.name, h.category, h.frequency, h.completed_days
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&draft.name)
        .bind(&draft.category)
        .bind(draft.frequency.as_str())
        .bind(draft.completed_days)
        .fetch_optional(&self.db)
        .await?;
        row.map(Habit::try_from).transpose()
    }

    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool, StoreError> {
        let res = sqlx::query(
            r#"
            DELETE FROM habits h
             WHERE h.id = $1 AND h.user_id = $2
               AND EXISTS (SELECT 1 FROM users u WHERE u.id = h.user_id)
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() == 1)
    }
}
