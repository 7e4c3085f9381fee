//! In-process store used by the test suite in place of Postgres.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::{repo::UserRepo, repo_types::User},
    error::StoreError,
    habits::{
        repo::HabitRepo,
        repo_types::{Habit, HabitDraft},
    },
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    emails: HashMap<String, Uuid>,
    habits: BTreeMap<i64, Habit>,
    next_habit_id: i64,
}

/// In-process store with the same contract as the Postgres repositories.
/// One lock guards all tables, which makes every check-and-write atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deletes a user but leaves their habits behind, orphaned.
    pub fn remove_user(&self, id: Uuid) {
        let mut t = self.lock();
        if let Some(user) = t.users.remove(&id) {
            t.emails.remove(&user.email);
        }
    }
}

fn stamp(draft: &HabitDraft, id: i64, user_id: Uuid) -> Habit {
    Habit {
        id,
        user_id,
        name: draft.name.clone(),
        category: draft.category.clone(),
        frequency: draft.frequency,
        completed_days: draft.completed_days,
    }
}

impl Tables {
    fn owned(&self, owner: Uuid, id: i64) -> Option<&Habit> {
        if !self.users.contains_key(&owner) {
            return None;
        }
        self.habits.get(&id).filter(|h| h.user_id == owner)
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut t = self.lock();
        if t.emails.contains_key(email) {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.emails.insert(user.email.clone(), user.id);
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.lock();
        Ok(t.emails.get(email).and_then(|id| t.users.get(id)).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }
}

#[async_trait]
impl HabitRepo for MemoryStore {
    async fn list(&self, owner: Uuid) -> Result<Vec<Habit>, StoreError> {
        let t = self.lock();
        if !t.users.contains_key(&owner) {
            return Ok(Vec::new());
        }
        Ok(t.habits.values().filter(|h| h.user_id == owner).cloned().collect())
    }

    async fn get(&self, owner: Uuid, id: i64) -> Result<Option<Habit>, StoreError> {
        Ok(self.lock().owned(owner, id).cloned())
    }

    async fn insert(&self, owner: Uuid, draft: &HabitDraft) -> Result<Option<Habit>, StoreError> {
        let mut t = self.lock();
        if !t.users.contains_key(&owner) {
            return Ok(None);
        }
        t.next_habit_id += 1;
        let habit = stamp(draft, t.next_habit_id, owner);
        t.habits.insert(habit.id, habit.clone());
        Ok(Some(habit))
    }

    async fn update(&self, owner: Uuid, id: i64, draft: &HabitDraft) -> Result<Option<Habit>, StoreError> {
        let mut t = self.lock();
        if t.owned(owner, id).is_none() {
            return Ok(None);
        }
        let habit = stamp(draft, id, owner);
        t.habits.insert(id, habit.clone());
        Ok(Some(habit))
    }

    async fn delete(&self, owner: Uuid, id: i64) -> Result<bool, StoreError> {
        let mut t = self.lock();
        if t.owned(owner, id).is_none() {
            return Ok(false);
        }
        Ok(t.habits.remove(&id).is_some())
    }
}
