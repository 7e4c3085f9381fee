use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::HabitRequest,
    repo::HabitRepo,
    repo_types::{Frequency, Habit, HabitDraft},
};
use crate::error::AppError;

/// Whether a missing `completedDays` defaults to zero (create) or is an error
/// (full replace).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterPolicy {
    DefaultZero,
    Required,
}

pub fn validate(req: HabitRequest, policy: CounterPolicy) -> Result<HabitDraft, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::invalid("Name is required."));
    }

    let frequency: Frequency = req
        .frequency
        .parse()
        .map_err(|e| AppError::invalid(format!("{e}.")))?;

    let completed_days = match (req.completed_days, policy) {
        (Some(n), _) => n,
        (None, CounterPolicy::DefaultZero) => 0,
        (None, CounterPolicy::Required) => {
            return Err(AppError::invalid("completedDays is required."))
        }
    };
    if completed_days < 0 {
        return Err(AppError::invalid("completedDays must not be negative."));
    }

    let category = req
        .category
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty());

    Ok(HabitDraft {
        name: name.to_owned(),
        category,
        frequency,
        completed_days,
    })
}

pub async fn list(repo: &dyn HabitRepo, owner: Uuid) -> Result<Vec<Habit>, AppError> {
    Ok(repo.list(owner).await?)
}

pub async fn get(repo: &dyn HabitRepo, owner: Uuid, id: i64) -> Result<Habit, AppError> {
    repo.get(owner, id).await?.ok_or(AppError::NotFound)
}

pub async fn create(repo: &dyn HabitRepo, owner: Uuid, req: HabitRequest) -> Result<Habit, AppError> {
    let draft = validate(req, CounterPolicy::DefaultZero)?;
    let Some(habit) = repo.insert(owner, &draft).await? else {
        warn!(user_id = %owner, "create habit for unknown owner");
        return Err(AppError::Unauthenticated);
    };
    info!(user_id = %owner, habit_id = habit.id, "habit created");
    Ok(habit)
}

pub async fn update(
    repo: &dyn HabitRepo,
    owner: Uuid,
    id: i64,
    req: HabitRequest,
) -> Result<Habit, AppError> {
    let draft = validate(req, CounterPolicy::Required)?;
    let habit = repo.update(owner, id, &draft).await?.ok_or(AppError::NotFound)?;
    info!(user_id = %owner, habit_id = id, "habit updated");
    Ok(habit)
}

pub async fn delete(repo: &dyn HabitRepo, owner: Uuid, id: i64) -> Result<(), AppError> {
    if !repo.delete(owner, id).await? {
        return Err(AppError::NotFound);
    }
    info!(user_id = %owner, habit_id = id, "habit deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::repo::UserRepo, memory::MemoryStore};

    fn req(name: &str, frequency: &str, completed_days: Option<i32>) -> HabitRequest {
        HabitRequest {
            name: name.into(),
            category: None,
            frequency: frequency.into(),
            completed_days,
        }
    }

    async fn two_owners(store: &MemoryStore) -> (Uuid, Uuid) {
        let a = UserRepo::insert(store, "a@x.com", "hash-a").await.unwrap();
        let b = UserRepo::insert(store, "b@x.com", "hash-b").await.unwrap();
        (a.id, b.id)
    }

    #[test]
    fn validate_trims_and_defaults() {
        let draft = validate(
            HabitRequest {
                name: "  Read  ".into(),
                category: Some("   ".into()),
                frequency: "weekly".into(),
                completed_days: None,
            },
            CounterPolicy::DefaultZero,
        )
        .unwrap();
        assert_eq!(draft.name, "Read");
        assert_eq!(draft.category, None);
        assert_eq!(draft.frequency, Frequency::Weekly);
        assert_eq!(draft.completed_days, 0);
    }

    #[test]
    fn validate_rejects_bad_input() {
        for (r, policy) in [
            (req("   ", "Daily", Some(0)), CounterPolicy::DefaultZero),
            (req("Run", "Hourly", Some(0)), CounterPolicy::DefaultZero),
            (req("Run", "", Some(0)), CounterPolicy::DefaultZero),
            (req("Run", "Daily", Some(-1)), CounterPolicy::DefaultZero),
            (req("Run", "Daily", None), CounterPolicy::Required),
        ] {
            assert!(matches!(validate(r, policy), Err(AppError::InvalidInput(_))));
        }
    }

    #[tokio::test]
    async fn invalid_create_persists_nothing() {
        let store = MemoryStore::new();
        let (a, _) = two_owners(&store).await;
        assert!(create(&store, a, req("", "Daily", None)).await.is_err());
        assert!(create(&store, a, req("Run", "Yearly", None)).await.is_err());
        assert!(list(&store, a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owners_never_see_each_others_habits() {
        let store = MemoryStore::new();
        let (a, b) = two_owners(&store).await;
        let ha = create(&store, a, req("A habit", "Daily", None)).await.unwrap();
        let hb = create(&store, b, req("B habit", "Monthly", Some(4))).await.unwrap();
        assert_eq!(ha.completed_days, 0);

        let listed = list(&store, a).await.unwrap();
        assert_eq!(listed, vec![ha.clone()]);

        assert!(matches!(get(&store, a, hb.id).await, Err(AppError::NotFound)));
        assert!(matches!(
            update(&store, a, hb.id, req("stolen", "Daily", Some(99))).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(delete(&store, a, hb.id).await, Err(AppError::NotFound)));

        // B's habit is untouched.
        assert_eq!(get(&store, b, hb.id).await.unwrap(), hb);
    }

    #[tokio::test]
    async fn foreign_and_missing_ids_are_indistinguishable() {
        let store = MemoryStore::new();
        let (a, b) = two_owners(&store).await;
        let hb = create(&store, b, req("B habit", "Daily", None)).await.unwrap();

        let foreign = get(&store, a, hb.id).await.unwrap_err();
        let missing = get(&store, a, hb.id + 1000).await.unwrap_err();
        assert_eq!(foreign.status(), missing.status());
        assert_eq!(foreign.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let store = MemoryStore::new();
        let (a, _) = two_owners(&store).await;
        let names = ["one", "two", "three"];
        for n in names {
            create(&store, a, req(n, "Daily", None)).await.unwrap();
        }
        let listed: Vec<String> = list(&store, a).await.unwrap().into_iter().map(|h| h.name).collect();
        assert_eq!(listed, names);
    }

    #[tokio::test]
    async fn orphaned_habits_are_invisible() {
        let store = MemoryStore::new();
        let (a, _) = two_owners(&store).await;
        let h = create(&store, a, req("Walk", "Daily", None)).await.unwrap();
        store.remove_user(a);

        assert!(list(&store, a).await.unwrap().is_empty());
        assert!(matches!(get(&store, a, h.id).await, Err(AppError::NotFound)));
        assert!(matches!(
            create(&store, a, req("Again", "Daily", None)).await,
            Err(AppError::Unauthenticated)
        ));
    }
}
