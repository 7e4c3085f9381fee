use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::{
    jwt::JwtKeys,
    repo::{PgUserRepo, UserRepo},
};
use crate::config::AppConfig;
use crate::db;
use crate::habits::repo::{HabitRepo, PgHabitRepo};

#[derive(Clone)]
pub struct AppState {
    pub jwt: Arc<JwtKeys>,
    pub users: Arc<dyn UserRepo>,
    pub habits: Arc<dyn HabitRepo>,
}

impl FromRef<AppState> for Arc<JwtKeys> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.jwt)
    }
}

impl AppState {
    /// Validates the signing config, connects to Postgres and applies
    /// migrations. Any failure here aborts startup.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let jwt = Arc::new(JwtKeys::from_config(&config.jwt)?);

        let db = db::connect(config).await?;
        db::migrate(&db).await?;

        Ok(Self::from_parts(
            jwt,
            Arc::new(PgUserRepo::new(db.clone())),
            Arc::new(PgHabitRepo::new(db)),
        ))
    }

    pub fn from_parts(
        jwt: Arc<JwtKeys>,
        users: Arc<dyn UserRepo>,
        habits: Arc<dyn HabitRepo>,
    ) -> Self {
        Self {
            jwt,
            users,
            habits,
        }
    }

    /// State backed by a single in-memory store, for tests.
    #[cfg(test)]
    pub fn fake() -> (Self, Arc<crate::memory::MemoryStore>) {
        use crate::config::JwtConfig;
        use crate::memory::MemoryStore;

        let jwt = JwtConfig {
            secret: "test-secret-that-is-at-least-32-bytes!!".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60,
        };
        let jwt = Arc::new(JwtKeys::from_config(&jwt).expect("valid test jwt config"));
        let store = Arc::new(MemoryStore::new());

        let state = Self::from_parts(
            jwt,
            Arc::clone(&store) as Arc<dyn UserRepo>,
            Arc::clone(&store) as Arc<dyn HabitRepo>,
        );
        (state, store)
    }
}
