use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("frequency must be one of Daily, Weekly, Monthly")]
pub struct UnknownFrequency;

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = UnknownFrequency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [Frequency::Daily, Frequency::Weekly, Frequency::Monthly]
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or(UnknownFrequency)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw row of the `habits` table.
#[derive(Debug, FromRow)]
pub struct HabitRow {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub frequency: String,
    pub completed_days: i32,
}

/// A habit as handed to clients. The owner id stays server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: i64,
    #[serde(skip)]
    pub user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub frequency: Frequency,
    pub completed_days: i32,
}

/// Validated mutable fields of a habit, used for both create and replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub name: String,
    pub category: Option<String>,
    pub frequency: Frequency,
    pub completed_days: i32,
}

impl TryFrom<HabitRow> for Habit {
    type Error = StoreError;

    fn try_from(r: HabitRow) -> Result<Self, Self::Error> {
        let frequency = r
            .frequency
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("habit {} has frequency {:?}", r.id, r.frequency)))?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            category: r.category,
            frequency,
            completed_days: r.completed_days,
        })
    }
}
