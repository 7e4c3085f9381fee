use serde::Deserialize;

/// Body of `POST /habits` and `PUT /habits/:id`. Any owner id a client sends
/// is ignored; ownership always comes from the bearer token.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRequest {
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
    #[serde(default)]
    pub frequency: String,
    pub completed_days: Option<i32>,
}
