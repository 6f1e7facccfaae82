use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::utils::value::value_to_string;

/// Body returned by the login and refresh endpoints.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The backend sends a numeric id; strings are accepted as well.
    #[serde(default, deserialize_with = "user_id_from_value")]
    pub user_id: Option<String>,
}

fn user_id_from_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(value_to_string(v)),
    })
}
