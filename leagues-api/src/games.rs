use serde::{Deserialize, Serialize};

use crate::id::GameId;

/// A game discipline as stored in the `games` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "game_code", default)]
    pub code: GameId,
    #[serde(rename = "game_name")]
    pub name: String,
    #[serde(rename = "game_description")]
    pub description: String,
}

/// A partial [`Game`] carrying only the fields to change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialGame {
    #[serde(rename = "game_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "game_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PartialGame {
    /// Returns `true` if no fields are supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}
