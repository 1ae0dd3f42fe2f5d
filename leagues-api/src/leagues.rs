use serde::{Deserialize, Serialize};

use crate::id::LeagueId;

/// A league as stored in the `leagues` table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct League {
    #[serde(rename = "league_id", default)]
    pub id: LeagueId,
    #[serde(rename = "league_name")]
    pub name: String,
    pub country: String,
}

/// A partial [`League`] carrying only the fields to change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialLeague {
    #[serde(rename = "league_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl PartialLeague {
    /// Returns `true` if no fields are supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.country.is_none()
    }
}
