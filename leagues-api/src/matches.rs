use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{GameId, MatchId, TeamId};

/// A match between two teams as stored in the `matches` table.
///
/// The game and team references are not validated against their tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Match {
    #[serde(rename = "match_id", default)]
    pub id: MatchId,
    #[serde(rename = "game_code")]
    pub game: GameId,
    #[serde(rename = "team_1_id")]
    pub team_1: TeamId,
    #[serde(rename = "team_2_id")]
    pub team_2: TeamId,
    /// RFC3339
    pub match_date: DateTime<Utc>,
    pub result: String,
}

/// A partial [`Match`] carrying only the fields to change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialMatch {
    #[serde(rename = "game_code", skip_serializing_if = "Option::is_none")]
    pub game: Option<GameId>,
    #[serde(rename = "team_1_id", skip_serializing_if = "Option::is_none")]
    pub team_1: Option<TeamId>,
    #[serde(rename = "team_2_id", skip_serializing_if = "Option::is_none")]
    pub team_2: Option<TeamId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl PartialMatch {
    /// Returns `true` if no fields are supplied.
    pub fn is_empty(&self) -> bool {
        self.game.is_none()
            && self.team_1.is_none()
            && self.team_2.is_none()
            && self.match_date.is_none()
            && self.result.is_none()
    }
}
