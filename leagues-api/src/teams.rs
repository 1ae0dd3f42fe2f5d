use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{PlayerId, TeamId};

/// A team as stored in the `teams` table.
///
/// `created_by_player_id` is a plain reference; the store does not verify
/// that the player exists.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "team_id", default)]
    pub id: TeamId,
    #[serde(rename = "team_name")]
    pub name: String,
    #[serde(rename = "created_by_player_id")]
    pub created_by: PlayerId,
    /// RFC3339
    pub date_created: DateTime<Utc>,
}

/// A partial [`Team`] carrying only the fields to change.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialTeam {
    #[serde(rename = "team_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        rename = "created_by_player_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_by: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_created: Option<DateTime<Utc>>,
}

impl PartialTeam {
    /// Returns `true` if no fields are supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.created_by.is_none() && self.date_created.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::PartialTeam;
    use crate::id::PlayerId;

    #[test]
    fn test_partial_team_supplied_zero() {
        // 0 is a supplied reference, not an absence marker.
        let partial: PartialTeam =
            serde_json::from_str(r#"{"created_by_player_id":0}"#).unwrap();

        assert!(!partial.is_empty());
        assert_eq!(partial.created_by, Some(PlayerId(0)));
    }
}
