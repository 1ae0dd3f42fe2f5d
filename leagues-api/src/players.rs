use serde::{Deserialize, Serialize};

use crate::id::PlayerId;

/// A player as stored in the `players` table.
///
/// The `player_id` is assigned by the store; a value supplied by the client
/// on creation is ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "player_id", default)]
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub address: String,
}

/// A partial [`Player`] carrying only the fields to change.
///
/// A field counts as supplied whenever the key is present in the request
/// body. `0` and `""` are legitimate values, not absence markers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialPlayer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl PartialPlayer {
    /// Returns `true` if no fields are supplied.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.gender.is_none()
            && self.address.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::PartialPlayer;

    #[test]
    fn test_partial_player_is_empty() {
        let partial = PartialPlayer::default();
        assert!(partial.is_empty());

        // An empty string is still a supplied value.
        let partial: PartialPlayer = serde_json::from_str(r#"{"address":""}"#).unwrap();
        assert!(!partial.is_empty());
        assert_eq!(partial.address.as_deref(), Some(""));
    }
}
