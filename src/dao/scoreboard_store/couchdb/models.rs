use serde::{Deserialize, Serialize};

use crate::state::scoreboard::MatchState;

/// Identifier of the single CouchDB document holding the live record.
pub const SCORE_DOC_ID: &str = "live_match";

/// CouchDB representation of the live record: bookkeeping fields plus the
/// flattened state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchScoreDocument {
    /// Document identifier, always [`SCORE_DOC_ID`].
    #[serde(rename = "_id")]
    pub id: String,
    /// CouchDB revision; `None` until the document has been stored once.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// The record itself, stored flat alongside `_id`/`_rev`.
    #[serde(flatten)]
    pub state: MatchState,
}

impl CouchScoreDocument {
    /// Fresh document carrying the built-in default record.
    pub fn seed() -> Self {
        Self {
            id: SCORE_DOC_ID.to_owned(),
            rev: None,
            state: MatchState::initial(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bookkeeping_fields_stay_out_of_the_record() {
        let json = r#"{
            "_id": "live_match",
            "_rev": "3-abcdef",
            "team1_name": "India",
            "team1_logo": "https://flagcdn.com/in.svg",
            "team2_name": "Australia",
            "team2_logo": "https://flagcdn.com/au.svg",
            "score": 12,
            "wickets": 1,
            "overs": 2.3,
            "target": 0,
            "bat1_name": "Player 1",
            "bat1_active": true,
            "bat2_name": "Player 2",
            "bat2_active": false,
            "bowler_name": "Bowler",
            "powerplay": true
        }"#;
        let document: CouchScoreDocument = serde_json::from_str(json).unwrap();
        assert_eq!(document.rev.as_deref(), Some("3-abcdef"));
        assert_eq!(document.state.score, 12);
        assert!(document.state.extra.contains_key("powerplay"));
        assert!(!document.state.extra.contains_key("_rev"));
    }

    #[test]
    fn seed_documents_omit_the_revision() {
        let value = serde_json::to_value(CouchScoreDocument::seed()).unwrap();
        assert_eq!(value["_id"], "live_match");
        assert!(value.get("_rev").is_none());
        assert_eq!(value["team1_name"], "India");
    }
}
