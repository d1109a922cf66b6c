use serde::{Deserialize, Serialize};

use crate::state::scoreboard::MatchState;

/// Collection holding the single record document.
pub const SCOREBOARD_COLLECTION: &str = "scoreboard";
/// `_id` of the single record document.
pub const SCORE_DOC_ID: &str = "live_match";

/// MongoDB representation of the live record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoScoreDocument {
    /// Document identifier, always [`SCORE_DOC_ID`].
    #[serde(rename = "_id")]
    pub id: String,
    /// The record itself, stored flat alongside `_id`.
    #[serde(flatten)]
    pub state: MatchState,
}

impl MongoScoreDocument {
    /// Fresh document carrying the built-in default record.
    pub fn seed() -> Self {
        Self {
            id: SCORE_DOC_ID.to_owned(),
            state: MatchState::initial(),
        }
    }
}
