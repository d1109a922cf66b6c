use serde::Serialize;
use utoipa::ToSchema;

use crate::state::scoreboard::MatchState;

/// Envelope wrapping a successful update with the full resulting record.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateResponse {
    /// Always `"success"`; failures use the error envelope instead.
    pub status: String,
    /// The record after the merge.
    pub data: MatchState,
}

impl UpdateResponse {
    /// Wrap a merged record in the success envelope.
    pub fn success(data: MatchState) -> Self {
        Self {
            status: "success".to_owned(),
            data,
        }
    }
}
