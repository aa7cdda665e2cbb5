//! Match management types.

use serde::{Deserialize, Serialize};

use super::ids::{ChatroomId, MatchId, UserId};

/// Request body for creating a match between two users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMatchRequest {
    /// First user.
    pub user_id_1: UserId,
    /// Second user.
    pub user_id_2: UserId,
    /// Match reason shown to the first user.
    pub reason_1: String,
    /// Match reason shown to the second user.
    pub reason_2: String,
    /// Match score.
    pub match_score: f64,
}

/// Response for creating a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMatchResponse {
    /// The new match id.
    pub match_id: MatchId,
}

/// Request body for reading a match from one user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMatchInfoRequest {
    /// Requesting user.
    pub user_id: UserId,
    /// Match id.
    pub match_id: MatchId,
}

/// Match details as seen by the requesting user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    /// The other user in the match.
    pub target_user_id: UserId,
    /// Description of the other user.
    #[serde(default)]
    pub description_for_target: String,
    /// Whether the requesting user liked the match.
    #[serde(default)]
    pub is_liked: bool,
    /// Match score.
    #[serde(default)]
    pub match_score: f64,
    /// Per-game scores, passed through untouched.
    #[serde(default)]
    pub mutual_game_scores: serde_json::Value,
    /// Chatroom for this match, if one exists.
    #[serde(default)]
    pub chatroom_id: Option<ChatroomId>,
}

/// Request body carrying only a match id.
///
/// Used by the toggle-like endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchIdRequest {
    /// Match id.
    pub match_id: MatchId,
}

/// Request body for persisting a match; `None` saves all pending matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaveMatchRequest {
    /// Match id.
    pub match_id: Option<MatchId>,
}
