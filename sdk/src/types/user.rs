//! User management types.

use serde::{Deserialize, Serialize};

use super::ids::{MatchId, UserId};
use crate::error::SdkError;

/// User gender as encoded by the backend (1/2/3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    /// Male (1).
    Male,
    /// Female (2).
    Female,
    /// Other (3).
    Other,
}

impl TryFrom<u8> for Gender {
    type Error = SdkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Male),
            2 => Ok(Self::Female),
            3 => Ok(Self::Other),
            other => Err(SdkError::InvalidGender(other)),
        }
    }
}

impl From<Gender> for u8 {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => 1,
            Gender::Female => 2,
            Gender::Other => 3,
        }
    }
}

/// Request body for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNewUserRequest {
    /// Telegram user name.
    pub telegram_user_name: String,
    /// Telegram user id.
    pub telegram_user_id: u64,
    /// Gender.
    pub gender: Gender,
}

/// Response for creating a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNewUserResponse {
    /// Whether the user was created.
    pub success: bool,
    /// The new user's id.
    pub user_id: Option<UserId>,
}

/// Request body for editing a user's age.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditUserAgeRequest {
    /// User id.
    pub user_id: UserId,
    /// Age in years.
    pub age: u32,
}

/// Request body for editing a user's target gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditTargetGenderRequest {
    /// User id.
    pub user_id: UserId,
    /// Gender the user wants to be matched with.
    pub target_gender: Gender,
}

/// Request body for editing a user's summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditSummaryRequest {
    /// User id.
    pub user_id: UserId,
    /// Free-form self description.
    pub summary: String,
}

/// Request body carrying only a user id.
///
/// Used by the save-to-database and get-user-info endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdRequest {
    /// User id.
    pub user_id: UserId,
}

impl From<UserId> for UserIdRequest {
    fn from(user_id: UserId) -> Self {
        Self { user_id }
    }
}

/// Generic success/failure response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Whether the operation succeeded.
    pub success: bool,
}

/// User profile as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// User id.
    pub user_id: UserId,
    /// Telegram user name.
    pub telegram_user_name: String,
    /// Telegram id.
    pub telegram_id: u64,
    /// Gender.
    pub gender: Gender,
    /// Age, if set.
    #[serde(default)]
    pub age: Option<u32>,
    /// Target gender, if set.
    #[serde(default)]
    pub target_gender: Option<Gender>,
    /// Self description, if set.
    #[serde(default)]
    pub user_personality_trait: Option<String>,
    /// Matches this user takes part in.
    #[serde(default)]
    pub match_ids: Vec<MatchId>,
}
