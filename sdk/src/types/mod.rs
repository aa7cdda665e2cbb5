//! Core types for the Miracle SDK.
//!
//! This module provides the identifiers and the request/response bodies of
//! the user, match and chatroom management endpoints.

pub mod chatroom;
pub mod ids;
pub mod matching;
pub mod user;

pub use chatroom::{
    ChatMessage, GetChatHistoryRequest, GetChatHistoryResponse, GetOrCreateChatroomRequest,
    GetOrCreateChatroomResponse, SaveChatroomHistoryRequest,
};
pub use ids::{ChatroomId, MatchId, UserId};
pub use matching::{
    CreateMatchRequest, CreateMatchResponse, GetMatchInfoRequest, MatchDetails, MatchIdRequest,
    SaveMatchRequest,
};
pub use user::{
    CreateNewUserRequest, CreateNewUserResponse, EditSummaryRequest, EditTargetGenderRequest,
    EditUserAgeRequest, Gender, SuccessResponse, UserIdRequest, UserInfo,
};
