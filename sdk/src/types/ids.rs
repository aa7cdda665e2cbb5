//! Identifier types for the Miracle SDK.
//!
//! Users, matches and chatrooms are referenced by opaque unsigned integers.
//! They serialize as JSON numbers; when decoding, numeric strings such as
//! `"42"` are accepted too because the backend is not consistent about it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::SdkError;

/// Deserializes a `u64` from either a JSON number or a numeric string.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(value) => Ok(value),
        Repr::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(#[serde(deserialize_with = "number_or_numeric_string")] u64);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = SdkError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse()
                    .map(Self)
                    .map_err(|_| SdkError::InvalidId(s.to_string()))
            }
        }
    };
}

id_type!(
    /// A user identifier (the backend uses Telegram user ids).
    UserId
);

id_type!(
    /// A match identifier.
    MatchId
);

id_type!(
    /// A chatroom identifier.
    ChatroomId
);
