//! Common GraphQL types

use async_graphql::Enum;
use serde::{Deserialize, Serialize};

/// One of the films in the Star Wars Trilogy
// Stored in documents as its episode number.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Episode {
    /// Released in 1977.
    NewHope,
    /// Released in 1980.
    Empire,
    /// Released in 1983.
    Jedi,
}

impl Episode {
    pub const ALL: [Episode; 3] = [Episode::NewHope, Episode::Empire, Episode::Jedi];

    pub fn number(self) -> i64 {
        match self {
            Episode::NewHope => 4,
            Episode::Empire => 5,
            Episode::Jedi => 6,
        }
    }

    pub fn from_number(number: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|episode| episode.number() == number)
    }
}

impl TryFrom<i64> for Episode {
    type Error = String;

    fn try_from(number: i64) -> Result<Self, Self::Error> {
        Self::from_number(number).ok_or_else(|| format!("Unknown episode number: {}", number))
    }
}

impl From<Episode> for i64 {
    fn from(episode: Episode) -> Self {
        episode.number()
    }
}
