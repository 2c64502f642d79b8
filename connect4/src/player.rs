use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GameError;

/// Which side a piece or turn belongs to. Serialized as `1` or `2`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub(crate) fn idx(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }

    pub fn other(self) -> PlayerId {
        match self {
            PlayerId::One => PlayerId::Two,
            PlayerId::Two => PlayerId::One,
        }
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> u8 {
        id.idx() as u8 + 1
    }
}

impl TryFrom<u8> for PlayerId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerId::One),
            2 => Ok(PlayerId::Two),
            other => Err(format!("player id must be 1 or 2, found {other}")),
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", u8::from(*self))
    }
}

/// A seat at the table. The color is only for display.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub color: String,
}

impl Player {
    pub fn new(id: PlayerId, color: impl Into<String>) -> Result<Self, GameError> {
        let color = color.into();
        let trimmed = color.trim();
        if trimmed.is_empty() {
            return Err(GameError::InvalidColor { player: id });
        }
        Ok(Self {
            id,
            color: trimmed.to_string(),
        })
    }

    pub fn default_for(id: PlayerId) -> Self {
        let color = match id {
            PlayerId::One => "red",
            PlayerId::Two => "blue",
        };
        Self {
            id,
            color: color.to_string(),
        }
    }
}
