//! Errors surfaced by game setup and round flow

use std::fmt;

use crate::sim::RoundPhase;

#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// Player count outside the supported range
    InvalidPlayerCount(u32),
    /// Game started with an empty theme selection
    NoThemesSelected,
    /// Theme selection value that maps to no theme
    UnknownTheme(u32),
    /// A flow action was requested in a phase that does not allow it
    InvalidAction {
        action: &'static str,
        phase: RoundPhase,
    },
    /// Landmark payload from the camera could not be parsed
    MalformedLandmarks(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidPlayerCount(n) => write!(
                f,
                "player count {} is outside {}..={}",
                n,
                crate::consts::MIN_PLAYERS,
                crate::consts::MAX_PLAYERS
            ),
            GameError::NoThemesSelected => write!(f, "select at least one round"),
            GameError::UnknownTheme(v) => write!(f, "unknown theme index {}", v),
            GameError::InvalidAction { action, phase } => {
                write!(f, "cannot {} while in {:?}", action, phase)
            }
            GameError::MalformedLandmarks(msg) => write!(f, "malformed landmarks: {}", msg),
        }
    }
}

impl std::error::Error for GameError {}

impl From<serde_json::Error> for GameError {
    fn from(err: serde_json::Error) -> Self {
        GameError::MalformedLandmarks(err.to_string())
    }
}
