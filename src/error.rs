use thiserror::Error;

use crate::models::TeamId;

/// Errors raised by matrix construction and the ranking methods.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate spectrum: {0}")]
    DegenerateSpectrum(String),

    #[error("Team {team} has no recorded games")]
    ZeroGamesPlayed { team: TeamId },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RankingError {
    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RankingError::InvalidInput(_) => "invalid_input",
            RankingError::DegenerateSpectrum(_) => "degenerate_spectrum",
            RankingError::ZeroGamesPlayed { .. } => "zero_games_played",
            RankingError::Configuration(_) => "configuration",
        }
    }
}

pub type Result<T> = std::result::Result<T, RankingError>;
