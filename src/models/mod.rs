use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{RankingError, Result};

/// Team abbreviation, e.g. "BOS".
pub type TeamId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub abbr: TeamId,
    #[serde(default)]
    pub name: Option<String>,
}

impl Team {
    pub fn new(abbr: &str) -> Self {
        Self {
            abbr: abbr.to_string(),
            name: None,
        }
    }

    /// Full name when known, abbreviation otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.abbr)
    }
}

/// One observed contest between two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub home: TeamId,
    pub away: TeamId,
    pub home_score: f64,
    pub away_score: f64,
    /// `None` for ties.
    #[serde(default)]
    pub winner: Option<TeamId>,
}

impl GameRecord {
    pub fn new(
        date: NaiveDate,
        home: &str,
        away: &str,
        home_score: f64,
        away_score: f64,
        winner: Option<&str>,
    ) -> Self {
        Self {
            date,
            home: home.to_string(),
            away: away.to_string(),
            home_score,
            away_score,
            winner: winner.map(str::to_string),
        }
    }
}

/// Construction policy for the preference matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceMethod {
    /// Aggregate win fraction per team.
    All,
    /// Laplace-smoothed share of combined points, summed per game.
    #[default]
    Distribute,
}

impl FromStr for PreferenceMethod {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(PreferenceMethod::All),
            "distribute" => Ok(PreferenceMethod::Distribute),
            other => Err(RankingError::Configuration(format!(
                "unsupported preference matrix method '{}' (expected 'all' or 'distribute')",
                other
            ))),
        }
    }
}

impl fmt::Display for PreferenceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceMethod::All => write!(f, "all"),
            PreferenceMethod::Distribute => write!(f, "distribute"),
        }
    }
}

/// Bidirectional mapping between team ids and dense matrix indices.
///
/// The order of the ids passed to [`TeamIndex::from_ids`] fixes the row and
/// column order of every matrix and every ranking vector.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamIndex {
    ids: Vec<TeamId>,
    id_to_idx: HashMap<TeamId, usize>,
}

impl TeamIndex {
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self> {
        let mut id_to_idx = HashMap::with_capacity(ids.len());
        let mut ordered = Vec::with_capacity(ids.len());
        for (idx, id) in ids.iter().enumerate() {
            let id = id.as_ref();
            if id.trim().is_empty() {
                return Err(RankingError::InvalidInput(format!(
                    "empty team id at position {}",
                    idx
                )));
            }
            if id_to_idx.insert(id.to_string(), idx).is_some() {
                return Err(RankingError::InvalidInput(format!(
                    "duplicate team id '{}'",
                    id
                )));
            }
            ordered.push(id.to_string());
        }
        Ok(Self {
            ids: ordered,
            id_to_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<usize> {
        self.id_to_idx.get(id).copied()
    }

    /// Index for `id`, or `InvalidInput` naming the unknown id.
    pub fn to_idx(&self, id: &str) -> Result<usize> {
        self.get(id)
            .ok_or_else(|| RankingError::InvalidInput(format!("unknown team id '{}'", id)))
    }

    pub fn to_id(&self, idx: usize) -> Option<&str> {
        self.ids.get(idx).map(String::as_str)
    }

    pub fn ids(&self) -> &[TeamId] {
        &self.ids
    }
}

/// One line of a ranking table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub rank: usize,
    pub team: TeamId,
    pub name: String,
    pub games: u32,
    pub wins: u32,
    pub rating: f64,
}

// API Response types
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_index_round_trip() {
        let index = TeamIndex::from_ids(&["BOS", "NYY", "TOR"]).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.to_idx("NYY").unwrap(), 1);
        assert_eq!(index.to_id(2), Some("TOR"));
        assert_eq!(index.to_id(3), None);
        assert!(index.get("LAD").is_none());
    }

    #[test]
    fn test_team_index_rejects_duplicates() {
        let err = TeamIndex::from_ids(&["BOS", "NYY", "BOS"]).unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(_)));
    }

    #[test]
    fn test_team_index_unknown_id() {
        let index = TeamIndex::from_ids(&["BOS"]).unwrap();
        let err = index.to_idx("XXX").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert!(err.to_string().contains("XXX"));
    }

    #[test]
    fn test_preference_method_parsing() {
        assert_eq!("all".parse::<PreferenceMethod>().unwrap(), PreferenceMethod::All);
        assert_eq!(
            " Distribute ".parse::<PreferenceMethod>().unwrap(),
            PreferenceMethod::Distribute
        );
        let err = "margin".parse::<PreferenceMethod>().unwrap_err();
        assert!(matches!(err, RankingError::Configuration(_)));
        assert_eq!(PreferenceMethod::default().to_string(), "distribute");
    }
}
