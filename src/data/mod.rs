pub mod export;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::{GameRecord, Team};
use crate::utils::{parse_game_date, parse_winner};

/// One row of a league file: `date,home,away,home-score,away-score,win`.
#[derive(Debug, Deserialize)]
struct GameRow {
    date: String,
    home: String,
    away: String,
    #[serde(rename = "home-score")]
    home_score: f64,
    #[serde(rename = "away-score")]
    away_score: f64,
    #[serde(default)]
    win: Option<String>,
}

/// One row of a teams file; only `abbr` is required.
#[derive(Debug, Deserialize)]
struct TeamRow {
    abbr: String,
    #[serde(default)]
    name: Option<String>,
}

pub fn load_games<P: AsRef<Path>>(path: P) -> Result<Vec<GameRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open league file {}", path.display()))?;
    let games = read_games(file).with_context(|| format!("Failed to read league file {}", path.display()))?;
    tracing::info!("Loaded {} games from {}", games.len(), path.display());
    Ok(games)
}

pub fn read_games<R: Read>(reader: R) -> Result<Vec<GameRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut games = Vec::new();
    for (line, row) in csv_reader.deserialize::<GameRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed game on data line {}", line + 1))?;
        let date = parse_game_date(&row.date)
            .ok_or_else(|| anyhow!("Unrecognized date '{}' on data line {}", row.date, line + 1))?;
        games.push(GameRecord {
            date,
            home: row.home,
            away: row.away,
            home_score: row.home_score,
            away_score: row.away_score,
            winner: parse_winner(row.win.as_deref()),
        });
    }
    Ok(games)
}

pub fn load_teams<P: AsRef<Path>>(path: P) -> Result<Vec<Team>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open teams file {}", path.display()))?;
    let teams = read_teams(file).with_context(|| format!("Failed to read teams file {}", path.display()))?;
    tracing::info!("Loaded {} teams from {}", teams.len(), path.display());
    Ok(teams)
}

pub fn read_teams<R: Read>(reader: R) -> Result<Vec<Team>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut teams = Vec::new();
    for (line, row) in csv_reader.deserialize::<TeamRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed team on data line {}", line + 1))?;
        teams.push(Team {
            abbr: row.abbr,
            name: row.name.filter(|n| !n.trim().is_empty()),
        });
    }
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const LEAGUE_CSV: &str = "\
date,home,away,home-score,away-score,win
2023-10-24,BOS,NYK,108,104,BOS
10/25/2023,NYK,MIA,99,99,
2023-10-26,MIA,BOS,111,119,BOS
";

    #[test]
    fn test_read_games() {
        let games = read_games(LEAGUE_CSV.as_bytes()).unwrap();
        assert_eq!(games.len(), 3);
        assert_eq!(games[0].date, NaiveDate::from_ymd_opt(2023, 10, 24).unwrap());
        assert_eq!(games[0].home, "BOS");
        assert_eq!(games[0].home_score, 108.0);
        assert_eq!(games[0].winner.as_deref(), Some("BOS"));
        assert_eq!(games[1].date, NaiveDate::from_ymd_opt(2023, 10, 25).unwrap());
        assert_eq!(games[1].winner, None);
    }

    #[test]
    fn test_read_games_rejects_bad_date() {
        let csv = "date,home,away,home-score,away-score,win\nsoon,BOS,NYK,1,0,BOS\n";
        let err = read_games(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_read_games_rejects_non_numeric_score() {
        let csv = "date,home,away,home-score,away-score,win\n2023-10-24,BOS,NYK,lots,0,BOS\n";
        assert!(read_games(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_read_teams_ignores_extra_columns() {
        let csv = "abbr,name,conference\nBOS,Boston Celtics,East\nNYK,,East\n";
        let teams = read_teams(csv.as_bytes()).unwrap();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].display_name(), "Boston Celtics");
        assert_eq!(teams[1].name, None);
        assert_eq!(teams[1].display_name(), "NYK");
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = load_teams("/definitely/not/here.csv").unwrap_err();
        assert!(err.to_string().contains("here.csv"));
    }
}
