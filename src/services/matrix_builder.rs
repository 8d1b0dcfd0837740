use nalgebra::{DMatrix, DVector};

use crate::error::{RankingError, Result};
use crate::models::{GameRecord, PreferenceMethod, TeamId, TeamIndex};

/// Head-to-head matrices for one season, all indexed by the same `TeamIndex`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonMatrices {
    pub teams: TeamIndex,
    /// `scores[(i, j)]`: points team i scored against team j.
    pub scores: DMatrix<f64>,
    /// `games[(i, j)]`: games played between i and j. Symmetric.
    pub games: DMatrix<f64>,
    /// `wins[(i, j)]`: times team i beat team j.
    pub wins: DMatrix<f64>,
    pub preference: DMatrix<f64>,
    pub method: PreferenceMethod,
}

impl SeasonMatrices {
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Total games played per team (row sums of the games matrix).
    pub fn games_played(&self) -> DVector<f64> {
        row_sums(&self.games)
    }

    /// Total wins per team (row sums of the wins matrix).
    pub fn win_totals(&self) -> DVector<f64> {
        row_sums(&self.wins)
    }
}

/// A game whose participants have been resolved to matrix indices.
struct ResolvedGame {
    home: usize,
    away: usize,
    home_score: f64,
    away_score: f64,
    winner: Option<usize>,
}

/// Build the scores, games, wins and preference matrices for a season.
///
/// Every record is validated before any matrix is allocated, so a bad record
/// never yields partially filled matrices.
pub fn build_matrices(
    teams: &[TeamId],
    games: &[GameRecord],
    method: PreferenceMethod,
) -> Result<SeasonMatrices> {
    let index = TeamIndex::from_ids(teams)?;
    let resolved = games
        .iter()
        .enumerate()
        .map(|(row, game)| resolve_game(&index, row, game))
        .collect::<Result<Vec<_>>>()?;

    let n = index.len();
    let mut scores = DMatrix::<f64>::zeros(n, n);
    let mut games_matrix = DMatrix::<f64>::zeros(n, n);
    let mut wins = DMatrix::<f64>::zeros(n, n);

    for game in &resolved {
        let (h, a) = (game.home, game.away);
        games_matrix[(h, a)] += 1.0;
        games_matrix[(a, h)] += 1.0;
        scores[(h, a)] += game.home_score;
        scores[(a, h)] += game.away_score;
        if let Some(w) = game.winner {
            let loser = if w == h { a } else { h };
            wins[(w, loser)] += 1.0;
        }
    }

    let preference = match method {
        PreferenceMethod::All => win_fraction_preference(&games_matrix, &wins),
        PreferenceMethod::Distribute => distributed_preference(&resolved, &scores),
    };

    tracing::debug!(
        teams = n,
        games = resolved.len(),
        method = %method,
        "Built season matrices"
    );

    Ok(SeasonMatrices {
        teams: index,
        scores,
        games: games_matrix,
        wins,
        preference,
        method,
    })
}

fn resolve_game(index: &TeamIndex, row: usize, game: &GameRecord) -> Result<ResolvedGame> {
    let home = index
        .to_idx(&game.home)
        .map_err(|e| with_row(row, e))?;
    let away = index
        .to_idx(&game.away)
        .map_err(|e| with_row(row, e))?;

    if home == away {
        return Err(RankingError::InvalidInput(format!(
            "game {}: team '{}' cannot play itself",
            row, game.home
        )));
    }

    for (label, score) in [("home", game.home_score), ("away", game.away_score)] {
        if !score.is_finite() || score < 0.0 {
            return Err(RankingError::InvalidInput(format!(
                "game {}: {} score {} is not a non-negative number",
                row, label, score
            )));
        }
    }

    let winner = match game.winner.as_deref() {
        None => None,
        Some(w) if w == game.home => Some(home),
        Some(w) if w == game.away => Some(away),
        Some(w) => {
            return Err(RankingError::InvalidInput(format!(
                "game {}: winner '{}' is not a participant ({} vs {})",
                row, w, game.home, game.away
            )))
        }
    };

    Ok(ResolvedGame {
        home,
        away,
        home_score: game.home_score,
        away_score: game.away_score,
        winner,
    })
}

fn with_row(row: usize, err: RankingError) -> RankingError {
    match err {
        RankingError::InvalidInput(msg) => RankingError::InvalidInput(format!("game {}: {}", row, msg)),
        other => other,
    }
}

/// `A[i][j] = W[i][j] / n_i`, zero for teams without games.
fn win_fraction_preference(games: &DMatrix<f64>, wins: &DMatrix<f64>) -> DMatrix<f64> {
    let played = row_sums(games);
    DMatrix::from_fn(wins.nrows(), wins.ncols(), |i, j| {
        if played[i] > 0.0 {
            wins[(i, j)] / played[i]
        } else {
            0.0
        }
    })
}

/// Per game between i and j, add i's smoothed share of the season points
/// exchanged with j. Repeat meetings add up rather than average.
fn distributed_preference(games: &[ResolvedGame], scores: &DMatrix<f64>) -> DMatrix<f64> {
    let n = scores.nrows();
    let mut preference = DMatrix::<f64>::zeros(n, n);
    for game in games {
        let (h, a) = (game.home, game.away);
        preference[(h, a)] += smoothed_share(scores[(h, a)], scores[(a, h)]);
        preference[(a, h)] += smoothed_share(scores[(a, h)], scores[(h, a)]);
    }
    preference
}

/// Laplace-smoothed share of combined points, strictly inside (0, 1).
pub fn smoothed_share(points_for: f64, points_against: f64) -> f64 {
    (points_for + 1.0) / (points_for + points_against + 2.0)
}

pub(crate) fn row_sums(m: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_fn(m.nrows(), |i, _| m.row(i).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn teams() -> Vec<TeamId> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    fn three_team_season() -> Vec<GameRecord> {
        vec![
            GameRecord::new(day(1), "A", "B", 10.0, 3.0, Some("A")),
            GameRecord::new(day(2), "B", "C", 7.0, 7.0, None),
            GameRecord::new(day(3), "C", "A", 5.0, 20.0, Some("A")),
        ]
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_three_team_scenario_matrices() {
        let m = build_matrices(&teams(), &three_team_season(), PreferenceMethod::Distribute).unwrap();

        let expected_games = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(m.games, expected_games);

        let expected_scores =
            DMatrix::from_row_slice(3, 3, &[0.0, 10.0, 20.0, 3.0, 0.0, 7.0, 5.0, 7.0, 0.0]);
        assert_eq!(m.scores, expected_scores);

        let expected_wins = DMatrix::from_row_slice(3, 3, &[0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(m.wins, expected_wins);

        assert_close(m.preference[(0, 1)], 11.0 / 15.0);
        assert_close(m.preference[(1, 0)], 4.0 / 15.0);
        assert_close(m.preference[(1, 2)], 0.5);
        assert_close(m.preference[(2, 1)], 0.5);
        assert_close(m.preference[(0, 2)], 21.0 / 27.0);
        assert_close(m.preference[(2, 0)], 6.0 / 27.0);
        assert_eq!(m.win_totals().as_slice(), &[2.0, 0.0, 0.0]);
        assert_eq!(m.games_played().as_slice(), &[2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_win_fraction_preference() {
        let m = build_matrices(&teams(), &three_team_season(), PreferenceMethod::All).unwrap();
        assert_close(m.preference[(0, 1)], 0.5);
        assert_close(m.preference[(0, 2)], 0.5);
        assert_eq!(m.preference.row(1).sum(), 0.0);
        assert_eq!(m.preference.row(2).sum(), 0.0);
    }

    #[test]
    fn test_team_without_games_gets_zero_row() {
        let mut ids = teams();
        ids.push("D".to_string());
        let m = build_matrices(&ids, &three_team_season(), PreferenceMethod::All).unwrap();
        assert_eq!(m.preference.row(3).sum(), 0.0);
        assert!(m.preference.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_repeat_meetings_accumulate() {
        let games = vec![
            GameRecord::new(day(1), "A", "B", 3.0, 1.0, Some("A")),
            GameRecord::new(day(2), "B", "A", 2.0, 2.0, None),
        ];
        let m = build_matrices(&teams(), &games, PreferenceMethod::Distribute).unwrap();
        // Season totals: A scored 5 against B, B scored 3 against A.
        assert_eq!(m.games[(0, 1)], 2.0);
        assert_close(m.preference[(0, 1)], 2.0 * (6.0 / 10.0));
        assert_close(m.preference[(1, 0)], 2.0 * (4.0 / 10.0));
    }

    #[test]
    fn test_structural_invariants() {
        let games = vec![
            GameRecord::new(day(1), "A", "B", 21.0, 14.0, Some("A")),
            GameRecord::new(day(2), "C", "B", 3.0, 30.0, Some("B")),
            GameRecord::new(day(3), "A", "C", 17.0, 17.0, None),
            GameRecord::new(day(4), "B", "A", 9.0, 24.0, Some("A")),
        ];
        let m = build_matrices(&teams(), &games, PreferenceMethod::Distribute).unwrap();
        assert_eq!(m.games, m.games.transpose());
        for i in 0..3 {
            assert_eq!(m.scores[(i, i)], 0.0);
            assert_eq!(m.games[(i, i)], 0.0);
            assert_eq!(m.wins[(i, i)], 0.0);
            assert_eq!(m.preference[(i, i)], 0.0);
        }
        // Each pair met at most twice, so each entry is a sum of at most two fractions.
        assert!(m.preference.iter().all(|&x| (0.0..2.0).contains(&x)));
    }

    #[test]
    fn test_build_is_idempotent() {
        let first = build_matrices(&teams(), &three_team_season(), PreferenceMethod::Distribute).unwrap();
        let second = build_matrices(&teams(), &three_team_season(), PreferenceMethod::Distribute).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_team_rejected() {
        let mut games = three_team_season();
        games.push(GameRecord::new(day(9), "A", "Z", 1.0, 0.0, Some("A")));
        let err = build_matrices(&teams(), &games, PreferenceMethod::Distribute).unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(ref msg) if msg.contains("'Z'")));
    }

    #[test]
    fn test_duplicate_team_rejected() {
        let ids = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        let err = build_matrices(&ids, &[], PreferenceMethod::All).unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(_)));
    }

    #[test]
    fn test_winner_must_be_participant() {
        let games = vec![GameRecord::new(day(1), "A", "B", 3.0, 1.0, Some("C"))];
        let err = build_matrices(&teams(), &games, PreferenceMethod::All).unwrap_err();
        assert!(matches!(err, RankingError::InvalidInput(ref msg) if msg.contains("winner")));
    }

    #[test]
    fn test_self_games_and_negative_scores_rejected() {
        let self_game = vec![GameRecord::new(day(1), "A", "A", 3.0, 1.0, None)];
        assert!(build_matrices(&teams(), &self_game, PreferenceMethod::All).is_err());

        let negative = vec![GameRecord::new(day(1), "A", "B", -3.0, 1.0, Some("B"))];
        assert!(build_matrices(&teams(), &negative, PreferenceMethod::All).is_err());
    }

    #[test]
    fn test_smoothed_share_bounds() {
        assert_close(smoothed_share(0.0, 0.0), 0.5);
        assert!(smoothed_share(100.0, 0.0) < 1.0);
        assert!(smoothed_share(0.0, 100.0) > 0.0);
    }
}
