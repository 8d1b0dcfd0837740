use nalgebra::DVector;
use std::cmp::Ordering;

use crate::error::{RankingError, Result};
use crate::models::{RankingRow, Team};
use crate::services::SeasonMatrices;
use crate::utils::{as_count, format_rating};

/// Merge a rating vector with win totals and team metadata, sorted best first.
///
/// Equal ratings share the better rank ("1224" competition ranking) and keep
/// their team-list order.
pub fn merge_rankings(
    teams: &[Team],
    matrices: &SeasonMatrices,
    ratings: &DVector<f64>,
) -> Result<Vec<RankingRow>> {
    if teams.len() != matrices.len() || ratings.len() != matrices.len() {
        return Err(RankingError::InvalidInput(format!(
            "cannot merge {} teams with {} matrix rows and {} ratings",
            teams.len(),
            matrices.len(),
            ratings.len()
        )));
    }

    let games = matrices.games_played();
    let wins = matrices.win_totals();

    let mut rows = Vec::with_capacity(teams.len());
    for team in teams {
        let idx = matrices.teams.to_idx(&team.abbr)?;
        rows.push(RankingRow {
            rank: 0,
            team: team.abbr.clone(),
            name: team.display_name().to_string(),
            games: as_count(games[idx]),
            wins: as_count(wins[idx]),
            rating: ratings[idx],
        });
    }

    rows.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
    assign_ranks(&mut rows);
    Ok(rows)
}

fn assign_ranks(rows: &mut [RankingRow]) {
    let mut previous: Option<(f64, usize)> = None;
    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = match previous {
            Some((rating, rank)) if rating == row.rating => rank,
            _ => position + 1,
        };
        previous = Some((row.rating, row.rank));
    }
}

/// Plain-text table for terminal output.
pub fn render_table(title: &str, rows: &[RankingRow]) -> String {
    let name_width = rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Team".len());

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&format!(
        "{:>4}  {:<6} {:<width$} {:>5} {:>5} {:>12}\n",
        "Rank",
        "Abbr",
        "Team",
        "GP",
        "W",
        "Rating",
        width = name_width
    ));
    for row in rows {
        out.push_str(&format!(
            "{:>4}  {:<6} {:<width$} {:>5} {:>5} {:>12}\n",
            row.rank,
            row.team,
            row.name,
            row.games,
            row.wins,
            format_rating(row.rating),
            width = name_width
        ));
    }
    out
}
