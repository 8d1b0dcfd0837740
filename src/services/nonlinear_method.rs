use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{RankingError, Result};
use crate::models::TeamId;
use crate::services::matrix_builder::row_sums;

pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NonlinearOptions {
    pub max_iter: usize,
    /// Convergence threshold on the L1 distance between successive rankings.
    pub tol: f64,
}

impl Default for NonlinearOptions {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITERATIONS,
            tol: DEFAULT_TOLERANCE,
        }
    }
}

/// Result of the fixed-point iteration.
///
/// `converged == false` means the iteration budget ran out; `ranking` then
/// holds the last iterate, which is still a usable ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct NonlinearOutcome {
    pub ranking: DVector<f64>,
    pub converged: bool,
    pub iterations: usize,
}

/// Saturating influence function, maps `[0, inf)` onto `[0, 1)`.
pub fn saturating_influence(x: f64) -> f64 {
    let numerator = 0.05 * x + x * x;
    numerator / (2.0 + numerator)
}

/// Smoothed strength ratio of `points_for` over `points_against`.
pub fn relative_strength(points_for: f64, points_against: f64) -> f64 {
    let smooth = |s: f64| 5.0 + s + s.powf(2.0 / 3.0);
    smooth(points_for) / smooth(points_against)
}

/// Keener nonlinear method.
///
/// Starting from all ones, repeatedly sets
/// `r[i] = sum_j f(e[i][j] * r[j]) / games_played[i]` until successive
/// iterates are closer than `tol` in L1 norm or `max_iter` rounds have run.
pub fn nonlinear_rank(
    teams: &[TeamId],
    scores: &DMatrix<f64>,
    games: &DMatrix<f64>,
    options: &NonlinearOptions,
) -> Result<NonlinearOutcome> {
    let n = teams.len();
    check_matrix("scores", scores, n)?;
    check_matrix("games", games, n)?;
    if !options.tol.is_finite() || options.tol < 0.0 {
        return Err(RankingError::Configuration(format!(
            "tolerance must be a non-negative number, got {}",
            options.tol
        )));
    }

    let games_played = row_sums(games);
    if let Some(i) = games_played.iter().position(|&g| g <= 0.0) {
        return Err(RankingError::ZeroGamesPlayed {
            team: teams[i].clone(),
        });
    }

    // Depends only on the season scores, so it is fixed across iterations.
    let strength = DMatrix::from_fn(n, n, |i, j| relative_strength(scores[(i, j)], scores[(j, i)]));

    let mut ranking = DVector::from_element(n, 1.0);
    for iteration in 1..=options.max_iter {
        let next = DVector::from_fn(n, |i, _| {
            let influence: f64 = (0..n)
                .map(|j| saturating_influence(strength[(i, j)] * ranking[j]))
                .sum();
            influence / games_played[i]
        });

        let delta = (&next - &ranking).lp_norm(1);
        tracing::trace!(iteration, delta, "Nonlinear method iteration");

        if delta < options.tol {
            tracing::info!("Nonlinear method converged after {} iterations", iteration);
            return Ok(NonlinearOutcome {
                ranking: next,
                converged: true,
                iterations: iteration,
            });
        }
        ranking = next;
    }

    tracing::warn!(
        "Nonlinear method reached {} iterations without converging (tol {:e})",
        options.max_iter,
        options.tol
    );
    Ok(NonlinearOutcome {
        ranking,
        converged: false,
        iterations: options.max_iter,
    })
}

fn check_matrix(label: &str, m: &DMatrix<f64>, n: usize) -> Result<()> {
    if m.nrows() != n || m.ncols() != n {
        return Err(RankingError::InvalidInput(format!(
            "{} matrix is {}x{}, expected {}x{}",
            label,
            m.nrows(),
            m.ncols(),
            n,
            n
        )));
    }
    if m.iter().any(|&x| !x.is_finite() || x < 0.0) {
        return Err(RankingError::InvalidInput(format!(
            "{} matrix must contain non-negative numbers",
            label
        )));
    }
    Ok(())
}
