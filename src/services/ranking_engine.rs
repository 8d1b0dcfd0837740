use nalgebra::{Complex, DVector};

use crate::error::Result;
use crate::models::{GameRecord, PreferenceMethod, Team, TeamId};
use crate::services::direct_method::dominant_eigenpair_ranking;
use crate::services::matrix_builder::{build_matrices, SeasonMatrices};
use crate::services::nonlinear_method::{nonlinear_rank, NonlinearOptions, NonlinearOutcome};

/// Both Keener rankings for one season.
#[derive(Debug, Clone)]
pub struct SeasonRanking {
    pub matrices: SeasonMatrices,
    /// Dominant eigenvalue of the preference matrix.
    pub eigenvalue: Complex<f64>,
    pub direct: DVector<f64>,
    pub nonlinear: NonlinearOutcome,
}

pub struct RankingEngine {
    method: PreferenceMethod,
    options: NonlinearOptions,
}

impl RankingEngine {
    pub fn new(method: PreferenceMethod, options: NonlinearOptions) -> Self {
        Self { method, options }
    }

    pub fn method(&self) -> PreferenceMethod {
        self.method
    }

    pub fn options(&self) -> &NonlinearOptions {
        &self.options
    }

    /// Build the season matrices once and run both ranking methods on them.
    pub fn rank_season(&self, teams: &[Team], games: &[GameRecord]) -> Result<SeasonRanking> {
        let ids: Vec<TeamId> = teams.iter().map(|t| t.abbr.clone()).collect();
        let matrices = build_matrices(&ids, games, self.method())?;

        let (eigenvalue, direct) = dominant_eigenpair_ranking(&matrices.preference)?;
        let nonlinear = nonlinear_rank(&ids, &matrices.scores, &matrices.games, self.options())?;

        tracing::info!(
            "Ranked {} teams from {} games (method: {}, nonlinear converged: {} in {}/{} iterations)",
            ids.len(),
            games.len(),
            self.method(),
            nonlinear.converged,
            nonlinear.iterations,
            self.options().max_iter
        );

        Ok(SeasonRanking {
            matrices,
            eigenvalue,
            direct,
            nonlinear,
        })
    }
}
