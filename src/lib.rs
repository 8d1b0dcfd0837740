//! Keener-style rankings from a season of pairwise game results.
//!
//! Game records are folded into head-to-head scores, games, wins and
//! preference matrices; two ranking methods then derive a rating per team:
//! the direct (dominant eigenvector) method and the nonlinear fixed-point
//! method.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use keener_rank::{build_matrices, direct_rank, nonlinear_rank, GameRecord, NonlinearOptions, PreferenceMethod};
//!
//! let teams = vec!["A".to_string(), "B".to_string()];
//! let day = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
//! let games = vec![GameRecord::new(day, "A", "B", 24.0, 17.0, Some("A"))];
//!
//! let m = build_matrices(&teams, &games, PreferenceMethod::Distribute).unwrap();
//! let direct = direct_rank(&m.preference).unwrap();
//! let nonlinear = nonlinear_rank(&teams, &m.scores, &m.games, &NonlinearOptions::default()).unwrap();
//! assert!((direct.sum() - 1.0).abs() < 1e-9);
//! assert_eq!(nonlinear.ranking.len(), 2);
//! ```

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod report;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{RankingError, Result};
pub use models::{GameRecord, PreferenceMethod, RankingRow, Team, TeamId, TeamIndex};
pub use services::{
    build_matrices, direct_rank, dominant_eigenpair, nonlinear_rank, NonlinearOptions,
    NonlinearOutcome, RankingEngine, SeasonMatrices, SeasonRanking,
};
