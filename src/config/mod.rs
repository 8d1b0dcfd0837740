//! Runtime configuration, read from the environment (and `.env` via dotenv).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{RankingError, Result};
use crate::models::PreferenceMethod;
use crate::services::{NonlinearOptions, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub method: PreferenceMethod,
    pub nonlinear: NonlinearOptions,
    pub output_dir: PathBuf,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            method: PreferenceMethod::default(),
            nonlinear: NonlinearOptions::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Read `KEENER_METHOD`, `KEENER_MAX_ITER`, `KEENER_TOL`,
    /// `KEENER_OUTPUT_DIR` and `PORT`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let method = match lookup("KEENER_METHOD") {
            Some(raw) => raw.parse::<PreferenceMethod>()?,
            None => PreferenceMethod::default(),
        };
        let max_iter = parse_var(&lookup, "KEENER_MAX_ITER", DEFAULT_MAX_ITERATIONS)?;
        let tol = parse_var(&lookup, "KEENER_TOL", DEFAULT_TOLERANCE)?;
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let output_dir = lookup("KEENER_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let config = Self {
            method,
            nonlinear: NonlinearOptions { max_iter, tol },
            output_dir,
            port,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.nonlinear.tol.is_finite() || self.nonlinear.tol < 0.0 {
            return Err(RankingError::Configuration(format!(
                "tolerance must be a non-negative number, got {}",
                self.nonlinear.tol
            )));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            RankingError::Configuration(format!("{} has invalid value '{}'", key, raw))
        }),
        None => Ok(default),
    }
}
