use anyhow::{Context, Result};
use nalgebra::DMatrix;
use std::path::{Path, PathBuf};

use keener_rank::data::export::{write_rankings_csv, write_rankings_latex};
use keener_rank::data::{load_games, load_teams};
use keener_rank::report::{merge_rankings, render_table};
use keener_rank::{build_matrices, Config, PreferenceMethod, RankingEngine, TeamId, TeamIndex};

pub fn rank_season(games_path: &Path, teams_path: &Path, config: &Config, save_to: Option<PathBuf>) -> Result<()> {
    let teams = load_teams(teams_path)?;
    let games = load_games(games_path)?;

    println!(
        "🏆 Ranking {} teams from {} games (method: {})...\n",
        teams.len(),
        games.len(),
        config.method
    );

    let engine = RankingEngine::new(config.method, config.nonlinear);
    let ranking = engine.rank_season(&teams, &games)?;

    let direct = merge_rankings(&teams, &ranking.matrices, &ranking.direct)?;
    let nonlinear = merge_rankings(&teams, &ranking.matrices, &ranking.nonlinear.ranking)?;

    println!(
        "{}",
        render_table(
            &format!("📈 Direct method (dominant eigenvalue {:.6})", ranking.eigenvalue.re),
            &direct
        )
    );
    println!("{}", render_table("🔁 Nonlinear method", &nonlinear));

    if ranking.nonlinear.converged {
        println!("✅ Nonlinear method converged after {} iterations.", ranking.nonlinear.iterations);
    } else {
        println!(
            "⚠️  Nonlinear method stopped after {} iterations without converging (tol {:e}).",
            ranking.nonlinear.iterations, config.nonlinear.tol
        );
    }

    if let Some(dir) = save_to {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        write_rankings_csv(dir.join("direct.csv"), &direct)?;
        write_rankings_csv(dir.join("nonlinear.csv"), &nonlinear)?;
        write_rankings_latex(dir.join("direct.tex"), "Direct method rankings", &direct)?;
        write_rankings_latex(dir.join("nonlinear.tex"), "Nonlinear method rankings", &nonlinear)?;
        println!("💾 Saved rankings to {}", dir.display());
    }

    Ok(())
}

pub fn show_matrices(games_path: &Path, teams_path: &Path, method: PreferenceMethod) -> Result<()> {
    let teams = load_teams(teams_path)?;
    let games = load_games(games_path)?;
    let ids: Vec<TeamId> = teams.iter().map(|t| t.abbr.clone()).collect();

    let matrices = build_matrices(&ids, &games, method)?;

    println!("{}", format_matrix("Scores Matrix:", &matrices.teams, &matrices.scores, 0));
    println!("{}", format_matrix("Games Matrix:", &matrices.teams, &matrices.games, 0));
    println!("{}", format_matrix("Wins Matrix:", &matrices.teams, &matrices.wins, 0));
    println!(
        "{}",
        format_matrix(
            &format!("Preference Matrix A ({}):", method),
            &matrices.teams,
            &matrices.preference,
            3
        )
    );

    Ok(())
}

/// Labelled matrix with team ids on both axes.
fn format_matrix(title: &str, teams: &TeamIndex, m: &DMatrix<f64>, precision: usize) -> String {
    let width = teams
        .ids()
        .iter()
        .map(|id| id.len())
        .max()
        .unwrap_or(0)
        .max(precision + 4);

    let mut out = format!("{}\n{:>width$}", title, "", width = width);
    for id in teams.ids() {
        out.push_str(&format!(" {:>width$}", id, width = width));
    }
    out.push('\n');
    for (i, id) in teams.ids().iter().enumerate() {
        out.push_str(&format!("{:>width$}", id, width = width));
        for j in 0..m.ncols() {
            out.push_str(&format!(" {:>width$.prec$}", m[(i, j)], width = width, prec = precision));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_matrix_labels_rows_and_columns() {
        let teams = TeamIndex::from_ids(&["BOS", "NYK"]).unwrap();
        let m = DMatrix::from_row_slice(2, 2, &[0.0, 3.0, 1.0, 0.0]);
        let text = format_matrix("Games Matrix:", &teams, &m, 0);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Games Matrix:");
        assert!(lines[1].contains("BOS") && lines[1].contains("NYK"));
        assert!(lines[2].trim_start().starts_with("BOS"));
        assert!(lines[2].ends_with('3'));
    }

    #[test]
    fn test_rank_season_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let games = dir.path().join("league.csv");
        let teams = dir.path().join("teams.csv");
        std::fs::write(
            &games,
            "date,home,away,home-score,away-score,win\n\
             2024-01-01,A,B,10,3,A\n\
             2024-01-02,B,C,7,7,\n\
             2024-01-03,C,A,5,20,A\n",
        )
        .unwrap();
        std::fs::write(&teams, "abbr,name\nA,Aces\nB,Bears\nC,Cats\n").unwrap();

        let out = dir.path().join("out");
        rank_season(&games, &teams, &Config::default(), Some(out.clone())).unwrap();
        for file in ["direct.csv", "nonlinear.csv", "direct.tex", "nonlinear.tex"] {
            assert!(out.join(file).exists(), "missing {}", file);
        }
    }
}
