use anyhow::{Context, Result};
use std::path::Path;

use crate::models::RankingRow;
use crate::utils::{format_rating, latex_escape};

pub fn write_rankings_csv<P: AsRef<Path>>(path: P, rows: &[RankingRow]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    tracing::info!("Saved {} rankings to {}", rows.len(), path.display());
    Ok(())
}

/// Booktabs table of a ranking.
pub fn render_latex(caption: &str, rows: &[RankingRow]) -> String {
    let mut out = String::new();
    out.push_str("\\begin{table}[ht]\n\\centering\n");
    out.push_str(&format!("\\caption{{{}}}\n", latex_escape(caption)));
    out.push_str("\\begin{tabular}{rllrrr}\n\\toprule\n");
    out.push_str("Rank & Abbr & Team & GP & W & Rating \\\\\n\\midrule\n");
    for row in rows {
        out.push_str(&format!(
            "{} & {} & {} & {} & {} & {} \\\\\n",
            row.rank,
            latex_escape(&row.team),
            latex_escape(&row.name),
            row.games,
            row.wins,
            format_rating(row.rating)
        ));
    }
    out.push_str("\\bottomrule\n\\end{tabular}\n\\end{table}\n");
    out
}

pub fn write_rankings_latex<P: AsRef<Path>>(path: P, caption: &str, rows: &[RankingRow]) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, render_latex(caption, rows))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Saved LaTeX table to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<RankingRow> {
        vec![
            RankingRow {
                rank: 1,
                team: "TAM".to_string(),
                name: "Texas A&M".to_string(),
                games: 12,
                wins: 9,
                rating: 0.41,
            },
            RankingRow {
                rank: 2,
                team: "UGA".to_string(),
                name: "Georgia".to_string(),
                games: 12,
                wins: 8,
                rating: 0.33,
            },
        ]
    }

    #[test]
    fn test_csv_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("direct.csv");
        write_rankings_csv(&path, &rows()).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["rank", "team", "name", "games", "wins", "rating"]
        );
        let read: Vec<RankingRow> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(read, rows());
    }

    #[test]
    fn test_latex_escapes_cells() {
        let latex = render_latex("Direct method", &rows());
        assert!(latex.contains("Texas A\\&M"));
        assert!(latex.contains("\\toprule"));
        assert_eq!(latex.matches("\\\\\n").count(), 3);
    }

    #[test]
    fn test_write_latex_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("direct.tex");
        write_rankings_latex(&path, "Direct", &rows()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("\\begin{table}"));
    }
}
