use chrono::NaiveDate;

use crate::models::TeamId;

/// Date formats accepted in league files.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a game date, accepting ISO dates and US-style month/day/year.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Timestamps such as "2023-10-24 19:30:00" keep only the date part.
    let date_part = raw.split_whitespace().next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Normalize a winner column value; blanks and tie markers mean no winner.
pub fn parse_winner(raw: Option<&str>) -> Option<TeamId> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    match value.to_lowercase().as_str() {
        "tie" | "draw" | "none" | "nan" | "-" => None,
        _ => Some(value.to_string()),
    }
}

/// Escape LaTeX special characters in table cells.
pub fn latex_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '\\' => out.push_str("\\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a rating for display; tiny nonlinear ratings switch to scientific notation.
pub fn format_rating(value: f64) -> String {
    if value != 0.0 && value.abs() < 1e-3 {
        format!("{:.4e}", value)
    } else {
        format!("{:.4}", value)
    }
}

/// Render a count stored as a float (games, wins) as an integer.
pub fn as_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
