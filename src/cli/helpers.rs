//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::store::{DataSet, LocalDir};

/// The data directory, its layered config and the dataset stored there
pub struct Workspace {
    pub data_dir: PathBuf,
    pub config: Config,
    pub data: DataSet,
}

impl Workspace {
    /// Resolve the data directory from `--data-dir` / `DOLISALES_DATA_DIR`
    /// or the platform default, and open everything in it
    pub fn open(global: &GlobalOpts) -> Self {
        let data_dir = global
            .data_dir
            .clone()
            .unwrap_or_else(Config::default_data_dir);
        let config = Config::load(&data_dir);
        let data = DataSet::open(
            Arc::new(LocalDir::new(data_dir.clone())),
            config.history_size(),
        );
        tracing::debug!(data_dir = %data_dir.display(), "workspace opened");
        Self {
            data_dir,
            config,
            data,
        }
    }

    /// Output format after resolving `auto` through the config default
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        if global.format != OutputFormat::Auto {
            return global.format;
        }
        match self.config.default_format.as_deref() {
            Some("json") => OutputFormat::Json,
            Some("tsv") => OutputFormat::Tsv,
            Some("csv") => OutputFormat::Csv,
            Some("id") => OutputFormat::Id,
            _ => OutputFormat::Auto,
        }
    }
}

/// Ask `[y/N]` on stdin
pub fn confirm(prompt: &str) -> miette::Result<bool> {
    use miette::IntoDiagnostic;
    use std::io::Write;

    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().into_diagnostic()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).into_diagnostic()?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Amount with two decimals and the euro sign
pub fn format_money(amount: f64) -> String {
    format!("{:.2} €", amount)
}

/// Parse a `YYYY-MM-DD` date as midnight UTC
pub fn parse_day(s: &str) -> miette::Result<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| miette::miette!("Invalid date '{}': {} (expected YYYY-MM-DD)", s, e))?;
    let midnight = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| miette::miette!("Invalid date '{}'", s))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

/// End of the given day, for inclusive upper bounds
pub fn parse_day_end(s: &str) -> miette::Result<DateTime<Utc>> {
    Ok(parse_day(s)? + chrono::Duration::days(1) - chrono::Duration::milliseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Adresse non renseignée", 10), "Adresse...");
        assert_eq!(truncate_str("éééééé", 5), "éé...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_parse_day() {
        let start = parse_day("2024-03-01").unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        let end = parse_day_end("2024-03-01").unwrap();
        assert_eq!(end.to_rfc3339(), "2024-03-01T23:59:59.999+00:00");
        assert!(parse_day("01/03/2024").is_err());
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(25.0), "25.00 €");
    }
}
