//! Table formatting for CLI list commands
//!
//! List commands build [`TableRow`]s of typed [`CellValue`]s and hand them
//! to a [`TableFormatter`], which renders aligned colored columns for a
//! terminal, CSV for spreadsheets, or bare ids for piping.

use chrono::{DateTime, Local, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, format_money, truncate_str};
use crate::cli::OutputFormat;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Record id (cyan)
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Where a client came from: ERP (`true`) or captured locally
    Origin(bool),
    /// Order state: all lines validated or still open
    Validated(bool),
    /// Amount in euros
    Money(f64),
    /// Percentage such as a VAT rate
    Percent(f64),
    Number(i64),
    /// DateTime displayed as local date
    Date(DateTime<Utc>),
    Empty,
}

impl CellValue {
    /// Format for aligned terminal output (with colors if terminal)
    pub fn format_tsv(&self, width: usize) -> String {
        match self {
            CellValue::Id(id) => format!("{:<width$}", style(id).cyan(), width = width),
            CellValue::Text(s) => {
                format!("{:<width$}", truncate_str(s, width.saturating_sub(2)), width = width)
            }
            CellValue::Origin(from_api) => {
                let styled = if *from_api {
                    style("erp").magenta()
                } else {
                    style("local").green()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Validated(validated) => {
                let styled = if *validated {
                    style("validée").green()
                } else {
                    style("ouverte").yellow()
                };
                format!("{:<width$}", styled, width = width)
            }
            CellValue::Money(_) | CellValue::Percent(_) | CellValue::Number(_) => {
                format!("{:>width$}", self.raw(), width = width)
            }
            CellValue::Date(_) => format!("{:<width$}", self.raw(), width = width),
            CellValue::Empty => format!("{:<width$}", style("-").dim(), width = width),
        }
    }

    /// Format for CSV output (RFC 4180, no colors)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => escape_csv(s),
            CellValue::Money(v) => format!("{:.2}", v),
            CellValue::Percent(v) => format!("{}", v),
            CellValue::Empty => String::new(),
            other => other.raw(),
        }
    }

    /// Uncolored display text
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => s.clone(),
            CellValue::Origin(true) => "erp".to_string(),
            CellValue::Origin(false) => "local".to_string(),
            CellValue::Validated(true) => "validée".to_string(),
            CellValue::Validated(false) => "ouverte".to_string(),
            CellValue::Money(v) => format_money(*v),
            CellValue::Percent(v) => format!("{} %", v),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                local.format("%Y-%m-%d").to_string()
            }
            CellValue::Empty => "-".to_string(),
        }
    }

    /// Character count of the uncolored text
    pub fn display_width(&self) -> usize {
        self.raw().chars().count()
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Renders rows in the requested output format
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Drop the "N record(s) found" footer
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    pub fn output<I>(&self, rows: I, format: OutputFormat)
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Csv => self.output_csv(&rows),
            OutputFormat::Id => {
                for row in &rows {
                    println!("{}", row.id);
                }
            }
            _ => self.output_tsv(&rows),
        }
    }

    /// Column widths sized to content, capped at each column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.display_width() + 2)
                    .max()
                    .unwrap_or(0);
                col.header.len().max(content).min(col.width)
            })
            .collect()
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        println!("{}", header.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => CellValue::Empty.format_tsv(*w),
                })
                .collect();
            println!("{}", parts.join(" "));
        }

        if self.show_summary {
            println!();
            println!(
                "{} {}(s) found.",
                style(rows.len()).cyan(),
                self.entity_name
            );
        }
    }

    fn output_csv(&self, rows: &[TableRow]) {
        let headers: Vec<&str> = self.columns.iter().map(|c| c.key).collect();
        println!("{}", headers.join(","));

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| {
                    row.get(col.key)
                        .map(CellValue::format_csv)
                        .unwrap_or_default()
                })
                .collect();
            println!("{}", values.join(","));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_values() {
        assert_eq!(CellValue::Money(12.5).raw(), "12.50 €");
        assert_eq!(CellValue::Origin(true).raw(), "erp");
        assert_eq!(CellValue::Validated(false).raw(), "ouverte");
        assert_eq!(CellValue::Empty.raw(), "-");
    }

    #[test]
    fn test_csv_escaping() {
        assert_eq!(CellValue::Text("Dupont, Fils".into()).format_csv(), "\"Dupont, Fils\"");
        assert_eq!(CellValue::Money(3.0).format_csv(), "3.00");
        assert_eq!(CellValue::Empty.format_csv(), "");
    }

    #[test]
    fn test_widths_capped() {
        let columns = [
            ColumnDef::new("id", "ID", 6),
            ColumnDef::new("nom", "NOM", 10),
        ];
        let rows = vec![TableRow::new("1")
            .cell("id", CellValue::Id("1".into()))
            .cell("nom", CellValue::Text("Un nom beaucoup trop long".into()))];
        let formatter = TableFormatter::new(&columns, "client");
        assert_eq!(formatter.calculate_widths(&rows), vec![3, 10]);
    }
}
