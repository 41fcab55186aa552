//! Tabular reports over a whole filtered collection.
//!
//! A report is built from one unwindowed read and rendered either as a
//! paginated fixed-width text document or as JSON.

use crate::error::{TahfidzError, Result};
use crate::gateway::{Gateway, select_all};
use crate::list::{QueryIntent, Resource, decode_page};
use chrono::{DateTime, Datelike, Utc};
use serde_json::{Map, Value, json};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Widest a text column may grow before cells are cut.
const MAX_COLUMN_WIDTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Text => "txt",
            ReportFormat::Json => "json",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub subtitle: String,
    pub date_format: String,
    /// Table rows per text page.
    pub rows_per_page: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            subtitle: "Tahfidz Management System".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            rows_per_page: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub subtitle: String,
    pub generated_at: DateTime<Utc>,
    /// Applied-filter summary.
    pub filters: String,
    /// Headers, starting with the sequence column `No`.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Counts per category; empty for resources without one.
    pub summary: Vec<(String, usize)>,
    rows_per_page: usize,
}

/// Reads every row matching `intent` and lays it out as a report.
///
/// Fails with [`TahfidzError::EmptyExport`] when nothing matches.
pub async fn export<R: Resource, G: Gateway>(
    gateway: &G,
    intent: &QueryIntent,
    options: &ReportOptions,
) -> Result<Report> {
    let query = intent.to_full_query::<R>();
    let page = decode_page::<R>(select_all(gateway, &query).await?)?;
    if page.rows.is_empty() {
        tracing::info!(collection = R::COLLECTION, filters = %intent.filter_summary(), "export aborted, no rows");
        return Err(TahfidzError::EmptyExport);
    }

    let mut columns = vec!["No".to_string()];
    columns.extend(R::COLUMNS.iter().map(|c| c.to_string()));
    let rows = page
        .rows
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut cells = vec![(i + 1).to_string()];
            cells.extend(R::cells(record, &options.date_format));
            cells
        })
        .collect();

    tracing::debug!(collection = R::COLLECTION, rows = page.rows.len(), "report built");
    Ok(Report {
        title: R::TITLE.to_string(),
        subtitle: options.subtitle.clone(),
        generated_at: Utc::now(),
        filters: intent.filter_summary(),
        columns,
        rows,
        summary: R::summary(&page.rows),
        rows_per_page: options.rows_per_page.max(1),
    })
}

impl Report {
    /// `<Title>-<YYYY-MM-DD>.<ext>`
    pub fn file_name(&self, format: ReportFormat) -> String {
        format!(
            "{}-{}.{}",
            self.title.replace(' ', "-"),
            self.generated_at.format("%Y-%m-%d"),
            format.extension()
        )
    }

    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.rows_per_page).max(1)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.render_json(),
        }
    }

    pub fn render_text(&self) -> String {
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .min(MAX_COLUMN_WIDTH)
            })
            .collect();
        let rule = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");
        let width = rule.chars().count();

        let pages = self.page_count();
        let mut out = String::new();
        for (index, chunk) in self.rows.chunks(self.rows_per_page).enumerate() {
            if index == 0 {
                let _ = writeln!(out, "{}", center(&self.title.to_uppercase(), width));
                let _ = writeln!(out, "{}", center(&self.subtitle, width));
                let _ = writeln!(
                    out,
                    "{}",
                    center(
                        &format!("Printed: {}", self.generated_at.format("%Y-%m-%d %H:%M UTC")),
                        width
                    )
                );
                let _ = writeln!(out, "{}", center(&format!("Total: {} records", self.rows.len()), width));
                let _ = writeln!(out, "{}", center(&format!("Filters: {}", self.filters), width));
                out.push('\n');
            }

            let _ = writeln!(out, "{}", format_row(&self.columns, &widths));
            let _ = writeln!(out, "{}", rule);
            for row in chunk {
                let _ = writeln!(out, "{}", format_row(row, &widths));
            }

            if index + 1 == pages && !self.summary.is_empty() {
                out.push('\n');
                let _ = writeln!(out, "Summary");
                for (label, count) in &self.summary {
                    let _ = writeln!(out, "  {:<12} {}", label, count);
                }
            }

            out.push('\n');
            let _ = writeln!(out, "{}", center(&format!("Page {} of {}", index + 1, pages), width));
            let _ = writeln!(
                out,
                "{}",
                center(
                    &format!("Tahfidz Management System (c) {}", self.generated_at.year()),
                    width
                )
            );
            if index + 1 < pages {
                out.push('\u{c}');
                out.push('\n');
            }
        }
        out
    }

    pub fn render_json(&self) -> Result<String> {
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect();
                Value::Object(obj)
            })
            .collect();
        let summary: Map<String, Value> = self
            .summary
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();
        let doc = json!({
            "title": self.title,
            "subtitle": self.subtitle,
            "generated_at": self.generated_at.to_rfc3339(),
            "total": self.rows.len(),
            "filters": self.filters,
            "columns": self.columns,
            "rows": rows,
            "summary": summary,
        });
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Writes the rendered report into `dir` and returns the file path.
    pub fn save(&self, format: ReportFormat, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(format));
        let content = self.render(format)?;

        let mut temp_file = NamedTempFile::new_in(dir)
            .map_err(|e| TahfidzError::Storage(format!("Failed to create temp file: {}", e)))?;
        temp_file.write_all(content.as_bytes())?;
        temp_file
            .persist(&path)
            .map_err(|e| TahfidzError::Storage(format!("Failed to write report: {}", e)))?;
        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((width - len) / 2), text)
}

fn fit(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    if len <= width {
        return format!("{}{}", cell, " ".repeat(width - len));
    }
    let mut cut: String = cell.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(i, w)| fit(cells.get(i).map(String::as_str).unwrap_or(""), *w))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}
