use crate::cli::commands::ListArgs;
use crate::error::TahfidzError;
use crate::gateway::Gateway;
use crate::list::{ListController, Notice, NoticeLevel, QueryIntent, Resource};
use crate::validation;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use colored::Colorize;
use std::io::{self, Write};

/// Widest a table column may grow in terminal output.
const MAX_CELL_WIDTH: usize = 40;

/// Split a `KEY=VALUE` filter argument
pub fn parse_filter(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v))
        .ok_or_else(|| anyhow::anyhow!("Filter must be KEY=VALUE, got '{}'", raw))
}

/// Build a query intent from `--filter` arguments
pub fn build_intent<R: Resource>(filters: &[String]) -> Result<QueryIntent> {
    let mut intent = QueryIntent::for_resource::<R>();
    for raw in filters {
        let (key, value) = parse_filter(raw)?;
        intent.set_filter::<R>(key, value)?;
    }
    Ok(intent)
}

pub fn list_intent<R: Resource>(args: &ListArgs) -> Result<QueryIntent> {
    let mut intent = build_intent::<R>(&args.filters)?;
    if let Some(sort) = args.sort {
        intent.sort = sort.into();
    }
    intent.page = args.page.max(1);
    Ok(intent)
}

/// Date argument, defaulting to today
pub fn date_or_today(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(v) => Ok(validation::parse_date("Date", v)?),
        None => Ok(Local::now().date_naive()),
    }
}

/// Empty string means "clear"
pub fn optional_text(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Ask a yes/no question on the terminal; anything but `y` is a no
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(_) => input.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

pub fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message.green()),
            NoticeLevel::Error => eprintln!("{}", notice.message.red()),
        }
    }
}

/// Turn a failed mutation into the message the user should see: the inline
/// form error, else the error notice, else the error itself.
pub fn mutation_error<R: Resource, G: Gateway>(
    list: &mut ListController<'_, R, G>,
    error: TahfidzError,
) -> anyhow::Error {
    if let Some(form) = list.form_error() {
        return anyhow::anyhow!("Invalid {}: {}", R::NOUN.to_lowercase(), form);
    }
    let notices = list.take_notices();
    match notices.iter().rev().find(|n| n.level == NoticeLevel::Error) {
        Some(notice) => anyhow::anyhow!("{}", notice.message),
        None => error.into(),
    }
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

/// Print records as an aligned table with an ID column
pub fn print_table<R: Resource>(records: &[R::Record], date_format: &str) {
    let mut header = vec!["ID".to_string()];
    header.extend(R::COLUMNS.iter().map(|c| c.to_string()));

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            let mut cells = vec![R::id(r).to_string()];
            cells.extend(R::cells(r, date_format));
            cells
        })
        .collect();

    print_grid(&header, &rows);
}

/// Print an aligned table; the first column is highlighted as the row ID
pub fn print_grid(header: &[String], rows: &[Vec<String>]) {
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let line = |cells: &[String]| -> Vec<String> {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| fit(cells.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect()
    };

    println!("{}", line(header).join("  ").trim_end().bold());
    for row in rows {
        let mut cells = line(row);
        let id = cells.remove(0);
        println!("{}  {}", id.cyan(), cells.join("  ").trim_end());
    }
}

/// Print one record as labelled lines
pub fn print_record<R: Resource>(record: &R::Record, date_format: &str) {
    println!("{} {}", R::id(record).cyan().bold(), R::label(record).bold());
    let width = R::COLUMNS.iter().map(|c| c.len()).max().unwrap_or(0) + 1;
    for (column, value) in R::COLUMNS.iter().zip(R::cells(record, date_format)) {
        println!("{:<width$} {}", format!("{}:", column), value, width = width);
    }
}

/// Print the current page of a list, or the empty-state placeholder
pub fn print_page<R: Resource, G: Gateway>(list: &ListController<'_, R, G>, date_format: &str) {
    if list.rows().is_empty() {
        println!("No {} found.", R::PLURAL);
        if !list.filters().is_empty() {
            println!(
                "{}",
                format!(
                    "Filters applied: {}. Run the command without --filter to clear them.",
                    list.intent().filter_summary()
                )
                .dimmed()
            );
        }
        return;
    }

    print_table::<R>(list.rows(), date_format);
    println!(
        "{}",
        format!(
            "Page {} of {} ({} {}, sorted {})",
            list.page(),
            list.total_pages(),
            list.total(),
            R::PLURAL,
            list.sort()
        )
        .dimmed()
    );
}
