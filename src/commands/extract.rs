use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;

use crate::dates::{self, DateExtractionResult};
use crate::utils::progress::create_spinner;

pub async fn execute(path: &str, format: &str) -> Result<()> {
    let spinner = create_spinner(&format!("Extracting dates from {}...", path));

    let target = Path::new(path);
    let result = if target.is_dir() {
        extract_from_directory(target)?
    } else {
        let text = std::fs::read_to_string(target).with_context(|| format!("reading {}", path))?;
        dates::extract_all(&text, Utc::now())
    };

    spinner.finish_and_clear();

    print_result(&result, format);
    Ok(())
}

fn extract_from_directory(dir: &Path) -> Result<DateExtractionResult> {
    let mut merged: Option<DateExtractionResult> = None;

    for entry in std::fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let Ok(text) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        let extracted = dates::extract_all(&text, Utc::now());
        merged = dates::merge(merged, Some(extracted));
    }

    Ok(merged.unwrap_or_default())
}

fn print_result(result: &DateExtractionResult, format: &str) {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(result).unwrap_or_default());
        }
        "csv" => {
            println!("kind,date");
            for (kind, date) in labeled_dates(result) {
                println!("{},{}", kind, date);
            }
            for range in &result.date_ranges {
                println!("{}_start,{}", range.kind, range.start.as_deref().unwrap_or(""));
                println!("{}_end,{}", range.kind, range.end.as_deref().unwrap_or(""));
            }
        }
        "ical" => {
            println!("BEGIN:VCALENDAR");
            println!("VERSION:2.0");
            for (kind, date) in labeled_dates(result) {
                println!("BEGIN:VEVENT");
                println!("SUMMARY:{}", kind);
                println!("DTSTART;VALUE=DATE:{}", date.replace('-', ""));
                println!("END:VEVENT");
            }
            println!("END:VCALENDAR");
        }
        _ => {
            println!("\n{}", "📅 Extracted Dates:".green().bold());
            for (kind, date) in labeled_dates(result) {
                println!("  {} {}", format!("{}:", kind).white().bold(), date.yellow());
            }
            if !result.date_ranges.is_empty() {
                println!("\n{}", "Date Ranges:".white().bold());
                for range in &result.date_ranges {
                    println!(
                        "  {} {} – {}",
                        range.kind.cyan(),
                        range.start.as_deref().unwrap_or("?"),
                        range.end.as_deref().unwrap_or("?")
                    );
                }
            }
        }
    }
}

fn labeled_dates(result: &DateExtractionResult) -> Vec<(&'static str, String)> {
    [
        ("filing_date", &result.filing_date),
        ("event_date", &result.event_date),
        ("hearing_date", &result.hearing_date),
        ("decision_date", &result.decision_date),
        ("served_date", &result.served_date),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.clone().map(|v| (label, v)))
    .collect()
}
