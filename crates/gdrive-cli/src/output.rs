use std::io::Write;

use gdrive_core::domain::{ProgressCallback, TransferProgress, Visibility};
use gdrive_core::listing::{format_bytes, ListingRow};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

// ============================================================================
// Listing table
// ============================================================================

/// Lays out listing rows as aligned text columns, header first
pub fn render_table(rows: &[ListingRow], show_ids: bool) -> Vec<String> {
    let with_visibility = rows.iter().any(|r| r.visibility.is_some());

    let mut header = vec!["NAME", "KIND", "SIZE", "MODIFIED"];
    if with_visibility {
        header.push("VISIBILITY");
    }
    if show_ids {
        header.push("ID");
    }

    let mut table: Vec<Vec<String>> = vec![header.into_iter().map(String::from).collect()];
    for row in rows {
        let mut cells = vec![
            row.name.clone(),
            row.kind.to_string(),
            row.size.clone(),
            row.last_modified.clone(),
        ];
        if with_visibility {
            cells.push(match row.visibility {
                Some(Visibility::Public) => "public".to_string(),
                Some(Visibility::Private) => "private".to_string(),
                None => "-".to_string(),
            });
        }
        if show_ids {
            cells.push(row.id.clone());
        }
        table.push(cells);
    }

    let columns = table[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            table
                .iter()
                .map(|cells| cells[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    table
        .iter()
        .map(|cells| {
            let line = cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            line.trim_end().to_string()
        })
        .collect()
}

// ============================================================================
// Progress
// ============================================================================

/// One progress line, e.g. `report.pdf:  25% (512 bytes / 2.00 KB)`
pub fn progress_line(label: &str, progress: &TransferProgress) -> String {
    format!(
        "{label}: {:>3}% ({} / {})",
        progress.percent,
        format_bytes(progress.transferred),
        format_bytes(progress.total)
    )
}

/// Progress callback that redraws a single stderr line per percent step
pub fn progress_reporter(label: String) -> ProgressCallback {
    let mut last_percent = None;
    Box::new(move |progress: TransferProgress| {
        if last_percent == Some(progress.percent) {
            return;
        }
        last_percent = Some(progress.percent);

        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{}", progress_line(&label, &progress));
        if progress.percent >= 100 {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    })
}
