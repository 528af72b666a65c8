//! `gdrive download` and `gdrive upload`

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use gdrive_api::export::{self, ExportFormat};
use gdrive_api::DownloadOutcome;
use gdrive_core::listing::format_bytes;
use tracing::info;

use super::{parse_path, Context};

// ============================================================================
// Download
// ============================================================================

#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// File or document to download
    path: String,

    /// Local file or directory to write to
    #[arg(default_value = ".")]
    destination: PathBuf,

    /// Export format for documents, as an extension (pdf) or mime type
    #[arg(short, long)]
    format: Option<String>,
}

impl DownloadCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let fmt = ctx.formatter();
        let path = parse_path(&self.path)?;
        let mut drive = ctx.connect()?;

        let wanted = self.format.clone();
        let interactive = !ctx.is_json() && std::io::stdin().is_terminal();
        let chooser =
            move |formats: &[ExportFormat]| choose_export(formats, wanted.as_deref(), interactive);
        let label = path.file_name().unwrap_or("download").to_string();

        info!(path = %path, destination = %self.destination.display(), "Downloading");
        let outcome = drive
            .download(&path, &self.destination, chooser, ctx.progress(label))
            .await
            .with_context(|| format!("Failed to download '{path}'"))?;

        match outcome {
            DownloadOutcome::Saved { path: saved, bytes } => {
                if ctx.is_json() {
                    fmt.print_json(&serde_json::json!({
                        "saved": saved.display().to_string(),
                        "bytes": bytes,
                    }));
                } else {
                    fmt.success(&format!(
                        "Saved {} ({})",
                        saved.display(),
                        format_bytes(bytes)
                    ));
                }
            }
            DownloadOutcome::WebView { url } => {
                if ctx.is_json() {
                    fmt.print_json(&serde_json::json!({ "web_view_link": url }));
                } else {
                    fmt.warn(&format!("'{path}' has no downloadable content"));
                    fmt.info(&format!("Open it in a browser: {url}"));
                }
            }
        }
        Ok(())
    }
}

/// Picks the export format from `--format`, or by asking on the terminal
fn choose_export(
    formats: &[ExportFormat],
    wanted: Option<&str>,
    interactive: bool,
) -> Option<ExportFormat> {
    if let Some(wanted) = wanted {
        return export::select(formats, wanted).cloned();
    }
    if !interactive {
        return None;
    }

    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "This document can be exported as:");
    for (i, format) in formats.iter().enumerate() {
        let _ = writeln!(stderr, "  {}) {} ({})", i + 1, format.label(), format.mime_type);
    }
    let _ = write!(stderr, "Format: ");
    let _ = stderr.flush();
    drop(stderr);

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer).ok()?;
    pick_format(formats, &answer)
}

/// Interprets a prompt answer: a 1-based number, an extension, or a mime type
fn pick_format(formats: &[ExportFormat], answer: &str) -> Option<ExportFormat> {
    let answer = answer.trim();
    if let Ok(choice) = answer.parse::<usize>() {
        return choice.checked_sub(1).and_then(|i| formats.get(i)).cloned();
    }
    export::select(formats, answer).cloned()
}

// ============================================================================
// Upload
// ============================================================================

#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Local file or directory
    source: PathBuf,

    /// Destination folder
    #[arg(default_value = "/")]
    destination: String,
}

impl UploadCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let fmt = ctx.formatter();
        let destination = parse_path(&self.destination)?;
        let mut drive = ctx.connect()?;

        let mut progress_for = |local: &Path, _size: u64| ctx.progress(display_name(local));

        info!(source = %self.source.display(), destination = %destination, "Uploading");
        let summary = drive
            .upload(&self.source, &destination, &mut progress_for)
            .await
            .with_context(|| {
                format!(
                    "Failed to upload '{}' to '{destination}'",
                    self.source.display()
                )
            })?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "files": summary.files,
                "folders": summary.folders,
            }));
            return Ok(());
        }

        let count = summary.files.len();
        fmt.success(&format!(
            "Uploaded {} file{} to '{destination}'",
            count,
            if count == 1 { "" } else { "s" }
        ));
        if !summary.folders.is_empty() {
            fmt.info(&format!("{} folder(s) created or reused", summary.folders.len()));
        }
        if !ctx.quiet {
            for file in &summary.files {
                let size = file.size.map(format_bytes).unwrap_or_else(|| "-".into());
                fmt.info(&format!("{}  {}  {}", file.name, size, file.id));
            }
        }
        Ok(())
    }
}

fn display_name(local: &Path) -> String {
    local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| local.display().to_string())
}
