//! `gdrive ls` - list the contents of a folder

use anyhow::{Context as _, Result};
use clap::Args;
use gdrive_core::listing::build_rows;
use tracing::info;

use super::{parse_path, Context};
use crate::output::render_table;

#[derive(Debug, Args)]
pub struct ListCommand {
    /// Folder to list
    #[arg(default_value = "/")]
    path: String,

    /// Show whether each object is shared publicly
    #[arg(short = 'p', long)]
    visibility: bool,

    /// Show object IDs
    #[arg(long)]
    ids: bool,
}

impl ListCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let fmt = ctx.formatter();
        let path = parse_path(&self.path)?;
        let mut drive = ctx.connect()?;

        info!(path = %path, "Listing");
        let objects = drive
            .list(&path)
            .await
            .with_context(|| format!("Failed to list '{path}'"))?;
        let rows = build_rows(&objects, self.visibility);

        if ctx.is_json() {
            fmt.print_json(&serde_json::to_value(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            fmt.info(&format!("'{path}' is empty"));
            return Ok(());
        }
        for line in render_table(&rows, self.ids) {
            println!("{line}");
        }
        Ok(())
    }
}
