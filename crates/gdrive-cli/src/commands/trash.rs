//! `gdrive trash` - list, empty, and restore from the trash

use anyhow::{Context as _, Result};
use clap::Subcommand;
use gdrive_core::listing::build_rows;
use tracing::info;

use super::Context;
use crate::output::render_table;

#[derive(Debug, Subcommand)]
pub enum TrashCommand {
    /// List trashed objects
    List {
        /// Show object IDs
        #[arg(long)]
        ids: bool,
    },
    /// Permanently delete everything in the trash
    Empty {
        /// Required; emptying the trash cannot be undone
        #[arg(long)]
        yes: bool,
    },
    /// Restore a trashed object by name or ID
    Restore {
        /// Name of the trashed object (first match) or its ID
        name_or_id: String,
    },
}

impl TrashCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        match self {
            TrashCommand::List { ids } => self.execute_list(ctx, *ids).await,
            TrashCommand::Empty { yes } => self.execute_empty(ctx, *yes).await,
            TrashCommand::Restore { name_or_id } => self.execute_restore(ctx, name_or_id).await,
        }
    }

    async fn execute_list(&self, ctx: &Context, ids: bool) -> Result<()> {
        let fmt = ctx.formatter();
        let mut drive = ctx.connect()?;
        let trash = drive.list_trash().await.context("Failed to list the trash")?;
        let rows = build_rows(&trash, false);

        if ctx.is_json() {
            fmt.print_json(&serde_json::to_value(&rows)?);
        } else if rows.is_empty() {
            fmt.info("The trash is empty");
        } else {
            for line in render_table(&rows, ids) {
                println!("{line}");
            }
        }
        Ok(())
    }

    async fn execute_empty(&self, ctx: &Context, yes: bool) -> Result<()> {
        let fmt = ctx.formatter();
        if !yes {
            anyhow::bail!("Refusing to empty the trash without --yes");
        }

        let mut drive = ctx.connect()?;
        info!("Emptying trash");
        drive.empty_trash().await.context("Failed to empty the trash")?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({ "emptied": true }));
        } else {
            fmt.success("Trash emptied");
        }
        Ok(())
    }

    async fn execute_restore(&self, ctx: &Context, name_or_id: &str) -> Result<()> {
        let fmt = ctx.formatter();
        let mut drive = ctx.connect()?;

        let object = drive
            .restore(name_or_id)
            .await
            .with_context(|| format!("Failed to restore '{name_or_id}'"))?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::to_value(&object)?);
        } else {
            fmt.success(&format!("Restored '{}'", object.name));
        }
        Ok(())
    }
}
