//! Single-object commands: rm, share, private, rename, cp, mv, mkdir
//!
//! Each resolves its path arguments, performs one mutation through
//! [`gdrive_api::Drive`], and prints the affected object.

use anyhow::{Context as _, Result};
use clap::Args;
use gdrive_api::RemoveMode;
use gdrive_core::domain::RemoteObject;
use tracing::info;

use super::{parse_path, Context};

/// Prints `message` for humans, or the object itself as JSON
fn report(ctx: &Context, message: &str, object: &RemoteObject) -> Result<()> {
    let fmt = ctx.formatter();
    if ctx.is_json() {
        fmt.print_json(&serde_json::to_value(object)?);
    } else {
        fmt.success(message);
    }
    Ok(())
}

#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Object to remove
    path: String,

    /// Delete permanently instead of moving to the trash
    #[arg(long)]
    permanent: bool,
}

impl RemoveCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let path = parse_path(&self.path)?;
        let mode = if self.permanent {
            RemoveMode::Permanent
        } else {
            RemoveMode::Trash
        };
        let mut drive = ctx.connect()?;

        info!(path = %path, ?mode, "Removing");
        let object = drive
            .remove(&path, mode)
            .await
            .with_context(|| format!("Failed to remove '{path}'"))?;

        let message = match mode {
            RemoveMode::Trash => format!("Moved '{}' to the trash", object.name),
            RemoveMode::Permanent => format!("Deleted '{}'", object.name),
        };
        report(ctx, &message, &object)
    }
}

#[derive(Debug, Args)]
pub struct ShareCommand {
    /// Object to share
    path: String,
}

impl ShareCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let fmt = ctx.formatter();
        let path = parse_path(&self.path)?;
        let mut drive = ctx.connect()?;

        let links = drive
            .share(&path)
            .await
            .with_context(|| format!("Failed to share '{path}'"))?;

        if ctx.is_json() {
            fmt.print_json(&serde_json::json!({
                "id": links.object.id,
                "name": links.object.name,
                "web_view_link": links.web_view_link,
                "download_link": links.download_link,
            }));
            return Ok(());
        }

        fmt.success(&format!("'{}' is now public", links.object.name));
        if let Some(link) = &links.web_view_link {
            fmt.info(&format!("View:     {link}"));
        }
        if let Some(link) = &links.download_link {
            fmt.info(&format!("Download: {link}"));
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct PrivateCommand {
    /// Object to stop sharing
    path: String,
}

impl PrivateCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let path = parse_path(&self.path)?;
        let mut drive = ctx.connect()?;

        let object = drive
            .make_private(&path)
            .await
            .with_context(|| format!("Failed to make '{path}' private"))?;
        report(ctx, &format!("'{}' is now private", object.name), &object)
    }
}

#[derive(Debug, Args)]
pub struct RenameCommand {
    /// Object to rename
    path: String,
    /// New name, without any folder part
    new_name: String,
}

impl RenameCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let path = parse_path(&self.path)?;
        let mut drive = ctx.connect()?;

        let object = drive
            .rename(&path, &self.new_name)
            .await
            .with_context(|| format!("Failed to rename '{path}'"))?;
        report(ctx, &format!("Renamed '{path}' to '{}'", object.name), &object)
    }
}

#[derive(Debug, Args)]
pub struct CopyCommand {
    /// File to copy
    source: String,
    /// Destination folder
    destination: String,
}

impl CopyCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let source = parse_path(&self.source)?;
        let destination = parse_path(&self.destination)?;
        let mut drive = ctx.connect()?;

        let copy = drive
            .copy(&source, &destination)
            .await
            .with_context(|| format!("Failed to copy '{source}' to '{destination}'"))?;
        report(
            ctx,
            &format!("Copied '{source}' to '{destination}' (id {})", copy.id),
            &copy,
        )
    }
}

#[derive(Debug, Args)]
pub struct MoveCommand {
    /// Object to move
    source: String,
    /// Destination folder
    destination: String,
}

impl MoveCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let source = parse_path(&self.source)?;
        let destination = parse_path(&self.destination)?;
        let mut drive = ctx.connect()?;

        let moved = drive
            .move_to(&source, &destination)
            .await
            .with_context(|| format!("Failed to move '{source}' to '{destination}'"))?;
        report(
            ctx,
            &format!("Moved '{source}' to '{destination}'"),
            &moved,
        )
    }
}

#[derive(Debug, Args)]
pub struct MakeFolderCommand {
    /// Folder to create
    path: String,

    /// Create missing parents and accept an existing folder
    #[arg(short, long)]
    parents: bool,
}

impl MakeFolderCommand {
    pub async fn execute(&self, ctx: &Context) -> Result<()> {
        let path = parse_path(&self.path)?;
        let mut drive = ctx.connect()?;

        let result = if self.parents {
            drive.ensure_folder(&path).await
        } else {
            drive.make_folder(&path).await
        };
        let folder = result.with_context(|| format!("Failed to create '{path}'"))?;
        report(ctx, &format!("Created folder '{path}'"), &folder)
    }
}
