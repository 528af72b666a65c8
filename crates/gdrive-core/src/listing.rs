//! Listing/presentation adapter
//!
//! Converts remote objects into display rows. This is a pure data
//! transformation; rendering the rows is left to the command layer.

use serde::Serialize;

use crate::domain::object::{ObjectKind, RemoteObject, Visibility};

/// Maximum number of characters of a name shown in a listing
pub const MAX_NAME_CHARS: usize = 100;

/// Placeholder for absent values
const MISSING: &str = "-";

/// A single display row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRow {
    pub id: String,
    pub name: String,
    pub kind: ObjectKind,
    pub size: String,
    pub last_modified: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Build display rows for `objects`, in input order
pub fn build_rows(objects: &[RemoteObject], include_visibility: bool) -> Vec<ListingRow> {
    objects
        .iter()
        .map(|object| to_row(object, include_visibility))
        .collect()
}

fn to_row(object: &RemoteObject, include_visibility: bool) -> ListingRow {
    let kind = object.kind();
    let size = match (kind, object.size) {
        (ObjectKind::Folder, _) | (_, None) => MISSING.to_string(),
        (_, Some(bytes)) => format_bytes(bytes),
    };
    let last_modified = object
        .last_modified()
        .map(format_timestamp)
        .unwrap_or_else(|| MISSING.to_string());
    let visibility = include_visibility.then(|| {
        if object.is_public() {
            Visibility::Public
        } else {
            Visibility::Private
        }
    });

    ListingRow {
        id: object.id.to_string(),
        name: truncate_name(&object.name),
        kind,
        size,
        last_modified,
        visibility,
    }
}

/// Truncate a name to [`MAX_NAME_CHARS`] characters
pub fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_CHARS).collect()
}

/// Human-readable byte count
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Render an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS`
///
/// Any sub-second or timezone suffix is dropped, not converted.
pub fn format_timestamp(timestamp: &str) -> String {
    let Some((date, time)) = timestamp.split_once('T') else {
        return timestamp.to_string();
    };
    let end = time
        .find(|c: char| c == '.' || c == 'Z' || c == '+' || c == '-')
        .unwrap_or(time.len());
    format!("{} {}", date, &time[..end])
}
