//! Export formats for native documents
//!
//! Native documents have no byte content of their own. The store offers a
//! set of conversions through `exportLinks`; this module turns those into
//! [`ExportFormat`] values with a file extension for the local copy.

use gdrive_core::domain::RemoteObject;

/// Known export mime types and the extension of the converted file
const EXPORT_EXTENSIONS: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xlsx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "pptx",
    ),
    ("application/vnd.oasis.opendocument.text", "odt"),
    ("application/vnd.oasis.opendocument.spreadsheet", "ods"),
    ("application/x-vnd.oasis.opendocument.spreadsheet", "ods"),
    ("application/vnd.oasis.opendocument.presentation", "odp"),
    ("application/rtf", "rtf"),
    ("application/epub+zip", "epub"),
    ("application/zip", "zip"),
    ("application/vnd.google-apps.script+json", "json"),
    ("text/plain", "txt"),
    ("text/html", "html"),
    ("text/csv", "csv"),
    ("text/tab-separated-values", "tsv"),
    ("text/markdown", "md"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/svg+xml", "svg"),
];

/// A conversion the store can produce for a native document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFormat {
    pub mime_type: String,
    /// Extension for the local file, when the mime type is known
    pub extension: Option<&'static str>,
    pub url: String,
}

impl ExportFormat {
    /// Local file name for an export of the document called `base`
    pub fn file_name(&self, base: &str) -> String {
        match self.extension {
            Some(ext) if !base.to_ascii_lowercase().ends_with(&format!(".{ext}")) => {
                format!("{base}.{ext}")
            }
            _ => base.to_string(),
        }
    }

    /// Short label for prompts: the extension, or the mime type if unknown
    pub fn label(&self) -> &str {
        self.extension.unwrap_or(&self.mime_type)
    }
}

/// Extension for an export mime type
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    EXPORT_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == mime_type)
        .map(|(_, ext)| *ext)
}

/// Every export the object offers, ordered by mime type
pub fn formats_for(object: &RemoteObject) -> Vec<ExportFormat> {
    object
        .export_links
        .iter()
        .map(|(mime_type, url)| ExportFormat {
            mime_type: mime_type.clone(),
            extension: extension_for(mime_type),
            url: url.clone(),
        })
        .collect()
}

/// Picks the format whose extension or mime type equals `wanted`
pub fn select<'a>(formats: &'a [ExportFormat], wanted: &str) -> Option<&'a ExportFormat> {
    let wanted = wanted.trim().trim_start_matches('.');
    formats.iter().find(|f| {
        f.mime_type.eq_ignore_ascii_case(wanted)
            || f.extension.is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
    })
}
