//! Uploaded document listing.
//!
//! Files are never parsed: the sidebar only shows what the upload widget
//! currently holds. Records are rebuilt on every render, so the upload date
//! is the render time.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::error::AppError;

/// Extensions the upload widget accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A file held by a session's upload widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    pub content_type: String,
}

/// Number of pages of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCount {
    Unknown,
    Known(u32),
}

impl fmt::Display for PageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("N/A"),
            Self::Known(n) => write!(f, "{n}"),
        }
    }
}

/// Sidebar card data for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedDocumentRecord {
    pub file_name: String,
    /// Size in MB.
    pub file_size: f64,
    pub upload_date: DateTime<Local>,
    pub number_of_pages: PageCount,
}

impl UploadedDocumentRecord {
    /// Size rendered with two decimals, e.g. `1.50 MB`.
    #[must_use]
    pub fn display_size(&self) -> String {
        format!("{:.2} MB", self.file_size)
    }

    #[must_use]
    pub fn display_date(&self) -> String {
        self.upload_date.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

/// Limits applied to incoming uploads.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_file_size_bytes: u64,
    pub max_files: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 200 * 1024 * 1024,
            max_files: 20,
        }
    }
}

impl UploadPolicy {
    /// Check an incoming file against the accepted kinds and limits.
    ///
    /// `held` lists the distinct names the widget already holds. A file
    /// whose name is held replaces that entry and does not count against
    /// `max_files`.
    pub fn validate(
        &self,
        file_name: &str,
        size_bytes: u64,
        content_type: Option<&str>,
        held: &[String],
    ) -> Result<UploadedFile, AppError> {
        let reject = |reason: String| AppError::UploadRejected {
            file_name: file_name.to_string(),
            reason,
        };

        if file_name.trim().is_empty() {
            return Err(reject("file name is empty".to_string()));
        }

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let accepted = extension
            .as_deref()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext));
        if !accepted {
            return Err(reject(format!(
                "only {} files are accepted",
                ACCEPTED_EXTENSIONS.join(", ").to_uppercase()
            )));
        }

        if size_bytes > self.max_file_size_bytes {
            return Err(reject(format!(
                "file is larger than {}MB",
                self.max_file_size_bytes / (1024 * 1024)
            )));
        }

        let replaces = held.iter().any(|name| name == file_name);
        if !replaces && held.len() >= self.max_files {
            return Err(reject(format!(
                "at most {} documents can be uploaded",
                self.max_files
            )));
        }

        let content_type = content_type
            .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
            .map_or_else(
                || {
                    mime_guess::from_path(file_name)
                        .first_or_octet_stream()
                        .to_string()
                },
                str::to_string,
            );

        Ok(UploadedFile {
            name: file_name.to_string(),
            size_bytes,
            content_type,
        })
    }
}

/// Count the pages of an uploaded document.
///
/// Documents are not parsed yet.
pub fn page_count(_file: &UploadedFile) -> Result<u32, AppError> {
    Err(AppError::NotImplemented("page counting"))
}

/// Open a listed document for viewing.
pub fn open_document(file_name: &str) -> Result<(), AppError> {
    tracing::debug!(file_name, "Open document requested");
    Err(AppError::NotImplemented("opening documents"))
}

/// Build sidebar records stamped with the current time, newest first.
#[must_use]
pub fn list_documents(files: &[UploadedFile]) -> Vec<UploadedDocumentRecord> {
    list_documents_with_clock(files, Local::now)
}

/// Build sidebar records, stamping each with `clock()`.
///
/// Records are sorted by upload date descending; equal dates keep upload
/// order.
#[allow(clippy::cast_precision_loss)]
pub fn list_documents_with_clock<F>(files: &[UploadedFile], mut clock: F) -> Vec<UploadedDocumentRecord>
where
    F: FnMut() -> DateTime<Local>,
{
    let mut records: Vec<UploadedDocumentRecord> = files
        .iter()
        .map(|file| UploadedDocumentRecord {
            file_name: file.name.clone(),
            file_size: file.size_bytes as f64 / BYTES_PER_MB,
            upload_date: clock(),
            number_of_pages: page_count(file).map_or(PageCount::Unknown, PageCount::Known),
        })
        .collect();

    records.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
    records
}
