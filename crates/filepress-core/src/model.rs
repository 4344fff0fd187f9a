//! Wire types exchanged with the FilePress server.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A stored file as reported by `GET /files`.
///
/// The server may attach extra fields (e.g. the owning username); they are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    pub size: u64,
    pub mimetype: String,
    #[serde(default)]
    pub pages: Option<u32>,
    /// PDF document info (Title, Author, Creator). Absent means empty.
    #[serde(default, deserialize_with = "nullable_map")]
    pub docinfo: BTreeMap<String, String>,
}

fn nullable_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl FileRecord {
    pub fn is_pdf(&self) -> bool {
        self.mimetype.contains("pdf")
    }

    /// Size in KiB with one decimal, e.g. `2.0`.
    pub fn size_kb(&self) -> String {
        format!("{:.1}", self.size as f64 / 1024.0)
    }

    /// One-line summary shown in an expanded row.
    pub fn detail_line(&self) -> String {
        let mut line = format!("Size: {} KB | Type: {}", self.size_kb(), self.mimetype);
        if let Some(pages) = self.pages.filter(|&p| p > 0) {
            line.push_str(&format!(" | Pages: {}", pages));
        }
        if !self.docinfo.is_empty() {
            let meta: Vec<String> = self
                .docinfo
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect();
            line.push_str(&format!(" | Metadata: {}", meta.join(" \u{00B7} ")));
        }
        line
    }
}

/// Reply to `POST /upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
}

/// Reply to `POST /convert/{filename}`.
///
/// Converting a file that is already a PDF yields `message: "Already PDF"`
/// together with a download URL.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertResponse {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to `GET /parse/{filename}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseResponse {
    pub text: String,
}

/// Error body the server attaches to non-2xx replies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// A local file queued for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Build an upload from a name and contents, guessing the MIME type from
    /// the extension.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self { name, mime, bytes }
    }
}

const CONVERTIBLE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

/// Name under which a converted file is saved: a trailing `.png`, `.jpg` or
/// `.jpeg` (any case) becomes `.pdf`. Other names are returned unchanged.
pub fn pdf_download_name(filename: &str) -> String {
    let lower = filename.to_ascii_lowercase();
    for ext in CONVERTIBLE_EXTENSIONS {
        if lower.ends_with(ext) {
            let stem = &filename[..filename.len() - ext.len()];
            return format!("{}.pdf", stem);
        }
    }
    filename.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> FileRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn deserializes_minimal_record() {
        let r = record(r#"{"filename":"a.png","size":2048,"mimetype":"image/png","pages":null}"#);
        assert_eq!(r.filename, "a.png");
        assert_eq!(r.size, 2048);
        assert_eq!(r.pages, None);
        assert!(r.docinfo.is_empty());
    }

    #[test]
    fn ignores_unknown_fields_and_null_docinfo() {
        let r = record(
            r#"{"username":"admin","filename":"b.pdf","size":10,"mimetype":"application/pdf","pages":3,"docinfo":null}"#,
        );
        assert_eq!(r.pages, Some(3));
        assert!(r.docinfo.is_empty());
        assert!(r.is_pdf());
    }

    #[test]
    fn detail_line_includes_pages_and_metadata() {
        let r = record(
            r#"{"filename":"b.pdf","size":3072,"mimetype":"application/pdf","pages":2,
                "docinfo":{"Title":"Report","Author":"Ann"}}"#,
        );
        assert_eq!(
            r.detail_line(),
            "Size: 3.0 KB | Type: application/pdf | Pages: 2 | Metadata: Author: Ann \u{00B7} Title: Report"
        );
    }

    #[test]
    fn detail_line_omits_missing_parts() {
        let r = record(r#"{"filename":"a.png","size":512,"mimetype":"image/png"}"#);
        assert_eq!(r.detail_line(), "Size: 0.5 KB | Type: image/png");
    }

    #[test]
    fn pdf_name_replaces_image_extensions_case_insensitively() {
        assert_eq!(pdf_download_name("a.png"), "a.pdf");
        assert_eq!(pdf_download_name("Photo.JPG"), "Photo.pdf");
        assert_eq!(pdf_download_name("scan.v2.JpEg"), "scan.v2.pdf");
    }

    #[test]
    fn pdf_name_leaves_other_names_alone() {
        assert_eq!(pdf_download_name("notes.gif"), "notes.gif");
        assert_eq!(pdf_download_name("png"), "png");
        assert_eq!(pdf_download_name("a.png.txt"), "a.png.txt");
    }

    #[test]
    fn upload_guesses_mime() {
        assert_eq!(UploadFile::new("a.png", vec![]).mime, "image/png");
        assert_eq!(UploadFile::new("blob", vec![]).mime, "application/octet-stream");
    }
}
