use formcraft_core::ExportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
    Json,
    Xml,
    Yaml,
    Yml,
    Html,
    Docx,
    Odt,
    Txt,
    Log,
    Psi,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 13] = [
        Self::Csv,
        Self::Xlsx,
        Self::Pdf,
        Self::Json,
        Self::Xml,
        Self::Yaml,
        Self::Yml,
        Self::Html,
        Self::Docx,
        Self::Odt,
        Self::Txt,
        Self::Log,
        Self::Psi,
    ];

    /// Case-insensitive lookup of a format identifier. Surrounding whitespace
    /// is ignored.
    pub fn parse(identifier: &str) -> Result<Self, ExportError> {
        let wanted = identifier.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.identifier().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ExportError::UnsupportedFormat(identifier.to_string()))
    }

    pub fn identifier(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
            Self::Yml => "yml",
            Self::Html => "html",
            Self::Docx => "docx",
            Self::Odt => "odt",
            Self::Txt => "txt",
            Self::Log => "log",
            Self::Psi => "psi",
        }
    }

    /// File extension, without the dot. Always the identifier itself.
    pub fn extension(self) -> &'static str {
        self.identifier()
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Pdf => "application/pdf",
            Self::Json => "application/json",
            Self::Xml => "application/xml",
            Self::Yaml | Self::Yml => "text/yaml",
            Self::Html => "text/html",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Odt => "application/vnd.oasis.opendocument.text",
            Self::Txt | Self::Log | Self::Psi => "text/plain",
        }
    }

    /// Display name for export menus.
    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Xlsx => "Excel Workbook",
            Self::Pdf => "PDF Document",
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Yaml => "YAML",
            Self::Yml => "YAML (.yml)",
            Self::Html => "HTML Page",
            Self::Docx => "Word Document",
            Self::Odt => "OpenDocument Text",
            Self::Txt => "Plain Text",
            Self::Log => "Log File",
            Self::Psi => "PSI Analytics Report",
        }
    }

    pub fn is_binary(self) -> bool {
        matches!(self, Self::Xlsx | Self::Pdf | Self::Docx | Self::Odt)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Export results
// ---------------------------------------------------------------------------

/// Encoded bytes or text, depending on the format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportPayload {
    Text(String),
    Binary(Vec<u8>),
}

impl ExportPayload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    pub payload: ExportPayload,
    pub mime_type: &'static str,
    pub filename_hint: String,
}
