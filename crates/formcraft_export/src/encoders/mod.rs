// Encoders: one module per output format. Each takes an `ExportContext` and
// is a pure function of it.

pub mod csv;
pub mod docx;
pub mod html;
pub mod json;
pub mod log;
pub mod odt;
pub mod pdf;
pub mod psi;
pub mod txt;
pub mod xlsx;
pub mod xml;
pub mod yaml;

pub use self::csv::encode_csv;
pub use self::docx::encode_docx;
pub use self::html::encode_html;
pub use self::json::{JsonExportDocument, decode_json, encode_json};
pub use self::log::encode_log;
pub use self::odt::encode_odt;
pub use self::pdf::encode_pdf;
pub use self::psi::encode_psi;
pub use self::txt::encode_txt;
pub use self::xlsx::{encode_xlsx, sanitize_sheet_name};
pub use self::xml::encode_xml;
pub use self::yaml::encode_yaml;
