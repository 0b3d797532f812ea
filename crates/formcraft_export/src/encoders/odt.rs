use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::context::ExportContext;
use crate::encoders::xml::xml_escape;
use crate::tabular;

const ODT_MIMETYPE: &str = "application/vnd.oasis.opendocument.text";

/// Encode entries as an OpenDocument Text file: heading, description, entry
/// count, and a table with the shared column layout.
///
/// The package is assembled by hand with the `zip` crate. `mimetype` must be
/// the first member and stored uncompressed.
pub fn encode_odt(ctx: &ExportContext<'_>) -> Result<Vec<u8>> {
    let buf = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(buf);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("mimetype", stored)
        .context("Failed to create mimetype")?;
    zip.write_all(ODT_MIMETYPE.as_bytes())
        .context("Failed to write mimetype")?;

    zip.start_file("META-INF/manifest.xml", options)
        .context("Failed to create META-INF/manifest.xml")?;
    zip.write_all(manifest_xml().as_bytes())
        .context("Failed to write META-INF/manifest.xml")?;

    zip.start_file("meta.xml", options)
        .context("Failed to create meta.xml")?;
    zip.write_all(meta_xml(ctx).as_bytes())
        .context("Failed to write meta.xml")?;

    zip.start_file("content.xml", options)
        .context("Failed to create content.xml")?;
    zip.write_all(content_xml(ctx).as_bytes())
        .context("Failed to write content.xml")?;

    let cursor = zip.finish().context("Failed to finalize ODT zip")?;
    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// XML parts
// ---------------------------------------------------------------------------

fn manifest_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
  <manifest:file-entry manifest:full-path="/" manifest:version="1.2" manifest:media-type="{ODT_MIMETYPE}"/>
  <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
  <manifest:file-entry manifest:full-path="meta.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#
    )
}

fn meta_xml(ctx: &ExportContext<'_>) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0" xmlns:dc="http://purl.org/dc/elements/1.1/" office:version="1.2">
  <office:meta>
    <dc:title>{}</dc:title>
    <meta:creation-date>{}</meta:creation-date>
    <meta:generator>Formcraft</meta:generator>
  </office:meta>
</office:document-meta>"#,
        xml_escape(&ctx.schema.name),
        ctx.generated_at.format("%Y-%m-%dT%H:%M:%S"),
    )
}

fn content_xml(ctx: &ExportContext<'_>) -> String {
    let headers = tabular::headers(ctx);
    let mut body = String::new();

    let _ = writeln!(
        body,
        r#"      <text:h text:outline-level="1">{}</text:h>"#,
        xml_escape(&ctx.schema.name)
    );
    if let Some(description) = ctx.schema.description() {
        let _ = writeln!(body, "      <text:p>{}</text:p>", text_with_breaks(description));
    }
    let _ = writeln!(
        body,
        "      <text:p>Total Entries: {} | Exported: {}</text:p>",
        ctx.entries.len(),
        xml_escape(&ctx.display_time(&ctx.generated_at))
    );

    let _ = writeln!(body, r#"      <table:table table:name="Entries">"#);
    let _ = writeln!(
        body,
        r#"        <table:table-column table:number-columns-repeated="{}"/>"#,
        headers.len()
    );
    body.push_str("        <table:table-header-rows>\n");
    push_row(&mut body, &headers);
    body.push_str("        </table:table-header-rows>\n");
    for row in tabular::rows(ctx) {
        push_row(&mut body, &row);
    }
    body.push_str("      </table:table>\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" office:version="1.2">
  <office:body>
    <office:text>
{body}    </office:text>
  </office:body>
</office:document-content>"#
    )
}

fn push_row(out: &mut String, cells: &[String]) {
    out.push_str("          <table:table-row>\n");
    for cell in cells {
        let _ = writeln!(
            out,
            r#"            <table:table-cell office:value-type="string"><text:p>{}</text:p></table:table-cell>"#,
            text_with_breaks(cell)
        );
    }
    out.push_str("          </table:table-row>\n");
}

/// Escaped paragraph text with newlines as `<text:line-break/>`.
fn text_with_breaks(s: &str) -> String {
    s.split('\n')
        .map(xml_escape)
        .collect::<Vec<_>>()
        .join("<text:line-break/>")
}
