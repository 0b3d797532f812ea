use std::fmt::Write;

use crate::context::ExportContext;

/// Encode entries as an XML document rooted at `<form>`.
///
/// Each answer becomes an element named after its field id carrying the field
/// label. Text and attribute values are escaped.
pub fn encode_xml(ctx: &ExportContext<'_>) -> String {
    let schema = ctx.schema;
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<form id=\"{}\" name=\"{}\">",
        xml_escape(&schema.id),
        xml_escape(&schema.name)
    );

    if let Some(description) = schema.description() {
        let _ = writeln!(xml, "  <description>{}</description>", xml_escape(description));
    }

    xml.push_str("  <entries>\n");
    for entry in ctx.entries {
        let _ = writeln!(
            xml,
            "    <entry id=\"{}\" createdAt=\"{}\">",
            xml_escape(&entry.id),
            entry.created_at.to_rfc3339()
        );
        for field in &schema.fields {
            let tag = element_name(&field.id);
            let original_id = if tag == field.id {
                String::new()
            } else {
                format!(" fieldId=\"{}\"", xml_escape(&field.id))
            };
            let _ = writeln!(
                xml,
                "      <{tag}{original_id} label=\"{}\">{}</{tag}>",
                xml_escape(&field.label),
                xml_escape(&ctx.normalized(entry, field)),
            );
        }
        xml.push_str("    </entry>\n");
    }
    xml.push_str("  </entries>\n");
    xml.push_str("</form>");
    xml
}

/// Escape markup characters for text and attribute values. Characters XML 1.0
/// does not allow at all become U+FFFD.
pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
    out
}

/// The XML 1.0 `Char` production. Rust chars are never surrogates, so only
/// C0 controls and U+FFFE/U+FFFF need excluding.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

/// Coerce a field id into a valid XML element name.
fn element_name(id: &str) -> String {
    let mut name: String = id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_');
    if !starts_ok || name.to_ascii_lowercase().starts_with("xml") {
        name.insert(0, '_');
    }
    name
}
