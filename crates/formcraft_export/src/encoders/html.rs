use std::fmt::Write;

use crate::context::ExportContext;
use crate::tabular;

/// Encode a standalone HTML page: a header block with the form's title,
/// description, entry count and export time, then a table of entries when
/// there are any. All form data is HTML-escaped.
pub fn encode_html(ctx: &ExportContext<'_>) -> String {
    let schema = ctx.schema;
    let mut body = String::from("<div class=\"header\">\n");
    let _ = writeln!(body, "    <h1>{}</h1>", escape_html(&schema.name));
    if let Some(description) = schema.description() {
        let _ = writeln!(body, "    <p>{}</p>", escape_html(description));
    }
    let _ = writeln!(body, "    <p>Total Entries: {}</p>", ctx.entries.len());
    let _ = writeln!(
        body,
        "    <p>Exported: {}</p>",
        escape_html(&ctx.display_time(&ctx.generated_at))
    );
    body.push_str("</div>");

    if !ctx.entries.is_empty() {
        body.push('\n');
        body.push_str(&generate_html_table(
            &tabular::headers(ctx),
            &tabular::rows(ctx),
        ));
    }

    generate_html(&format!("{} - Form Entries", schema.name), &body)
}

/// Wrap body HTML in a complete document with the given title.
fn generate_html(title: &str, body_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; margin: 2rem; line-height: 1.6; color: #333; }}
        .header {{ border-bottom: 2px solid #333; padding-bottom: 10px; margin-bottom: 20px; }}
        table {{ border-collapse: collapse; width: 100%; }}
        th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}
        th {{ background-color: #f4f4f4; font-weight: 600; }}
        tr:nth-child(even) {{ background-color: #fafafa; }}
    </style>
</head>
<body>
{body_html}
</body>
</html>"#,
        title = escape_html(title),
        body_html = body_html,
    )
}

/// Cell content is HTML-escaped to prevent injection.
fn generate_html_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table>\n<thead>\n<tr>\n");

    for header in headers {
        let _ = writeln!(html, "    <th>{}</th>", escape_html(header));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        html.push_str("<tr>\n");
        for cell in row {
            let _ = writeln!(html, "    <td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
