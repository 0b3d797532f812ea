use std::fmt::Write;

use crate::context::ExportContext;

/// Log-style export: one line per entry in stored order, e.g.
///
/// ```text
/// 2024-03-01T09:30:00+00:00 entry=e1 form=form-1 name="Ada" tags="A,B"
/// ```
///
/// Every field appears as `field_id="value"`, including empty ones.
pub fn encode_log(ctx: &ExportContext<'_>) -> String {
    let mut out = String::new();
    for entry in ctx.entries {
        let _ = write!(
            out,
            "{} entry={} form={}",
            entry.created_at.to_rfc3339(),
            entry.id,
            entry.form_id
        );
        for field in &ctx.schema.fields {
            let _ = write!(
                out,
                " {}=\"{}\"",
                log_key(&field.id),
                escape_value(&ctx.normalized(entry, field))
            );
        }
        out.push('\n');
    }
    out
}

/// Field ids as bare keys: anything outside `[A-Za-z0-9_.-]` becomes `_`.
fn log_key(id: &str) -> String {
    let key: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if key.is_empty() { "_".to_string() } else { key }
}

fn escape_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
