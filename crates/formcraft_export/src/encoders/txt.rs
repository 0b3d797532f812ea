use std::fmt::Write;

use crate::context::ExportContext;

/// Plain-text export: a short header, then one block per entry with each
/// field as `label: value`.
pub fn encode_txt(ctx: &ExportContext<'_>) -> String {
    let schema = ctx.schema;
    let mut out = String::new();
    let _ = writeln!(out, "{}", schema.name);
    if let Some(description) = schema.description() {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(out, "Total Entries: {}", ctx.entries.len());
    let _ = writeln!(out, "Exported: {}", ctx.display_time(&ctx.generated_at));

    for (index, entry) in ctx.entries.iter().enumerate() {
        out.push('\n');
        let _ = writeln!(out, "Entry {}", index + 1);
        let _ = writeln!(out, "ID: {}", entry.id);
        let _ = writeln!(out, "Created: {}", ctx.display_time(&entry.created_at));
        for field in &schema.fields {
            let _ = writeln!(out, "{}: {}", field.label, ctx.normalized(entry, field));
        }
    }
    out
}
