use std::fmt::Write;

use crate::analytics::aggregate;
use crate::context::ExportContext;

/// Textual analytics report: header, form structure, per-field statistics in
/// schema order, then a summary block.
pub fn encode_psi(ctx: &ExportContext<'_>) -> String {
    let schema = ctx.schema;
    let stats = aggregate(schema, ctx.entries, &ctx.options.list_separator);

    let mut psi = String::new();
    let _ = writeln!(psi, "PSI Report - {}", schema.name);
    let _ = writeln!(psi, "Generated: {}", ctx.display_time(&ctx.generated_at));
    let _ = writeln!(psi, "Total Entries: {}", stats.total_entries);
    psi.push('\n');

    psi.push_str("FORM STRUCTURE:\n");
    let _ = writeln!(psi, "Name: {}", schema.name);
    if let Some(description) = schema.description() {
        let _ = writeln!(psi, "Description: {description}");
    }
    let _ = writeln!(psi, "Fields: {}", schema.fields.len());
    psi.push('\n');

    psi.push_str("FIELD ANALYSIS:\n");
    for (field, field_stats) in schema.fields.iter().zip(&stats.per_field) {
        let _ = writeln!(psi, "- {} ({})", field.label, field.field_type);
        let _ = writeln!(psi, "  Completion Rate: {}%", field_stats.completion_rate);
        if field_stats.unique_value_count > 0 {
            let _ = writeln!(psi, "  Unique Values: {}", field_stats.unique_value_count);
        }
        if let Some(common) = &field_stats.most_common_value {
            let _ = writeln!(psi, "  Most Common: {common}");
        }
    }

    psi.push_str("\nSUMMARY:\n");
    let _ = writeln!(
        psi,
        "Average Completion Rate: {}%",
        stats.average_completion_rate
    );
    let most_active = stats
        .most_active_day
        .map(|day| ctx.display_day(&day))
        .unwrap_or_else(|| "N/A".to_string());
    let _ = writeln!(psi, "Most Active Day: {most_active}");
    let _ = writeln!(psi, "Submission Trend: {}", stats.trend);
    psi
}
