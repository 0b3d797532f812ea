use anyhow::Result;
use docx_rs::*;
use std::io::Cursor;

use crate::context::ExportContext;
use crate::tabular;

/// Encode entries as a Word document: the form name as a heading, its
/// description, the entry count, then a table with the shared column layout.
pub fn encode_docx(ctx: &ExportContext<'_>) -> Result<Vec<u8>> {
    let mut docx = Docx::new();

    // Title paragraph -- large bold text
    let title_run = Run::new().add_text(&ctx.schema.name).bold().size(36); // size is in half-points, so 36 = 18pt
    docx = docx.add_paragraph(Paragraph::new().add_run(title_run));

    if let Some(description) = ctx.schema.description() {
        for line in description.lines() {
            let run = Run::new().add_text(line).size(22);
            docx = docx.add_paragraph(Paragraph::new().add_run(run));
        }
    }

    let summary = format!(
        "Total Entries: {} | Exported: {}",
        ctx.entries.len(),
        ctx.display_time(&ctx.generated_at)
    );
    docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(summary).italic().size(20)));
    docx = docx.add_paragraph(Paragraph::new());

    let mut table_rows = Vec::with_capacity(ctx.entries.len() + 1);

    let header_cells: Vec<TableCell> = tabular::headers(ctx)
        .iter()
        .map(|h| {
            let run = Run::new().add_text(h).bold().size(20);
            TableCell::new().add_paragraph(Paragraph::new().add_run(run))
        })
        .collect();
    table_rows.push(TableRow::new(header_cells));

    for row in tabular::rows(ctx) {
        let cells: Vec<TableCell> = row
            .iter()
            .map(|cell_text| {
                // Multi-line answers become one paragraph per line.
                let mut cell = TableCell::new();
                for line in cell_text.split('\n') {
                    let run = Run::new().add_text(line).size(20);
                    cell = cell.add_paragraph(Paragraph::new().add_run(run));
                }
                cell
            })
            .collect();
        table_rows.push(TableRow::new(cells));
    }

    docx = docx.add_table(Table::new(table_rows));

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| anyhow::anyhow!("Failed to pack DOCX: {}", e))?;

    Ok(buf.into_inner())
}
