use anyhow::{Context, Result};
use formcraft_core::FieldType;
use rust_xlsxwriter::{Format, Workbook};

use crate::context::ExportContext;
use crate::tabular;

/// Excel caps worksheet names at 31 characters.
const MAX_SHEET_NAME_CHARS: usize = 31;
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];
/// Excel rejects cell strings longer than this many characters.
const MAX_CELL_CHARS: usize = 32_767;

/// Encode entries as an XLSX workbook with a single sheet named after the form.
///
/// Returns the raw bytes of the xlsx file. Answers to `number` fields become
/// numeric cells when they parse; every other cell is written as a string.
pub fn encode_xlsx(ctx: &ExportContext<'_>) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let sheet_name = sanitize_sheet_name(&ctx.schema.name);
    worksheet
        .set_name(&sheet_name)
        .with_context(|| format!("Failed to set sheet name: {sheet_name}"))?;

    let header_format = Format::new().set_bold();

    for (col, header) in tabular::headers(ctx).iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, header, &header_format)
            .with_context(|| format!("Failed to write header at column {col}"))?;
    }

    // Column index of each numeric field, offset past Entry ID and Created At.
    let numeric_columns: Vec<bool> = [false, false]
        .into_iter()
        .chain(
            ctx.schema
                .fields
                .iter()
                .map(|f| f.field_type == FieldType::Number),
        )
        .collect();

    for (row_idx, entry) in ctx.entries.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        for (col_idx, cell) in tabular::row(ctx, entry).iter().enumerate() {
            let col = col_idx as u16;
            match cell.parse::<f64>() {
                Ok(num) if numeric_columns[col_idx] && num.is_finite() => {
                    worksheet.write_number(excel_row, col, num).with_context(|| {
                        format!("Failed to write number at ({excel_row}, {col_idx})")
                    })?;
                }
                _ => {
                    worksheet
                        .write_string(excel_row, col, clamp_cell(cell))
                        .with_context(|| {
                            format!("Failed to write string at ({excel_row}, {col_idx})")
                        })?;
                }
            }
        }
    }

    // Auto-fit columns for readability
    worksheet.autofit();

    let bytes = workbook
        .save_to_buffer()
        .context("Failed to save workbook to buffer")?;

    Ok(bytes)
}

/// Longer answers are cut at the cell limit on a char boundary.
fn clamp_cell(cell: &str) -> &str {
    match cell.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_idx, _)) => &cell[..byte_idx],
        None => cell,
    }
}

/// Make a form name acceptable as a worksheet name: forbidden characters become
/// `_`, surrounding apostrophes are dropped, and the result is cut to 31 chars.
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN_SHEET_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let truncated: String = replaced
        .trim_matches('\'')
        .chars()
        .take(MAX_SHEET_NAME_CHARS)
        .collect();
    let trimmed = truncated.trim_end_matches('\'').trim();
    if trimmed.is_empty() {
        "Sheet1".to_string()
    } else {
        trimmed.to_string()
    }
}
