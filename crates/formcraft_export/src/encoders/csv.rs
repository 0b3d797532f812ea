use anyhow::{Context, Result};

use crate::context::ExportContext;
use crate::tabular;

/// Encode entries as CSV: a header row, then one row per entry.
///
/// Fields containing commas, quotes or newlines are quoted by the `csv` crate.
/// The header row is written even when there are no entries.
pub fn encode_csv(ctx: &ExportContext<'_>) -> Result<String> {
    write_csv(&tabular::headers(ctx), &tabular::rows(ctx))
}

fn write_csv(headers: &[String], rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(headers)
        .context("Failed to write header record")?;

    for row in rows {
        writer
            .write_record(row)
            .context("Failed to write data record")?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;

    String::from_utf8(bytes).context("CSV output contained invalid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::fixtures::*;
    use formcraft_core::{ExportOptions, FieldValue};

    fn parse(input: &str) -> (Vec<String>, Vec<Vec<String>>) {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(input.as_bytes());
        let headers = reader.headers().unwrap().iter().map(String::from).collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        (headers, rows)
    }

    #[test]
    fn test_encode_csv_basic() {
        let schema = schema();
        let entries = entries();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let csv_text = encode_csv(&ctx).unwrap();

        assert!(csv_text.starts_with("Entry ID,Created At,Name,Tags,Score\n"));
        // Checkbox answer contains the separator, so it is quoted.
        assert!(csv_text.contains("e1,2024-03-01 09:30:00 UTC,Ada,\"A,B\",9"));
    }

    #[test]
    fn test_write_csv_comma_separated() {
        let headers = vec!["a".to_string(), "b".to_string()];
        let rows = vec![vec!["1".to_string(), "x;y".to_string()]];
        assert_eq!(write_csv(&headers, &rows).unwrap(), "a,b\n1,x;y\n");
    }

    #[test]
    fn test_encode_csv_empty_entries_keeps_header() {
        let schema = schema();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &[], &options);
        let csv_text = encode_csv(&ctx).unwrap();
        assert_eq!(csv_text.lines().count(), 1);
    }

    #[test]
    fn test_awkward_value_survives_as_one_cell() {
        let schema = schema();
        let tricky = "Smith, \"Jr\"\nsecond line";
        let entries = vec![entry(
            "e1",
            "2024-03-01T09:30:00Z",
            &[("name", FieldValue::from(tricky))],
        )];
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let csv_text = encode_csv(&ctx).unwrap();

        let (headers, rows) = parse(&csv_text);
        assert_eq!(headers.len(), 5);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 5);
        assert_eq!(rows[0][2], tricky);
    }
}
