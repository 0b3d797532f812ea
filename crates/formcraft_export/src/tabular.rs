//! The column layout shared by every table-shaped export: entry id, creation
//! time, then one column per field in schema order.

use formcraft_core::FormEntry;

use crate::context::ExportContext;

pub const ENTRY_ID_HEADER: &str = "Entry ID";
pub const CREATED_AT_HEADER: &str = "Created At";

/// Header labels: `Entry ID`, `Created At`, then field labels.
pub fn headers(ctx: &ExportContext<'_>) -> Vec<String> {
    let mut headers = Vec::with_capacity(ctx.schema.fields.len() + 2);
    headers.push(ENTRY_ID_HEADER.to_string());
    headers.push(CREATED_AT_HEADER.to_string());
    headers.extend(ctx.schema.fields.iter().map(|f| f.label.clone()));
    headers
}

/// One row for an entry. Cells follow schema order, never `data` key order.
pub fn row(ctx: &ExportContext<'_>, entry: &FormEntry) -> Vec<String> {
    let mut row = Vec::with_capacity(ctx.schema.fields.len() + 2);
    row.push(entry.id.clone());
    row.push(ctx.display_time(&entry.created_at));
    row.extend(ctx.schema.fields.iter().map(|f| ctx.normalized(entry, f)));
    row
}

pub fn rows(ctx: &ExportContext<'_>) -> Vec<Vec<String>> {
    ctx.entries.iter().map(|entry| row(ctx, entry)).collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};
    use formcraft_core::{FieldDefinition, FieldType, FieldValue, FormEntry, FormSchema};
    use std::collections::BTreeMap;

    pub fn ts(raw: &str) -> DateTime<Utc> {
        raw.parse().unwrap()
    }

    /// A three-field form: text, checkbox, number.
    pub fn schema() -> FormSchema {
        FormSchema {
            id: "form-1".into(),
            name: "Customer Survey".into(),
            description: Some("Quarterly feedback".into()),
            fields: vec![
                FieldDefinition::new("name", FieldType::Text, "Name").required(),
                FieldDefinition::new("tags", FieldType::Checkbox, "Tags")
                    .with_options(["A", "B", "C"]),
                FieldDefinition::new("score", FieldType::Number, "Score"),
            ],
            created_at: ts("2024-01-01T00:00:00Z"),
            updated_at: ts("2024-01-01T00:00:00Z"),
        }
    }

    pub fn entry(id: &str, at: &str, data: &[(&str, FieldValue)]) -> FormEntry {
        FormEntry {
            id: id.into(),
            form_id: "form-1".into(),
            data: data
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
            created_at: ts(at),
        }
    }

    pub fn entries() -> Vec<FormEntry> {
        vec![
            entry(
                "e1",
                "2024-03-01T09:30:00Z",
                &[
                    ("score", FieldValue::Number(9.0)),
                    ("name", "Ada".into()),
                    (
                        "tags",
                        FieldValue::Choices(vec!["A".into(), "B".into()]),
                    ),
                ],
            ),
            entry("e2", "2024-03-02T14:00:00Z", &[("name", "Grace".into())]),
        ]
    }
}
