use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use formcraft_core::{FieldDefinition, FormEntry};
use serde::{Deserialize, Serialize};

use crate::context::ExportContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    form: JsonForm<'a>,
    entries: &'a [FormEntry],
    exported_at: DateTime<Utc>,
    total_entries: usize,
}

#[derive(Serialize)]
struct JsonForm<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    fields: &'a [FieldDefinition],
}

/// Owned shape of a JSON export, for reading one back in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExportDocument {
    pub form: JsonFormDocument,
    pub entries: Vec<FormEntry>,
    pub exported_at: DateTime<Utc>,
    pub total_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonFormDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

/// Encode the form definition and its raw entries as pretty-printed JSON.
pub fn encode_json(ctx: &ExportContext<'_>) -> Result<String> {
    let export = JsonExport {
        form: JsonForm {
            id: &ctx.schema.id,
            name: &ctx.schema.name,
            description: ctx.schema.description.as_deref(),
            fields: &ctx.schema.fields,
        },
        entries: ctx.entries,
        exported_at: ctx.generated_at,
        total_entries: ctx.entries.len(),
    };
    serde_json::to_string_pretty(&export).context("Failed to serialize JSON export")
}

/// Parse a document produced by [`encode_json`].
pub fn decode_json(input: &str) -> Result<JsonExportDocument> {
    serde_json::from_str(input).context("Failed to parse JSON export")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::fixtures::*;
    use formcraft_core::ExportOptions;

    #[test]
    fn test_round_trip_entries() {
        let schema = schema();
        let entries = entries();
        let options = ExportOptions::default();
        let generated = ts("2024-04-01T12:00:00Z");
        let ctx = ExportContext::new(&schema, &entries, &options).at(generated);

        let json = encode_json(&ctx).unwrap();
        let doc = decode_json(&json).unwrap();

        assert_eq!(doc.entries, entries);
        assert_eq!(doc.total_entries, 2);
        assert_eq!(doc.exported_at, generated);
        assert_eq!(doc.form.fields, schema.fields);
        assert_eq!(doc.form.description.as_deref(), Some("Quarterly feedback"));
    }

    #[test]
    fn test_wire_shape() {
        let schema = schema();
        let entries = entries();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let value: serde_json::Value = serde_json::from_str(&encode_json(&ctx).unwrap()).unwrap();

        assert_eq!(value["form"]["id"], "form-1");
        assert_eq!(value["totalEntries"], 2);
        assert!(value["exportedAt"].is_string());
        assert_eq!(value["entries"][0]["formId"], "form-1");
        assert_eq!(value["entries"][0]["data"]["tags"][1], "B");
        assert_eq!(value["form"]["fields"][1]["type"], "checkbox");
    }

    #[test]
    fn test_description_omitted_when_absent() {
        let mut schema = schema();
        schema.description = None;
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &[], &options);
        let value: serde_json::Value = serde_json::from_str(&encode_json(&ctx).unwrap()).unwrap();
        assert!(value["form"].get("description").is_none());
        assert_eq!(value["entries"], serde_json::json!([]));
    }
}
