use std::fmt::Write;

use crate::context::ExportContext;

/// Encode the form and its entries as YAML with every string scalar
/// double-quoted.
pub fn encode_yaml(ctx: &ExportContext<'_>) -> String {
    let schema = ctx.schema;
    let mut yaml = String::from("form:\n");
    let _ = writeln!(yaml, "  id: {}", quote(&schema.id));
    let _ = writeln!(yaml, "  name: {}", quote(&schema.name));
    if let Some(description) = schema.description() {
        let _ = writeln!(yaml, "  description: {}", quote(description));
    }

    if schema.fields.is_empty() {
        yaml.push_str("  fields: []\n");
    } else {
        yaml.push_str("  fields:\n");
        for field in &schema.fields {
            let _ = writeln!(yaml, "    - id: {}", quote(&field.id));
            let _ = writeln!(yaml, "      label: {}", quote(&field.label));
            let _ = writeln!(yaml, "      type: {}", quote(field.field_type.as_str()));
        }
    }

    if ctx.entries.is_empty() {
        yaml.push_str("entries: []\n");
        return yaml;
    }

    yaml.push_str("entries:\n");
    for entry in ctx.entries {
        let _ = writeln!(yaml, "  - id: {}", quote(&entry.id));
        let _ = writeln!(yaml, "    createdAt: {}", quote(&entry.created_at.to_rfc3339()));
        if schema.fields.is_empty() {
            yaml.push_str("    data: {}\n");
            continue;
        }
        yaml.push_str("    data:\n");
        for field in &schema.fields {
            let _ = writeln!(
                yaml,
                "      {}: {}",
                quote(&field.id),
                quote(&ctx.normalized(entry, field))
            );
        }
    }
    yaml
}

/// YAML double-quoted scalar.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::fixtures::*;
    use formcraft_core::{ExportOptions, FieldValue};

    #[test]
    fn test_encode_yaml_layout() {
        let schema = schema();
        let entries = entries();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let yaml = encode_yaml(&ctx);

        assert!(yaml.starts_with("form:\n  id: \"form-1\"\n  name: \"Customer Survey\"\n"));
        assert!(yaml.contains("    - id: \"tags\"\n      label: \"Tags\"\n      type: \"checkbox\"\n"));
        assert!(yaml.contains("  - id: \"e1\"\n    createdAt: \"2024-03-01T09:30:00+00:00\"\n"));
        assert!(yaml.contains("      \"tags\": \"A,B\"\n"));
    }

    #[test]
    fn test_yaml_parses_back() {
        let schema = schema();
        let entries = vec![entry(
            "e1",
            "2024-03-01T09:30:00Z",
            &[("name", FieldValue::from("say \"hi\"\nthen: leave # now"))],
        )];
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &entries, &options);
        let yaml = encode_yaml(&ctx);

        let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(doc["form"]["name"].as_str(), Some("Customer Survey"));
        assert_eq!(
            doc["entries"][0]["data"]["name"].as_str(),
            Some("say \"hi\"\nthen: leave # now")
        );
        assert_eq!(doc["entries"][0]["data"]["score"].as_str(), Some(""));
    }

    #[test]
    fn test_yaml_no_entries() {
        let schema = schema();
        let options = ExportOptions::default();
        let ctx = ExportContext::new(&schema, &[], &options);
        let yaml = encode_yaml(&ctx);
        assert!(yaml.ends_with("entries: []\n"));
        let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert!(doc["entries"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(quote("\u{7}"), "\"\\u0007\"");
    }
}
