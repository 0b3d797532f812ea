use formcraft_core::{FieldDefinition, FieldType, FieldValue, FormEntry, FormSchema};

/// Turn a raw answer into its canonical display string.
///
/// Never fails: absent, null and empty answers become `""`. Checkbox selections
/// are joined with `separator` in submission order, duplicates included. No
/// format-specific escaping happens here.
pub fn normalize(field: &FieldDefinition, value: &FieldValue, separator: &str) -> String {
    match value {
        FieldValue::Empty => String::new(),
        FieldValue::Text(text) => text.clone(),
        FieldValue::Number(number) => format_number(*number),
        FieldValue::Choices(choices) => choices.join(separator),
        FieldValue::Flag(flag) => normalize_flag(field, *flag),
    }
}

/// Normalized answers of one entry, in schema field order.
pub fn normalize_entry(schema: &FormSchema, entry: &FormEntry, separator: &str) -> Vec<String> {
    schema
        .fields
        .iter()
        .map(|field| normalize(field, entry.value(&field.id), separator))
        .collect()
}

/// A lone checkbox submits a boolean. Unchecked counts as unanswered; checked
/// shows the box's option label when it has one.
fn normalize_flag(field: &FieldDefinition, flag: bool) -> String {
    match (field.field_type, flag) {
        (FieldType::Checkbox, false) => String::new(),
        (FieldType::Checkbox, true) => field
            .options
            .first()
            .cloned()
            .unwrap_or_else(|| "true".to_string()),
        (_, flag) => flag.to_string(),
    }
}

/// Plain decimal, no grouping, no exponent. Integral values drop the `.0`.
fn format_number(number: f64) -> String {
    if !number.is_finite() {
        return String::new();
    }
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}
