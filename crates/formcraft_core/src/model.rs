use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Field definitions
// ---------------------------------------------------------------------------

/// The input widget a field is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    File,
    Date,
}

impl FieldType {
    /// Lowercase identifier, as stored in the schema.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::File => "file",
            Self::Date => "date",
        }
    }

    /// Whether the field draws its answers from a fixed option list.
    pub fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One typed input slot of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

impl FieldDefinition {
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            placeholder: None,
            required: false,
            options: Vec::new(),
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A published form. Field order is display order and export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FormSchema {
    pub fn field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Description, treating an empty string as absent.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    pub fn required_field_count(&self) -> usize {
        self.fields.iter().filter(|f| f.required).count()
    }

    /// True when every field id is unique within the schema.
    pub fn has_unique_field_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.fields.iter().all(|f| seen.insert(f.id.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A raw answer as submitted. The shape depends on the field's type: scalars for
/// text-like fields, a list of selected options for checkboxes, null when the
/// field was left blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Flag(bool),
    Number(f64),
    Text(String),
    Choices(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            Self::Choices(c) => c.is_empty(),
            Self::Flag(_) | Self::Number(_) => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        Self::Choices(value)
    }
}

/// One submission against a form. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormEntry {
    pub id: String,
    pub form_id: String,
    #[serde(default)]
    pub data: BTreeMap<String, FieldValue>,
    pub created_at: DateTime<Utc>,
}

impl FormEntry {
    /// The raw answer for a field, `Empty` when the field was never submitted.
    pub fn value(&self, field_id: &str) -> &FieldValue {
        static EMPTY: FieldValue = FieldValue::Empty;
        self.data.get(field_id).unwrap_or(&EMPTY)
    }
}

// ---------------------------------------------------------------------------
// Generated templates
// ---------------------------------------------------------------------------

/// A stored report produced by the insight export path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTemplate {
    pub id: String,
    pub form_id: String,
    pub name: String,
    pub content: String,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

/// Input for [`crate::store::FormStore::create_template`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTemplate {
    pub form_id: String,
    pub name: String,
    pub content: String,
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_serde_lowercase() {
        let json = serde_json::to_string(&FieldType::Textarea).unwrap();
        assert_eq!(json, "\"textarea\"");
        let parsed: FieldType = serde_json::from_str("\"checkbox\"").unwrap();
        assert_eq!(parsed, FieldType::Checkbox);
    }

    #[test]
    fn test_field_type_has_options() {
        assert!(FieldType::Select.has_options());
        assert!(FieldType::Radio.has_options());
        assert!(FieldType::Checkbox.has_options());
        assert!(!FieldType::Text.has_options());
        assert!(!FieldType::Date.has_options());
    }

    #[test]
    fn test_field_definition_parses_original_shape() {
        let raw = json!({
            "id": "colour",
            "type": "select",
            "label": "Favourite colour",
            "required": true,
            "options": ["red", "blue"],
            "validation": { "pattern": "^[a-z]+$" }
        });
        let field: FieldDefinition = serde_json::from_value(raw).unwrap();
        assert_eq!(field.field_type, FieldType::Select);
        assert!(field.required);
        assert_eq!(field.options, vec!["red", "blue"]);
        assert_eq!(
            field.validation.unwrap().pattern.as_deref(),
            Some("^[a-z]+$")
        );
    }

    #[test]
    fn test_field_definition_omits_empty_options() {
        let field = FieldDefinition::new("name", FieldType::Text, "Name");
        let value = serde_json::to_value(&field).unwrap();
        assert!(value.get("options").is_none());
        assert_eq!(value["type"], "text");
    }

    #[test]
    fn test_field_value_untagged_variants() {
        let data: BTreeMap<String, FieldValue> = serde_json::from_value(json!({
            "a": "hello",
            "b": 42,
            "c": ["x", "y"],
            "d": null,
            "e": true
        }))
        .unwrap();
        assert_eq!(data["a"], FieldValue::Text("hello".into()));
        assert_eq!(data["b"], FieldValue::Number(42.0));
        assert_eq!(
            data["c"],
            FieldValue::Choices(vec!["x".into(), "y".into()])
        );
        assert_eq!(data["d"], FieldValue::Empty);
        assert_eq!(data["e"], FieldValue::Flag(true));
    }

    #[test]
    fn test_field_value_is_empty() {
        assert!(FieldValue::Empty.is_empty());
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(FieldValue::Choices(vec![]).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
        assert!(!FieldValue::Flag(false).is_empty());
    }

    #[test]
    fn test_entry_missing_value_is_empty() {
        let entry = FormEntry {
            id: "e1".into(),
            form_id: "f1".into(),
            data: BTreeMap::new(),
            created_at: Utc::now(),
        };
        assert_eq!(entry.value("missing"), &FieldValue::Empty);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = FormEntry {
            id: "e1".into(),
            form_id: "f1".into(),
            data: BTreeMap::from([("q".to_string(), FieldValue::from("a"))]),
            created_at: "2024-03-01T10:00:00Z".parse().unwrap(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["formId"], "f1");
        assert_eq!(value["createdAt"], "2024-03-01T10:00:00Z");
        assert_eq!(value["data"]["q"], "a");
    }

    #[test]
    fn test_schema_unique_field_ids() {
        let now = Utc::now();
        let mut schema = FormSchema {
            id: "f".into(),
            name: "Form".into(),
            description: Some(String::new()),
            fields: vec![
                FieldDefinition::new("a", FieldType::Text, "A").required(),
                FieldDefinition::new("b", FieldType::Text, "B"),
            ],
            created_at: now,
            updated_at: now,
        };
        assert!(schema.has_unique_field_ids());
        assert_eq!(schema.required_field_count(), 1);
        assert_eq!(schema.description(), None);
        schema.fields.push(FieldDefinition::new("a", FieldType::Email, "Dup"));
        assert!(!schema.has_unique_field_ids());
    }
}
