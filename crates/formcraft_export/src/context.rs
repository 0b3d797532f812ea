use chrono::{DateTime, NaiveDate, Utc};
use formcraft_core::{ExportOptions, FieldDefinition, FormEntry, FormSchema};
use std::fmt::Write;

use crate::normalize::normalize;

/// Everything an encoder reads: one immutable snapshot of a form and its
/// entries, presentation options, and the wall-clock instant stamped into
/// "generated at" lines.
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    pub schema: &'a FormSchema,
    pub entries: &'a [FormEntry],
    pub options: &'a ExportOptions,
    pub generated_at: DateTime<Utc>,
}

impl<'a> ExportContext<'a> {
    pub fn new(schema: &'a FormSchema, entries: &'a [FormEntry], options: &'a ExportOptions) -> Self {
        Self {
            schema,
            entries,
            options,
            generated_at: Utc::now(),
        }
    }

    /// Pin the generation timestamp (reproducible output).
    pub fn at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn normalized(&self, entry: &FormEntry, field: &FieldDefinition) -> String {
        normalize(field, entry.value(&field.id), &self.options.list_separator)
    }

    /// Human-readable timestamp per `ExportOptions::timestamp_format`.
    pub fn display_time(&self, ts: &DateTime<Utc>) -> String {
        format_or_rfc3339(ts, &self.options.timestamp_format)
    }

    /// Calendar day per `ExportOptions::day_format`.
    pub fn display_day(&self, day: &NaiveDate) -> String {
        let mut out = String::new();
        match write!(out, "{}", day.format(&self.options.day_format)) {
            Ok(()) => out,
            Err(_) => day.to_string(),
        }
    }
}

/// A malformed user-supplied format string makes chrono's `Display` fail;
/// fall back to RFC 3339 instead of panicking in `to_string`.
fn format_or_rfc3339(ts: &DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", ts.format(pattern)) {
        Ok(()) => out,
        Err(_) => ts.to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_time_uses_options() {
        let now = Utc::now();
        let schema = FormSchema {
            id: "f".into(),
            name: "F".into(),
            description: None,
            fields: vec![],
            created_at: now,
            updated_at: now,
        };
        let mut options = ExportOptions::default();
        options.timestamp_format = "%d/%m/%Y".into();
        let ctx = ExportContext::new(&schema, &[], &options);
        let ts: DateTime<Utc> = "2024-02-03T04:05:06Z".parse().unwrap();
        assert_eq!(ctx.display_time(&ts), "03/02/2024");
    }

    #[test]
    fn test_invalid_format_falls_back() {
        let now = Utc::now();
        let schema = FormSchema {
            id: "f".into(),
            name: "F".into(),
            description: None,
            fields: vec![],
            created_at: now,
            updated_at: now,
        };
        let mut options = ExportOptions::default();
        options.timestamp_format = "%Q".into();
        options.day_format = "%Q".into();
        let ctx = ExportContext::new(&schema, &[], &options);
        let ts: DateTime<Utc> = "2024-02-03T04:05:06Z".parse().unwrap();
        assert_eq!(ctx.display_time(&ts), "2024-02-03T04:05:06+00:00");
        assert_eq!(ctx.display_day(&ts.date_naive()), "2024-02-03");
    }
}
