//! Per-field completion statistics and submission timing for a form.
//!
//! Everything here is recomputed from the entries on every call; nothing is
//! cached. Zero entries and zero fields both produce 0% rates rather than a
//! division by zero.

use chrono::{DateTime, NaiveDate, Utc};
use formcraft_core::{FormEntry, FormSchema};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::normalize::normalize;

/// Completion statistics for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCompletionStat {
    pub field_id: String,
    /// 0..=100, rounded.
    pub completion_rate: u32,
    /// Entries with a non-empty answer.
    pub response_count: usize,
    pub unique_value_count: usize,
    /// Most frequent non-empty answer; ties go to whichever appeared first.
    pub most_common_value: Option<String>,
}

/// Coarse submission trend: more than one entry counts as increasing.
/// This is a heuristic label, not a regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Increasing,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increasing => f.write_str("Increasing"),
            Self::Stable => f.write_str("Stable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormAnalytics {
    pub total_entries: usize,
    /// In schema field order.
    pub per_field: Vec<FieldCompletionStat>,
    pub average_completion_rate: u32,
    pub most_active_day: Option<NaiveDate>,
    pub last_submission: Option<DateTime<Utc>>,
    pub daily_counts: BTreeMap<NaiveDate, usize>,
    pub trend: Trend,
}

impl FormAnalytics {
    pub fn field(&self, field_id: &str) -> Option<&FieldCompletionStat> {
        self.per_field.iter().find(|s| s.field_id == field_id)
    }
}

/// Compute analytics for a form's entries.
pub fn aggregate(schema: &FormSchema, entries: &[FormEntry], separator: &str) -> FormAnalytics {
    let total = entries.len();

    let per_field: Vec<FieldCompletionStat> = schema
        .fields
        .iter()
        .map(|field| {
            let values: Vec<String> = entries
                .iter()
                .map(|entry| normalize(field, entry.value(&field.id), separator))
                .filter(|v| !v.is_empty())
                .collect();
            let (unique_value_count, most_common_value) = tally(&values);
            FieldCompletionStat {
                field_id: field.id.clone(),
                completion_rate: rounded_percent(values.len(), total),
                response_count: values.len(),
                unique_value_count,
                most_common_value,
            }
        })
        .collect();

    let rate_sum: usize = per_field.iter().map(|s| s.completion_rate as usize).sum();
    let average_completion_rate = rounded_ratio(rate_sum, per_field.len());

    let (most_active_day, daily_counts) = busiest_day(entries);

    FormAnalytics {
        total_entries: total,
        per_field,
        average_completion_rate,
        most_active_day,
        last_submission: entries.iter().map(|e| e.created_at).max(),
        daily_counts,
        trend: if total > 1 {
            Trend::Increasing
        } else {
            Trend::Stable
        },
    }
}

/// Distinct-value count and the most frequent value. Ties are resolved in
/// favour of the value encountered first.
fn tally(values: &[String]) -> (usize, Option<String>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for value in values {
        let count = counts.entry(value.as_str()).or_insert(0);
        if *count == 0 {
            first_seen.push(value.as_str());
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for &value in &first_seen {
        let count = counts[value];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }

    (first_seen.len(), best.map(|(v, _)| v.to_string()))
}

/// The calendar day with the most entries. Entries are walked in
/// chronological order and the first day to reach the maximum wins.
fn busiest_day(entries: &[FormEntry]) -> (Option<NaiveDate>, BTreeMap<NaiveDate, usize>) {
    let mut ordered: Vec<&FormEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.created_at);

    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut best: Option<(NaiveDate, usize)> = None;
    for entry in ordered {
        let day = entry.created_at.date_naive();
        let count = counts.entry(day).or_insert(0);
        *count += 1;
        if best.is_none_or(|(_, best_count)| *count > best_count) {
            best = Some((day, *count));
        }
    }

    (best.map(|(day, _)| day), counts)
}

/// round(100 * part / whole), 0 when `whole` is 0.
fn rounded_percent(part: usize, whole: usize) -> u32 {
    rounded_ratio(part * 100, whole)
}

/// round(numerator / denominator) with halves rounded up, 0 when the
/// denominator is 0.
fn rounded_ratio(numerator: usize, denominator: usize) -> u32 {
    if denominator == 0 {
        return 0;
    }
    ((2 * numerator + denominator) / (2 * denominator)) as u32
}
