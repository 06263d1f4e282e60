//! Plain-text rendering of inspection results

use sitesafe_core::{ClassCatalog, CountTable, SafetyVerdict, Severity};
use std::fmt::Write;

/// Two-column count table, one row per catalog class
pub fn count_table(counts: &CountTable) -> String {
    let width = counts
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        .max("Object".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>5}", "Object", "Count", width = width);
    let _ = writeln!(out, "{}  {}", "-".repeat(width), "-".repeat(5));
    for (label, count) in counts.iter() {
        let _ = writeln!(out, "{:<width$}  {:>5}", label, count, width = width);
    }
    out
}

/// Safety analysis: a lone warning, or three lines and a banner
pub fn safety_analysis(verdict: &SafetyVerdict) -> String {
    let mut out = String::new();
    if let Some(counts) = verdict.counts() {
        let _ = writeln!(out, "Total workers detected: {}", counts.person);
        let _ = writeln!(out, "Workers without a helmet: {}", counts.no_helmet);
        let _ = writeln!(out, "Workers without a vest: {}", counts.no_vest);
    }
    let tag = match verdict.severity() {
        Severity::Warning => "WARNING",
        Severity::Error => "VIOLATION",
        Severity::Success => "OK",
    };
    let _ = writeln!(out, "[{}] {}", tag, verdict.message());
    out
}

/// Catalog listing, one `id  label` line per class
pub fn class_list(catalog: &ClassCatalog) -> String {
    let mut out = String::new();
    for (id, label) in catalog.iter().enumerate() {
        let _ = writeln!(out, "{:>3}  {}", id, label);
    }
    out
}
