//! Latest-submission overview and its table rendering.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::store::SubmissionRecord;

pub const HEADERS: [&str; 5] = ["Student", "Assignment", "Status", "Tests", "Latest Submit"];

/// Minimum padding added to each header, as tabulate's github format does.
const HEADER_PADDING: usize = 2;

/// Keeps the most recent record per `(student_id, assignment)`, ordered by
/// student then assignment. On equal timestamps the earlier row wins.
pub fn build_overviews(records: Vec<SubmissionRecord>) -> Vec<SubmissionRecord> {
    let mut latest: BTreeMap<(String, String), SubmissionRecord> = BTreeMap::new();

    for record in records {
        let key = (record.student_id.clone(), record.assignment.clone());
        match latest.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if record.timestamp > slot.get().timestamp {
                    slot.insert(record);
                }
            }
        }
    }

    latest.into_values().collect()
}

fn row(record: &SubmissionRecord) -> [String; 5] {
    [
        record.student_id.clone(),
        record.assignment.clone(),
        if record.passed { "PASS" } else { "FAIL" }.to_string(),
        format!("{}/{}", record.passed_tests, record.total_tests),
        record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
    ]
}

/// Renders entries as a GitHub-flavoured markdown table.
pub fn render_table(entries: &[SubmissionRecord]) -> String {
    let rows: Vec<[String; 5]> = entries.iter().map(row).collect();

    let mut widths = HEADERS.map(|h| h.chars().count() + HEADER_PADDING);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[&str]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!(" {cell:<width$} "))
            .collect();
        format!("|{}|", padded.join("|"))
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_line(&HEADERS[..]));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    lines.push(format!("|{}|", rule.join("|")));
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_line(&cells));
    }

    lines.join("\n")
}
