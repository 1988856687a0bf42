use contact_core::ContactRow;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionReport {
    pub input_rows: usize,
    pub unique_rows: usize,
    pub duplicates_dropped: usize,
}

/// Keeps the first row seen for each `contact_id`, in input order.
pub fn project(rows: &[ContactRow]) -> Vec<ContactRow> {
    project_with_report(rows).0
}

pub fn project_with_report(rows: &[ContactRow]) -> (Vec<ContactRow>, ProjectionReport) {
    let mut seen: HashSet<&str> = HashSet::with_capacity(rows.len());
    let mut unique = Vec::with_capacity(rows.len());
    for row in rows {
        if seen.insert(row.contact_id.as_str()) {
            unique.push(row.clone());
        }
    }

    let report = ProjectionReport {
        input_rows: rows.len(),
        unique_rows: unique.len(),
        duplicates_dropped: rows.len() - unique.len(),
    };
    debug!(
        input = report.input_rows,
        unique = report.unique_rows,
        dropped = report.duplicates_dropped,
        "projected contact rows"
    );
    (unique, report)
}
