use contact_core::{ContactColumn, ContactRow};
use contact_index::{ContactListAdapter, IndexError};

const DUMP_SEPARATOR: &str = "--------------------------------------------------";

fn column_label(column: ContactColumn) -> &'static str {
    match column {
        ContactColumn::ContactId => "Contact ID",
        ContactColumn::DisplayName => "Display Name",
        ContactColumn::PhotoThumbUri => "Photo Thumbnail URI",
        ContactColumn::Data1 => "Data1",
        ContactColumn::Data2 => "Data2",
        ContactColumn::Data3 => "Data3",
        ContactColumn::Lookup => "Lookup",
        ContactColumn::RowId => "ID",
        ContactColumn::SortKey => "Sort Key",
    }
}

/// One line per bound row, preceded by a header line where a section starts.
pub fn render_list(adapter: &ContactListAdapter) -> Result<Vec<String>, IndexError> {
    let mut lines = Vec::with_capacity(adapter.len() + adapter.sections().len());
    for position in 0..adapter.len() {
        let bound = adapter.bind(position)?;
        if let Some(header) = bound.section_header {
            lines.push(format!("[{header}]"));
        }
        let row = bound.row;
        let name = if row.display_name.is_empty() {
            "(no name)"
        } else {
            row.display_name.as_str()
        };
        if row.data1.is_empty() {
            lines.push(format!("  {name}"));
        } else {
            lines.push(format!("  {name}  {}", row.data1));
        }
    }
    Ok(lines)
}

pub fn render_sections(adapter: &ContactListAdapter) -> Result<Vec<String>, IndexError> {
    adapter
        .sections()
        .iter()
        .enumerate()
        .map(|(section, label)| {
            let position = adapter.position_for_section(section)?;
            Ok(format!("{label}\t{position}"))
        })
        .collect()
}

/// Every field of every raw row, duplicates included.
pub fn render_dump(rows: &[ContactRow], debug: bool) -> Vec<String> {
    let prefix = if debug { "DEBUG: " } else { "" };
    if rows.is_empty() {
        return vec![format!("{prefix}No rows.")];
    }
    let mut lines = Vec::with_capacity(rows.len() * (ContactColumn::ALL.len() + 1));
    for row in rows {
        for column in ContactColumn::ALL {
            lines.push(format!(
                "{prefix}{}: {}",
                column_label(column),
                row.field(column)
            ));
        }
        lines.push(format!("{prefix}{DUMP_SEPARATOR}"));
    }
    lines
}
