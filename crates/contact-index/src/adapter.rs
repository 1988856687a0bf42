use crate::projection::{project_with_report, ProjectionReport};
use crate::sections::{order_by_section, SectionConfig, SectionIndexer};
use crate::IndexError;
use contact_core::{ContactRow, RowSource};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Attach a section header to the first row of each section when binding.
    pub alphabet_headers: bool,
    pub sections: SectionConfig,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            alphabet_headers: true,
            sections: SectionConfig::default(),
        }
    }
}

/// Projected rows together with the section index built over them.
/// Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    rows: Vec<ContactRow>,
    index: SectionIndexer,
    report: ProjectionReport,
}

impl ListSnapshot {
    pub fn build(rows: Option<&[ContactRow]>, config: &SectionConfig) -> Self {
        let (rows, report) = project_with_report(rows.unwrap_or_default());
        let index = SectionIndexer::build(&rows, config);
        Self {
            rows,
            index,
            report,
        }
    }

    pub fn rows(&self) -> &[ContactRow] {
        &self.rows
    }

    pub fn index(&self) -> &SectionIndexer {
        &self.index
    }

    pub fn report(&self) -> ProjectionReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, position: usize) -> Result<&ContactRow, IndexError> {
        self.rows.get(position).ok_or(IndexError::PositionOutOfRange {
            position,
            len: self.rows.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundRow<'a> {
    pub position: usize,
    pub row: &'a ContactRow,
    pub section_header: Option<&'a str>,
}

/// Contact list state handed to a list view: deduplicated rows plus the
/// alphabet index, replaced wholesale on every refresh.
#[derive(Debug, Clone)]
pub struct ContactListAdapter {
    config: AdapterConfig,
    snapshot: Arc<ListSnapshot>,
}

impl ContactListAdapter {
    pub fn new(rows: Option<Vec<ContactRow>>, config: AdapterConfig) -> Self {
        let snapshot = Arc::new(ListSnapshot::build(rows.as_deref(), &config.sections));
        Self { config, snapshot }
    }

    /// Rebuilds from `rows` and returns the snapshot that was replaced.
    pub fn refresh(&mut self, rows: Option<Vec<ContactRow>>) -> Arc<ListSnapshot> {
        let next = Arc::new(ListSnapshot::build(rows.as_deref(), &self.config.sections));
        debug!(
            rows = next.len(),
            sections = next.index().sections().len(),
            dropped = next.report().duplicates_dropped,
            "refreshed contact list"
        );
        std::mem::replace(&mut self.snapshot, next)
    }

    /// Fetches rows from `source`, puts them in section order so every
    /// section is a run of consecutive rows, then refreshes.
    pub fn load_from<S>(&mut self, source: &S) -> Result<Arc<ListSnapshot>, S::Error>
    where
        S: RowSource + ?Sized,
    {
        let mut rows = source.fetch_rows()?;
        if let Some(rows) = rows.as_mut() {
            order_by_section(rows, &self.config.sections);
        }
        Ok(self.refresh(rows))
    }

    pub fn bind(&self, position: usize) -> Result<BoundRow<'_>, IndexError> {
        let row = self.snapshot.row(position)?;
        let index = self.snapshot.index();
        let section_header = if self.config.alphabet_headers && index.is_section_start(position)? {
            Some(index.label_for_position(position)?)
        } else {
            None
        };
        Ok(BoundRow {
            position,
            row,
            section_header,
        })
    }

    pub fn sections(&self) -> &[String] {
        self.snapshot.index().sections()
    }

    pub fn position_for_section(&self, section: usize) -> Result<usize, IndexError> {
        self.snapshot.index().position_for_section(section)
    }

    pub fn section_for_position(&self, position: usize) -> Result<usize, IndexError> {
        self.snapshot.index().section_for_position(position)
    }

    pub fn rows(&self) -> &[ContactRow] {
        self.snapshot.rows()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn snapshot(&self) -> Arc<ListSnapshot> {
        Arc::clone(&self.snapshot)
    }
}
