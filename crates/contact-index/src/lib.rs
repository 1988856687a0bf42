//! Deduplicated, alphabet-sectioned projection of contact rows for list views.

mod adapter;
mod projection;
mod sections;

pub use adapter::{AdapterConfig, BoundRow, ContactListAdapter, ListSnapshot};
pub use projection::{project, project_with_report, ProjectionReport};
pub use sections::{
    order_by_section, section_label, SectionAlphabet, SectionConfig, SectionIndexer,
    DEFAULT_FALLBACK_LABEL,
};

use thiserror::Error;

/// Bounds violations from lookups. Always caused by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("position {position} out of range for {len} rows")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("section {section} out of range for {sections} sections")]
    SectionOutOfRange { section: usize, sections: usize },
}
