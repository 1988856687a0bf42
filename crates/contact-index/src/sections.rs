use crate::IndexError;
use contact_core::ContactRow;
use std::collections::BTreeSet;

pub const DEFAULT_FALLBACK_LABEL: &str = "#";

/// Which labels the index exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionAlphabet {
    /// Only labels that occur in the rows.
    #[default]
    Observed,
    /// `A`..=`Z` plus the fallback label, whether or not rows exist for them.
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionConfig {
    pub fallback_label: String,
    pub alphabet: SectionAlphabet,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
            alphabet: SectionAlphabet::default(),
        }
    }
}

/// Label for a sort key: its first letter uppercased, or `fallback` when the
/// key is blank or starts with something other than a letter.
pub fn section_label(sort_key: &str, fallback: &str) -> String {
    match sort_key.trim_start().chars().next() {
        Some(first) if first.is_alphabetic() => first.to_uppercase().collect(),
        _ => fallback.to_string(),
    }
}

/// Stable-sorts rows into section order: by label, then by the trimmed,
/// lowercased sort key. Rows that compare equal keep their relative order.
pub fn order_by_section(rows: &mut [ContactRow], config: &SectionConfig) {
    rows.sort_by_cached_key(|row| {
        (
            section_label(&row.sort_key, &config.fallback_label),
            row.sort_key.trim().to_lowercase(),
        )
    });
}

/// Bidirectional section/position lookup over a projected row sequence.
///
/// Built once per projection; both directions are table lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionIndexer {
    sections: Vec<String>,
    section_starts: Vec<usize>,
    populated: Vec<bool>,
    position_sections: Vec<usize>,
}

impl SectionIndexer {
    pub fn build(rows: &[ContactRow], config: &SectionConfig) -> Self {
        let labels: Vec<String> = rows
            .iter()
            .map(|row| section_label(&row.sort_key, &config.fallback_label))
            .collect();

        let mut distinct: BTreeSet<String> = labels.iter().cloned().collect();
        if config.alphabet == SectionAlphabet::Full {
            distinct.extend(('A'..='Z').map(String::from));
            distinct.insert(config.fallback_label.clone());
        }
        let sections: Vec<String> = distinct.into_iter().collect();

        let position_sections: Vec<usize> = labels
            .iter()
            .map(|label| {
                sections
                    .binary_search(label)
                    .unwrap_or_else(|insert_at| insert_at)
            })
            .collect();

        let mut first: Vec<Option<usize>> = vec![None; sections.len()];
        for (position, section) in position_sections.iter().enumerate() {
            if let Some(slot) = first.get_mut(*section) {
                slot.get_or_insert(position);
            }
        }

        // Empty sections point at the next populated one, or the previous
        // one when nothing follows.
        let mut following = vec![None; sections.len()];
        let mut next = None;
        for idx in (0..sections.len()).rev() {
            if first[idx].is_some() {
                next = first[idx];
            }
            following[idx] = next;
        }
        let mut previous = None;
        let section_starts = (0..sections.len())
            .map(|idx| {
                if first[idx].is_some() {
                    previous = first[idx];
                }
                following[idx].or(previous).unwrap_or_default()
            })
            .collect();

        Self {
            sections,
            section_starts,
            populated: first.iter().map(Option::is_some).collect(),
            position_sections,
        }
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.position_sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position_sections.is_empty()
    }

    pub fn position_for_section(&self, section: usize) -> Result<usize, IndexError> {
        self.section_starts
            .get(section)
            .copied()
            .ok_or(IndexError::SectionOutOfRange {
                section,
                sections: self.sections.len(),
            })
    }

    pub fn section_for_position(&self, position: usize) -> Result<usize, IndexError> {
        self.position_sections
            .get(position)
            .copied()
            .ok_or(IndexError::PositionOutOfRange {
                position,
                len: self.position_sections.len(),
            })
    }

    pub fn label_for_position(&self, position: usize) -> Result<&str, IndexError> {
        let section = self.section_for_position(position)?;
        Ok(self.sections[section].as_str())
    }

    /// True when `position` is the first row of its section.
    pub fn is_section_start(&self, position: usize) -> Result<bool, IndexError> {
        let section = self.section_for_position(position)?;
        Ok(self.populated[section] && self.section_starts[section] == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(keys: &[&str]) -> Vec<ContactRow> {
        keys.iter()
            .enumerate()
            .map(|(idx, key)| ContactRow {
                contact_id: idx.to_string(),
                display_name: key.to_string(),
                sort_key: key.to_string(),
                ..ContactRow::default()
            })
            .collect()
    }

    #[test]
    fn maps_sections_and_positions_both_ways() {
        let index = SectionIndexer::build(
            &rows(&["Abe", "Amy", "Ben", "Cat"]),
            &SectionConfig::default(),
        );
        assert_eq!(index.sections(), ["A", "B", "C"]);
        assert_eq!(index.section_for_position(0).expect("pos 0"), 0);
        assert_eq!(index.section_for_position(1).expect("pos 1"), 0);
        assert_eq!(index.section_for_position(2).expect("pos 2"), 1);
        assert_eq!(index.position_for_section(0).expect("A"), 0);
        assert_eq!(index.position_for_section(1).expect("B"), 2);
        assert_eq!(index.position_for_section(2).expect("C"), 3);
    }

    #[test]
    fn section_start_round_trip_holds_for_every_position() {
        let index = SectionIndexer::build(
            &rows(&["", "1800 Flowers", "anna", "Arne", "bo", "Zed", "zoe"]),
            &SectionConfig::default(),
        );
        for position in 0..index.len() {
            let section = index.section_for_position(position).expect("section");
            let start = index.position_for_section(section).expect("start");
            assert!(start <= position);
            assert_eq!(
                index.section_for_position(start).expect("start section"),
                section
            );
            assert_eq!(
                index.is_section_start(position).expect("in range"),
                start == position
            );
        }
    }

    #[test]
    fn blank_and_non_letter_keys_use_fallback_label() {
        let index = SectionIndexer::build(
            &rows(&["", "  ", "42 Street", "+1 555", "émile", "ōno"]),
            &SectionConfig::default(),
        );
        assert_eq!(index.label_for_position(0).expect("blank"), "#");
        assert_eq!(index.label_for_position(1).expect("spaces"), "#");
        assert_eq!(index.label_for_position(2).expect("digit"), "#");
        assert_eq!(index.label_for_position(3).expect("symbol"), "#");
        assert_eq!(index.label_for_position(4).expect("accented"), "É");
        assert_eq!(index.label_for_position(5).expect("macron"), "Ō");
    }

    #[test]
    fn ordering_groups_fallback_rows_ahead_of_letters() {
        let mut ordered = rows(&["1800 Flowers", "Alice", "~Tilde", "😀 Party", " bob", "Bea"]);
        order_by_section(&mut ordered, &SectionConfig::default());
        let keys: Vec<&str> = ordered.iter().map(|row| row.sort_key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["1800 Flowers", "~Tilde", "😀 Party", "Alice", "Bea", " bob"]
        );

        let index = SectionIndexer::build(&ordered, &SectionConfig::default());
        let starts: Vec<usize> = (0..index.sections().len())
            .map(|section| index.position_for_section(section).expect("start"))
            .collect();
        assert_eq!(starts, vec![0, 3, 4]);
    }

    #[test]
    fn ordering_keeps_equal_rows_in_input_order() {
        let mut ordered = rows(&["Ann", "ann", "Ann"]);
        order_by_section(&mut ordered, &SectionConfig::default());
        let ids: Vec<&str> = ordered.iter().map(|row| row.contact_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[test]
    fn labels_are_case_normalized() {
        assert_eq!(section_label("alice", "#"), "A");
        assert_eq!(section_label("Alice", "#"), "A");
        assert_eq!(section_label("", "?"), "?");
    }

    #[test]
    fn empty_sections_fall_forward_then_back() {
        let config = SectionConfig {
            alphabet: SectionAlphabet::Full,
            ..SectionConfig::default()
        };
        let index = SectionIndexer::build(&rows(&["Alice", "Carol"]), &config);
        assert_eq!(index.sections().len(), 27);
        assert_eq!(index.sections()[0], "#");

        let section = |label: &str| {
            index
                .sections()
                .iter()
                .position(|s| s == label)
                .expect("label present")
        };
        assert_eq!(index.position_for_section(section("#")).expect("#"), 0);
        assert_eq!(index.position_for_section(section("A")).expect("A"), 0);
        assert_eq!(index.position_for_section(section("B")).expect("B"), 1);
        assert_eq!(index.position_for_section(section("C")).expect("C"), 1);
        assert_eq!(index.position_for_section(section("Z")).expect("Z"), 1);
        assert!(index.is_section_start(0).expect("pos 0"));
        assert!(index.is_section_start(1).expect("pos 1"));
    }

    #[test]
    fn full_alphabet_without_rows_points_at_zero() {
        let config = SectionConfig {
            alphabet: SectionAlphabet::Full,
            ..SectionConfig::default()
        };
        let index = SectionIndexer::build(&[], &config);
        assert_eq!(index.sections().len(), 27);
        assert_eq!(index.position_for_section(26).expect("in range"), 0);
        assert!(index.section_for_position(0).is_err());
    }

    #[test]
    fn unsorted_rows_point_at_first_occurrence() {
        let index =
            SectionIndexer::build(&rows(&["Bea", "Al", "Bo", "Ann"]), &SectionConfig::default());
        assert_eq!(index.sections(), ["A", "B"]);
        assert_eq!(index.position_for_section(0).expect("A"), 1);
        assert_eq!(index.position_for_section(1).expect("B"), 0);
        assert!(!index.is_section_start(2).expect("Bo"));
        assert!(!index.is_section_start(3).expect("Ann"));
    }

    #[test]
    fn out_of_range_lookups_fail() {
        let index = SectionIndexer::build(&rows(&["Ann"]), &SectionConfig::default());
        assert_eq!(
            index.section_for_position(1),
            Err(IndexError::PositionOutOfRange {
                position: 1,
                len: 1
            })
        );
        assert_eq!(
            index.position_for_section(1),
            Err(IndexError::SectionOutOfRange {
                section: 1,
                sections: 1
            })
        );
    }

    #[test]
    fn empty_rows_have_no_sections() {
        let index = SectionIndexer::build(&[], &SectionConfig::default());
        assert!(index.sections().is_empty());
        assert!(index.is_empty());
        assert!(index.position_for_section(0).is_err());
    }
}
