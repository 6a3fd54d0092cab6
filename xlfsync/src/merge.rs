//! Reconciliation of a snapshot against a translation memory document.
//!
//! Units are joined on id:
//!
//! | snapshot | document | result |
//! |---|---|---|
//! | present | absent | appended with an empty target in state `new` |
//! | present | same source | left alone |
//! | present | different source | source replaced, target kept, state `needs-review-translation` |
//! | absent | present | removed |
//!
//! Existing units keep their position; new units are appended in snapshot
//! order. The developer note always follows the snapshot; everything a
//! translation tool added to a unit is left alone, except that a changed
//! source withdraws the unit's `approved` flag.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    snapshot::Snapshot,
    types::{TargetState, TranslationUnit},
    xliff::{Document, Unit},
};

/// What one merge changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeReport {
    pub added: usize,
    /// Units whose source changed and now need review.
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
}

impl MergeReport {
    /// True when the merge left every unit as it was.
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }
}

impl std::ops::AddAssign for MergeReport {
    fn add_assign(&mut self, other: Self) {
        self.added += other.added;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.removed += other.removed;
    }
}

/// Brings `document` in line with `snapshot`.
pub fn merge(document: &mut Document, snapshot: &Snapshot) -> MergeReport {
    let wanted: HashMap<&str, &TranslationUnit> =
        snapshot.iter().map(|u| (u.id.as_str(), u)).collect();
    let mut report = MergeReport::default();

    let before = document.units.len();
    document
        .units
        .retain(|unit| wanted.contains_key(unit.id.as_str()));
    report.removed = before - document.units.len();

    for unit in &mut document.units {
        let Some(current) = wanted.get(unit.id.as_str()) else {
            continue;
        };
        unit.note.clone_from(&current.note);
        if unit.source == current.source {
            report.unchanged += 1;
        } else {
            unit.source.clone_from(&current.source);
            unit.state = Some(TargetState::NeedsReviewTranslation);
            unit.retained.attributes.retain(|(name, _)| name != "approved");
            report.updated += 1;
        }
    }

    let existing: HashSet<String> = document.units.iter().map(|u| u.id.clone()).collect();
    for unit in snapshot.iter().filter(|u| !existing.contains(&u.id)) {
        document.units.push(Unit {
            id: unit.id.clone(),
            source: unit.source.clone(),
            target: Some(String::new()),
            state: Some(TargetState::New),
            note: unit.note.clone(),
            ..Unit::default()
        });
        report.added += 1;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(units: &[(&str, &str)]) -> Snapshot {
        Snapshot::from_units(
            units
                .iter()
                .map(|(id, source)| TranslationUnit::new(*id, *source)),
        )
        .unwrap()
    }

    fn translated(id: &str, source: &str, target: &str) -> Unit {
        Unit {
            id: id.to_string(),
            source: source.to_string(),
            target: Some(target.to_string()),
            state: Some(TargetState::Translated),
            note: None,
            ..Unit::default()
        }
    }

    fn document(units: Vec<Unit>) -> Document {
        let mut doc = Document::new("Strings.resx", "en", Some("de".to_string()));
        doc.units = units;
        doc
    }

    #[test]
    fn test_merge_into_empty_document_adds_new_units() {
        let mut doc = document(Vec::new());
        let report = merge(&mut doc, &snapshot(&[("A", "Apple"), ("B", "Banana")]));
        assert_eq!(report.added, 2);
        assert_eq!(doc.units.len(), 2);
        assert_eq!(doc.units[0].id, "A");
        assert_eq!(doc.units[1].target.as_deref(), Some(""));
        assert_eq!(doc.units[1].state, Some(TargetState::New));
    }

    #[test]
    fn test_unchanged_source_keeps_translation() {
        let mut doc = document(vec![translated("A", "Apple", "Apfel")]);
        let report = merge(&mut doc, &snapshot(&[("A", "Apple")]));
        assert_eq!(report.unchanged, 1);
        assert!(report.is_noop());
        assert_eq!(doc.units[0], translated("A", "Apple", "Apfel"));
    }

    #[test]
    fn test_changed_source_is_flagged_for_review() {
        let mut doc = document(vec![translated("A", "Apple", "Apfel")]);
        let report = merge(&mut doc, &snapshot(&[("A", "Green apple")]));
        assert_eq!(report.updated, 1);
        let unit = &doc.units[0];
        assert_eq!(unit.source, "Green apple");
        assert_eq!(unit.target.as_deref(), Some("Apfel"));
        assert_eq!(unit.state, Some(TargetState::NeedsReviewTranslation));
    }

    #[test]
    fn test_units_missing_from_snapshot_are_pruned() {
        let mut doc = document(vec![
            translated("A", "Apple", "Apfel"),
            translated("Gone", "Old", "Alt"),
        ]);
        let report = merge(&mut doc, &snapshot(&[("A", "Apple")]));
        assert_eq!(report.removed, 1);
        assert!(doc.get("Gone").is_none());
    }

    #[test]
    fn test_existing_units_keep_position_and_new_units_append() {
        let mut doc = document(vec![
            translated("C", "Cherry", "Kirsche"),
            translated("A", "Apple", "Apfel"),
        ]);
        merge(
            &mut doc,
            &snapshot(&[("A", "Apple"), ("B", "Banana"), ("C", "Cherry"), ("D", "Date")]),
        );
        let ids: Vec<&str> = doc.units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn test_notes_follow_snapshot() {
        let mut unit = translated("A", "Apple", "Apfel");
        unit.note = Some("old note".to_string());
        let mut doc = document(vec![unit]);
        let snap = Snapshot::from_units(vec![TranslationUnit::new("A", "Apple").with_note("fruit")])
            .unwrap();
        let report = merge(&mut doc, &snap);
        assert_eq!(report.unchanged, 1);
        assert_eq!(doc.units[0].note.as_deref(), Some("fruit"));
        assert_eq!(doc.units[0].state, Some(TargetState::Translated));
    }

    #[test]
    fn test_review_withdraws_approval_but_keeps_tool_content() {
        let mut unit = translated("A", "Apple", "Apfel");
        unit.retained.attributes = vec![
            ("approved".to_string(), "yes".to_string()),
            ("resname".to_string(), "A".to_string()),
        ];
        unit.retained.children = vec![r#"<note from="reviewer">checked</note>"#.to_string()];
        let mut doc = document(vec![unit]);

        merge(&mut doc, &snapshot(&[("A", "Green apple")]));
        let unit = &doc.units[0];
        assert_eq!(unit.retained.attributes, vec![("resname".to_string(), "A".to_string())]);
        assert_eq!(unit.retained.children.len(), 1);
        assert_eq!(unit.target.as_deref(), Some("Apfel"));
    }

    #[test]
    fn test_report_accumulates() {
        let mut total = MergeReport::default();
        total += MergeReport { added: 1, updated: 2, unchanged: 3, removed: 4 };
        total += MergeReport { added: 1, ..MergeReport::default() };
        assert_eq!(total.added, 2);
        assert_eq!(total.removed, 4);
    }
}
