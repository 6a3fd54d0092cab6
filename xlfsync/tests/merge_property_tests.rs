use proptest::prelude::*;
use std::collections::BTreeMap;
use xlfsync::{
    Document, Snapshot, TargetState, TranslationUnit, merge, neutral_template, traits::Parser,
};

fn id_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z][A-Za-z0-9_|.]{0,15}").expect("valid id regex")
}

fn source_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 <>&\"'_\\-\\.,!\\?]{1,30}").expect("valid source regex")
}

fn units_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(id_strategy(), source_strategy(), 0..10)
}

fn snapshot(units: &BTreeMap<String, String>) -> Snapshot {
    Snapshot::from_units(
        units
            .iter()
            .map(|(id, source)| TranslationUnit::new(id.clone(), source.clone())),
    )
    .expect("ids are unique")
}

fn empty_document(language: &str) -> Document {
    Document::new("src/Strings.resx", "en", Some(language.to_string()))
}

fn render(document: &Document) -> Vec<u8> {
    let mut out = Vec::new();
    document.to_writer(&mut out).expect("serialize");
    out
}

/// Pretends a translator translated every unit.
fn translate_all(document: &mut Document) {
    for unit in &mut document.units {
        unit.target = Some(format!("[de] {}", unit.source));
        unit.state = Some(TargetState::Translated);
    }
}

proptest! {
    #[test]
    fn merging_twice_is_idempotent(units in units_strategy()) {
        let snap = snapshot(&units);
        let mut doc = empty_document("de");
        merge(&mut doc, &snap);
        let first = render(&doc);

        let mut reread = Document::from_bytes(&first).expect("reparse");
        let report = merge(&mut reread, &snap);
        prop_assert!(report.is_noop());
        prop_assert_eq!(render(&reread), first);
    }

    #[test]
    fn document_ids_match_snapshot_after_merge(
        before in units_strategy(),
        after in units_strategy(),
    ) {
        let mut doc = empty_document("de");
        merge(&mut doc, &snapshot(&before));
        translate_all(&mut doc);
        merge(&mut doc, &snapshot(&after));

        let mut ids: Vec<&str> = doc.units.iter().map(|u| u.id.as_str()).collect();
        ids.sort_unstable();
        let expected: Vec<&str> = after.keys().map(String::as_str).collect();
        prop_assert_eq!(ids, expected);

        for unit in &doc.units {
            prop_assert_eq!(&unit.source, &after[&unit.id]);
            match before.get(&unit.id) {
                None => {
                    prop_assert_eq!(unit.state, Some(TargetState::New));
                    prop_assert_eq!(unit.target.as_deref(), Some(""));
                }
                Some(old) if old == &unit.source => {
                    prop_assert_eq!(unit.state, Some(TargetState::Translated));
                    prop_assert_eq!(unit.target.clone(), Some(format!("[de] {old}")));
                }
                Some(old) => {
                    prop_assert_eq!(unit.state, Some(TargetState::NeedsReviewTranslation));
                    prop_assert_eq!(unit.target.clone(), Some(format!("[de] {old}")));
                }
            }
        }
    }

    #[test]
    fn neutral_template_is_language_independent(units in units_strategy()) {
        let snap = snapshot(&units);
        let mut german = empty_document("de");
        merge(&mut german, &snap);
        translate_all(&mut german);
        let mut japanese = empty_document("ja");
        merge(&mut japanese, &snap);

        let template = neutral_template(&german);
        prop_assert_eq!(&template, &neutral_template(&japanese));
        prop_assert!(template.target_language.is_none());
        prop_assert!(template.units.iter().all(|u| u.target.is_none() && u.state.is_none()));
    }
}
