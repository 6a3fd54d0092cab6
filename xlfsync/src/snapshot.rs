//! Canonical snapshots: the ordered, id-unique units of one artifact.

use std::collections::HashSet;

use crate::{error::Error, traits::Extract, types::TranslationUnit};

/// The translation units of one artifact at one point in time.
///
/// A snapshot lives only for the pass that built it; nothing is written to
/// disk on its behalf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    units: Vec<TranslationUnit>,
}

impl Snapshot {
    /// Collects the units an adapter extracts, rejecting duplicate ids.
    ///
    /// Filtering rules belong to the adapter, so whatever it yields is the
    /// canonical set.
    pub fn build<A: Extract + ?Sized>(artifact: &A) -> Result<Self, Error> {
        Self::from_units(artifact.units())
    }

    /// Builds a snapshot from units in document order.
    pub fn from_units<I: IntoIterator<Item = TranslationUnit>>(units: I) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for unit in units {
            if !seen.insert(unit.id.clone()) {
                return Err(Error::syntax(format!("duplicate id `{}`", unit.id)));
            }
            collected.push(unit);
        }
        Ok(Snapshot { units: collected })
    }

    /// Whether any unit survived extraction; empty artifacts are skipped.
    pub fn has_units(&self) -> bool {
        !self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[TranslationUnit] {
        &self.units
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranslationUnit> {
        self.units.iter()
    }

    pub fn get(&self, id: &str) -> Option<&TranslationUnit> {
        self.units.iter().find(|u| u.id == id)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a TranslationUnit;
    type IntoIter = std::slice::Iter<'a, TranslationUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}
