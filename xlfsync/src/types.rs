//! Core, format-agnostic types for xlfsync.
//! Adapters extract into these; the merge engine reconciles these.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Translated text keyed by translation unit id, as handed to reinjection.
pub type Translations = HashMap<String, String>;

/// One translatable string plus its stable identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TranslationUnit {
    /// Identifier, unique within one artifact and stable across runs.
    pub id: String,

    /// Source-language text.
    pub source: String,

    /// Optional comment for translators.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub note: Option<String>,
}

impl TranslationUnit {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        TranslationUnit {
            id: id.into(),
            source: source.into(),
            note: None,
        }
    }

    /// Attaches a note; empty notes are dropped.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.is_empty() { None } else { Some(note) };
        self
    }
}

impl Display for TranslationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TranslationUnit {{ id: {}, source: {} }}", self.id, self.source)
    }
}

/// Value of the XLIFF 1.2 `state` attribute on a `<target>`.
///
/// The merge engine only ever writes [`TargetState::New`] and
/// [`TargetState::NeedsReviewTranslation`]; everything else is owned by
/// translators and passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetState {
    Final,
    NeedsAdaptation,
    NeedsL10n,
    NeedsReviewAdaptation,
    NeedsReviewL10n,
    NeedsReviewTranslation,
    NeedsTranslation,
    New,
    SignedOff,
    Translated,
}

impl TargetState {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetState::Final => "final",
            TargetState::NeedsAdaptation => "needs-adaptation",
            TargetState::NeedsL10n => "needs-l10n",
            TargetState::NeedsReviewAdaptation => "needs-review-adaptation",
            TargetState::NeedsReviewL10n => "needs-review-l10n",
            TargetState::NeedsReviewTranslation => "needs-review-translation",
            TargetState::NeedsTranslation => "needs-translation",
            TargetState::New => "new",
            TargetState::SignedOff => "signed-off",
            TargetState::Translated => "translated",
        }
    }

    /// True when a translator still has work to do on the unit.
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            TargetState::New
                | TargetState::NeedsTranslation
                | TargetState::NeedsReviewTranslation
                | TargetState::NeedsAdaptation
                | TargetState::NeedsL10n
                | TargetState::NeedsReviewAdaptation
                | TargetState::NeedsReviewL10n
        )
    }
}

impl Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "final" => Ok(TargetState::Final),
            "needs-adaptation" => Ok(TargetState::NeedsAdaptation),
            "needs-l10n" => Ok(TargetState::NeedsL10n),
            "needs-review-adaptation" => Ok(TargetState::NeedsReviewAdaptation),
            "needs-review-l10n" => Ok(TargetState::NeedsReviewL10n),
            "needs-review-translation" => Ok(TargetState::NeedsReviewTranslation),
            "needs-translation" => Ok(TargetState::NeedsTranslation),
            "new" => Ok(TargetState::New),
            "signed-off" => Ok(TargetState::SignedOff),
            "translated" => Ok(TargetState::Translated),
            other => Err(Error::syntax(format!("unknown target state `{other}`"))),
        }
    }
}
