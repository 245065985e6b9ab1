//! Censorship modification events and their categories
//!
//! Each raw event is one edit a certification board required: an action
//! (`deletion`, `replacement`, `insertion`, ...) tagged with the kinds of
//! content it touched. Events are tallied into four
//! [`ModificationCategory`] counts:
//!
//! | Category              | Action                  | Content tag contains                              |
//! |-----------------------|-------------------------|---------------------------------------------------|
//! | `violence`            | any suppression action  | `violence`                                        |
//! | `sensitive_content`   | any suppression action  | `sexual_explicit`, `sexual_suggestive`, `profanity` |
//! | `political_religious` | any suppression action  | `political`, `religious`, `identity_reference`    |
//! | `disclaimers`         | `insertion`             | (any)                                             |
//!
//! A suppression action is one that removes, replaces or alters content; see
//! [`SUPPRESSION_ACTIONS`].

use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};

use crate::grouping::split_delimited;

/// Actions that remove, replace or alter content.
pub const SUPPRESSION_ACTIONS: [&str; 6] = [
    "deletion",
    "audio_modification",
    "visual_modification",
    "text_modification",
    "content_overlay",
    "replacement",
];

/// Action that adds a disclaimer or warning.
pub const INSERTION_ACTION: &str = "insertion";

/// A raw censorship event for one version of a film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationEvent {
    pub id: String,
    #[serde(default)]
    pub language: Option<String>,
    /// Certificate text, e.g. `"UA 13+"`.
    #[serde(default, alias = "rating_raw")]
    pub rating: Option<String>,
    #[serde(default, alias = "ai_action")]
    pub action_kind: Option<String>,
    /// Content-type tags; entries may themselves be `|`/`;` delimited.
    #[serde(default, alias = "ai_content_types")]
    pub content_types: Vec<String>,
    /// Delimited genre list, e.g. `"Drama|Action"`.
    #[serde(default, alias = "imdb_genres")]
    pub genres: Option<String>,
}

impl ModificationEvent {
    fn normalized_action(&self) -> Option<String> {
        self.action_kind
            .as_deref()
            .map(|action| action.trim().to_lowercase())
    }

    fn is_suppression(&self) -> bool {
        self.normalized_action()
            .is_some_and(|action| SUPPRESSION_ACTIONS.contains(&action.as_str()))
    }

    fn has_tag_containing(&self, keywords: &[&str]) -> bool {
        self.content_types
            .iter()
            .flat_map(|tags| split_delimited(tags))
            .map(str::to_lowercase)
            .any(|tag| keywords.iter().any(|keyword| tag.contains(keyword)))
    }

    /// Whether this event counts towards `category`.
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_analysis::event::{ModificationCategory, ModificationEvent};
    ///
    /// let event = ModificationEvent {
    ///     id: "f1".to_owned(),
    ///     language: Some("Hindi".to_owned()),
    ///     rating: Some("UA".to_owned()),
    ///     action_kind: Some("deletion".to_owned()),
    ///     content_types: vec!["violence|profanity".to_owned()],
    ///     genres: None,
    /// };
    /// assert!(event.counts_towards(ModificationCategory::Violence));
    /// assert!(event.counts_towards(ModificationCategory::SensitiveContent));
    /// assert!(!event.counts_towards(ModificationCategory::Disclaimers));
    /// ```
    #[must_use]
    pub fn counts_towards(&self, category: ModificationCategory) -> bool {
        match category.content_keywords() {
            Some(keywords) => self.is_suppression() && self.has_tag_containing(keywords),
            None => self.normalized_action().as_deref() == Some(INSERTION_ACTION),
        }
    }

    /// Tallies of this single event.
    #[must_use]
    pub fn counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts::default();
        for category in ModificationCategory::ALL {
            if self.counts_towards(category) {
                counts.increment(category);
            }
        }
        counts
    }
}

/// The modification categories scored by comparative analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationCategory {
    Violence,
    SensitiveContent,
    PoliticalReligious,
    Disclaimers,
}

impl fmt::Display for ModificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl ModificationCategory {
    pub const ALL: [Self; 4] = [
        Self::Violence,
        Self::SensitiveContent,
        Self::PoliticalReligious,
        Self::Disclaimers,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Violence => "violence",
            Self::SensitiveContent => "sensitive_content",
            Self::PoliticalReligious => "political_religious",
            Self::Disclaimers => "disclaimers",
        }
    }

    /// Content keywords for suppression categories, `None` for disclaimers.
    #[must_use]
    pub fn content_keywords(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Violence => Some(&["violence"]),
            Self::SensitiveContent => Some(&["sexual_explicit", "sexual_suggestive", "profanity"]),
            Self::PoliticalReligious => Some(&["political", "religious", "identity_reference"]),
            Self::Disclaimers => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One count per [`ModificationCategory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts([u32; 4]);

impl CategoryCounts {
    pub fn increment(&mut self, category: ModificationCategory) {
        self.0[category.index()] += 1;
    }

    pub fn add(&mut self, other: &Self) {
        for (count, other) in self.0.iter_mut().zip(other.0) {
            *count += other;
        }
    }

    #[must_use]
    pub fn get(&self, category: ModificationCategory) -> u32 {
        self.0[category.index()]
    }
}

impl Index<ModificationCategory> for CategoryCounts {
    type Output = u32;

    fn index(&self, category: ModificationCategory) -> &Self::Output {
        &self.0[category.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(action: &str, tags: &[&str]) -> ModificationEvent {
        ModificationEvent {
            id: "f".to_owned(),
            language: Some("Tamil".to_owned()),
            rating: Some("A".to_owned()),
            action_kind: Some(action.to_owned()),
            content_types: tags.iter().map(|t| (*t).to_owned()).collect(),
            genres: None,
        }
    }

    #[test]
    fn test_suppression_requires_matching_tag() {
        let counts = event("audio_modification", &["profanity"]).counts();
        assert_eq!(counts[ModificationCategory::SensitiveContent], 1);
        assert_eq!(counts[ModificationCategory::Violence], 0);
        assert_eq!(counts[ModificationCategory::PoliticalReligious], 0);
        assert_eq!(counts[ModificationCategory::Disclaimers], 0);
    }

    #[test]
    fn test_non_suppression_action_ignores_tags() {
        let counts = event("insertion", &["violence", "religious"]).counts();
        assert_eq!(counts, {
            let mut expected = CategoryCounts::default();
            expected.increment(ModificationCategory::Disclaimers);
            expected
        });
    }

    #[test]
    fn test_tags_match_by_substring_and_case() {
        let e = event(" Deletion ", &["Graphic_Violence; religious_symbol"]);
        assert!(e.counts_towards(ModificationCategory::Violence));
        assert!(e.counts_towards(ModificationCategory::PoliticalReligious));
    }

    #[test]
    fn test_missing_action() {
        let mut e = event("deletion", &["violence"]);
        e.action_kind = None;
        assert_eq!(e.counts(), CategoryCounts::default());
    }

    #[test]
    fn test_add_counts() {
        let mut total = CategoryCounts::default();
        total.add(&event("deletion", &["violence"]).counts());
        total.add(&event("replacement", &["violence", "political"]).counts());
        assert_eq!(total.get(ModificationCategory::Violence), 2);
        assert_eq!(total.get(ModificationCategory::PoliticalReligious), 1);
    }

    #[test]
    fn test_deserialize_source_field_names() {
        let json = r#"{"id": "9", "language": "Hindi", "rating_raw": "U", "ai_action": "deletion",
                       "ai_content_types": ["violence"], "imdb_genres": "Action|Drama"}"#;
        let e: ModificationEvent = serde_json::from_str(json).unwrap();
        assert_eq!(e.rating.as_deref(), Some("U"));
        assert!(e.counts_towards(ModificationCategory::Violence));
        assert_eq!(e.genres.as_deref(), Some("Action|Drama"));
    }
}
