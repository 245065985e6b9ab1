//! Language categories used for proportional ranking
//!
//! Every film maps to exactly one [`LanguageCategory`], derived from the first
//! of its language labels. Unrecognized or missing labels fall into
//! [`LanguageCategory::Other`], so classification never fails.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the fixed language buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCategory {
    English,
    Hindi,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Other,
}

impl fmt::Display for LanguageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl LanguageCategory {
    /// All categories in declaration order.
    pub const ALL: [Self; 7] = [
        Self::English,
        Self::Hindi,
        Self::Tamil,
        Self::Telugu,
        Self::Kannada,
        Self::Malayalam,
        Self::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Hindi => "hindi",
            Self::Tamil => "tamil",
            Self::Telugu => "telugu",
            Self::Kannada => "kannada",
            Self::Malayalam => "malayalam",
            Self::Other => "other",
        }
    }

    /// Classifies a single language label (case-insensitive, trimmed).
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| *category != Self::Other && category.as_str() == label)
            .unwrap_or(Self::Other)
    }

    /// Classifies a film by its primary (first) language label.
    ///
    /// # Examples
    ///
    /// ```
    /// use filmcut_analysis::language::LanguageCategory;
    ///
    /// assert_eq!(
    ///     LanguageCategory::classify(&[" Tamil ", "Telugu"]),
    ///     LanguageCategory::Tamil
    /// );
    /// assert_eq!(LanguageCategory::classify(&["Bengali"]), LanguageCategory::Other);
    /// assert_eq!(LanguageCategory::classify::<&str>(&[]), LanguageCategory::Other);
    /// ```
    #[must_use]
    pub fn classify<S>(labels: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        labels
            .first()
            .map_or(Self::Other, |label| Self::from_label(label.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_whitespace_are_ignored() {
        assert_eq!(LanguageCategory::from_label("HINDI"), LanguageCategory::Hindi);
        assert_eq!(LanguageCategory::from_label("  malayalam\t"), LanguageCategory::Malayalam);
        assert_eq!(LanguageCategory::from_label("Kannada"), LanguageCategory::Kannada);
    }

    #[test]
    fn test_unknown_labels_are_other() {
        assert_eq!(LanguageCategory::from_label(""), LanguageCategory::Other);
        assert_eq!(LanguageCategory::from_label("marathi"), LanguageCategory::Other);
        // The literal label "other" is simply unrecognized
        assert_eq!(LanguageCategory::from_label("other"), LanguageCategory::Other);
    }

    #[test]
    fn test_only_first_label_counts() {
        let labels = vec!["Bhojpuri".to_owned(), "Hindi".to_owned()];
        assert_eq!(LanguageCategory::classify(&labels), LanguageCategory::Other);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LanguageCategory::Telugu).unwrap();
        assert_eq!(json, "\"telugu\"");
        let parsed: LanguageCategory = serde_json::from_str("\"english\"").unwrap();
        assert_eq!(parsed, LanguageCategory::English);
        assert_eq!(LanguageCategory::Kannada.to_string(), "kannada");
    }
}
