//! Shared category grouping utilities
//!
//! Statistical models over categorical predictors need enough observations per
//! level. [`collapse_rare_categories`] replaces every value that occurs fewer
//! than a minimum number of times with a single [`OTHER_LABEL`] bucket.

use std::collections::BTreeMap;

use tracing::info;

/// Label used for collapsed rare categories.
pub const OTHER_LABEL: &str = "Other";

/// Counts how many times each present value occurs.
#[must_use]
pub fn value_counts<'a, I>(values: I) -> BTreeMap<&'a str, usize>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts = BTreeMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
}

/// Replaces values occurring fewer than `min_count` times with [`OTHER_LABEL`].
///
/// Missing values are neither counted nor replaced. Returns the number of
/// distinct values that were collapsed.
///
/// # Examples
///
/// ```
/// use filmcut_analysis::grouping::collapse_rare_categories;
///
/// let mut values = vec![
///     Some("hindi".to_owned()),
///     Some("hindi".to_owned()),
///     Some("tulu".to_owned()),
///     None,
/// ];
/// let collapsed = collapse_rare_categories(&mut values, 2, "language");
/// assert_eq!(collapsed, 1);
/// assert_eq!(values[2].as_deref(), Some("Other"));
/// assert_eq!(values[3], None);
/// ```
pub fn collapse_rare_categories(
    values: &mut [Option<String>],
    min_count: usize,
    field: &str,
) -> usize {
    let rare = value_counts(values.iter().map(Option::as_deref))
        .into_iter()
        .filter(|(_, count)| *count < min_count)
        .map(|(value, _)| value.to_owned())
        .collect::<Vec<_>>();

    if rare.is_empty() {
        return 0;
    }

    info!(
        "Grouping {} rare categories in '{field}' into '{OTHER_LABEL}'",
        rare.len()
    );
    for value in values.iter_mut().flatten() {
        if rare.binary_search(value).is_ok() {
            OTHER_LABEL.clone_into(value);
        }
    }
    rare.len()
}

/// Splits a string on `|` and `;`, trimming parts and dropping empty ones.
///
/// # Examples
///
/// ```
/// use filmcut_analysis::grouping::split_delimited;
///
/// assert_eq!(split_delimited("Drama| Action;;Crime "), ["Drama", "Action", "Crime"]);
/// assert!(split_delimited("  ").is_empty());
/// ```
#[must_use]
pub fn split_delimited(value: &str) -> Vec<&str> {
    value
        .split(['|', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}
