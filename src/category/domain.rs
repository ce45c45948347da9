//! Core category domain types.

use std::fmt::Display;

use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, auth::UserID, database_id::DatabaseId};

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// A validated, trimmed, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    /// The lowercase form of the name used to compare names ignoring case.
    pub fn key(&self) -> String {
        category_name_key(&self.0)
    }
}

/// Fold `name` into the form category names are compared by.
///
/// Uses Unicode lowercasing, so "CAFFÈ" and "caffè" share a key.
pub fn category_name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The icon shown next to a category: exactly one emoji.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Hash)]
#[serde(transparent)]
pub struct CategoryEmoji(String);

impl CategoryEmoji {
    /// The emoji used when none is given.
    pub const DEFAULT: &'static str = "📁";

    /// Validate `emoji`, which must be a single grapheme cluster that is not
    /// plain ASCII text.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmoji] otherwise.
    pub fn new(emoji: &str) -> Result<Self, Error> {
        let emoji = emoji.trim();
        let mut graphemes = emoji.graphemes(true);

        match (graphemes.next(), graphemes.next()) {
            (Some(grapheme), None) if !grapheme.is_ascii() => Ok(Self(emoji.to_owned())),
            _ => Err(Error::InvalidEmoji(emoji.to_owned())),
        }
    }

    /// Validate `emoji` if given, otherwise use [CategoryEmoji::DEFAULT].
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidEmoji] if `emoji` is given but invalid.
    pub fn new_or_default(emoji: Option<&str>) -> Result<Self, Error> {
        match emoji {
            Some(emoji) => Self::new(emoji),
            None => Ok(Self::default()),
        }
    }

    /// Create an emoji without validation, e.g. for values read from the database.
    pub fn new_unchecked(emoji: &str) -> Self {
        Self(emoji.to_owned())
    }
}

impl Default for CategoryEmoji {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl AsRef<str> for CategoryEmoji {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A category for expenses and income, e.g., 'Groceries', 'Eating Out', 'Wages'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub user_id: UserID,
    pub name: CategoryName,
    pub emoji: CategoryEmoji,
}

#[cfg(test)]
mod category_name_tests {
    use crate::{Error, category::CategoryName};

    #[test]
    fn new_fails_on_empty_string() {
        assert_eq!(CategoryName::new(""), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        assert_eq!(CategoryName::new("\n\t \r"), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn new_trims_name() {
        assert_eq!(CategoryName::new("  Food ").unwrap().as_ref(), "Food");
    }
}
