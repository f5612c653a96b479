//! # Collation
//!
//! Locale-aware ordering for name sorts, close to what a browser's
//! `localeCompare` gives for Portuguese text:
//! - primary: base letters, accents and case ignored (`"avião" < "bola"`)
//! - secondary: unaccented before accented (`"e" < "é"`)
//! - tertiary: lowercase before uppercase (`"a" < "A"`)
use std::cmp::Ordering;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    primary: String,
    secondary: String,
    tertiary: Vec<bool>,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        let decomposed: String = text.nfd().collect();

        let primary = decomposed
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect();

        let secondary = decomposed.chars().flat_map(char::to_lowercase).collect();

        let tertiary = decomposed
            .chars()
            .filter(|c| !is_combining_mark(*c))
            .map(char::is_uppercase)
            .collect();

        Self {
            primary,
            secondary,
            tertiary,
        }
    }
}

pub fn compare(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}
