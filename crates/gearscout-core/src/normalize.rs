//! Text normalization shared by extraction and the search entry point.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::AppError;
use crate::models::Price;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Parse a price from free text: the first run of digits, as whole UAH.
///
/// Text without digits (or with a digit run too long for `u64`) is kept
/// verbatim as [`Price::Raw`].
pub fn parse_price(text: &str) -> Price {
    DIGITS
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .map(Price::Amount)
        .unwrap_or_else(|| Price::Raw(text.trim().to_string()))
}

/// Make a product name safe for the HTML-ish report surface: double quotes
/// become single quotes and surrounding whitespace is trimmed.
pub fn normalize_name(name: &str) -> String {
    name.trim().replace('"', "'")
}

/// Lowercase word set of a text. Words are maximal runs of alphanumeric
/// characters, so punctuation never glues two words together.
pub fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// The words of a search query, matched against product names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerms {
    words: HashSet<String>,
}

impl QueryTerms {
    pub fn new(query: &str) -> Self {
        Self {
            words: word_set(query),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True when every query word appears as a whole word of `name`,
    /// in any order. A query without words matches nothing.
    pub fn matches(&self, name: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let name_words = word_set(name);
        self.words.iter().all(|w| name_words.contains(w))
    }
}

/// Clean up a phrase typed by a user before it becomes a query.
///
/// Collapses whitespace, lowercases, and treats `_` and `-` as word
/// separators (`сумка_скидання` searches for `сумка скидання`).
pub fn normalize_phrase(phrase: &str) -> Result<String, AppError> {
    let normalized = phrase
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if normalized.chars().count() < 2 {
        return Err(AppError::InvalidQuery(format!(
            "'{}' is too short to search for",
            phrase.trim()
        )));
    }
    if word_set(&normalized).is_empty() {
        return Err(AppError::InvalidQuery(format!(
            "'{}' has no words to search for",
            phrase.trim()
        )));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_takes_first_digit_run() {
        assert_eq!(parse_price("1250 грн."), Price::Amount(1250));
        assert_eq!(parse_price("  від 990 до 1200"), Price::Amount(990));
        assert_eq!(parse_price("1 250 грн."), Price::Amount(1));
    }

    #[test]
    fn price_without_digits_stays_raw() {
        assert_eq!(
            parse_price(" Ціну уточнюйте "),
            Price::Raw("Ціну уточнюйте".into())
        );
        assert_eq!(parse_price(""), Price::Raw(String::new()));
    }

    #[test]
    fn name_quotes_are_normalized() {
        assert_eq!(
            normalize_name(r#" Ремінь "Cobra" 45мм "#),
            "Ремінь 'Cobra' 45мм"
        );
    }

    #[test]
    fn query_matching_is_order_independent() {
        let terms = QueryTerms::new("tactical belt");
        assert!(terms.matches("belt tactical olive"));
        assert!(terms.matches("Belt, TACTICAL (olive)"));
        assert!(!terms.matches("tactical"));
    }

    #[test]
    fn query_matching_is_whole_word_only() {
        let terms = QueryTerms::new("belt");
        assert!(!terms.matches("belts tactical"));
        assert!(!terms.matches("beltpack"));
    }

    #[test]
    fn query_without_words_matches_nothing() {
        let terms = QueryTerms::new("!!");
        assert!(!terms.matches("Random gloves"));
        assert!(!terms.matches("!!"));
        assert!(!QueryTerms::new("").matches(""));
    }

    #[test]
    fn query_matching_handles_cyrillic() {
        let terms = QueryTerms::new("підсумок скидання");
        assert!(terms.matches("Підсумок для скидання магазинів"));
        assert!(!terms.matches("Підсумок під магазин"));
    }

    #[test]
    fn phrase_normalization() {
        assert_eq!(normalize_phrase("  Сумка_Скидання ").unwrap(), "сумка скидання");
        assert_eq!(normalize_phrase("mag-pouch\t\tAK").unwrap(), "mag pouch ak");
        assert!(matches!(
            normalize_phrase(" a "),
            Err(AppError::InvalidQuery(_))
        ));
        assert!(normalize_phrase("   ").is_err());
    }

    #[test]
    fn punctuation_only_phrase_is_rejected() {
        assert!(matches!(
            normalize_phrase("!!"),
            Err(AppError::InvalidQuery(_))
        ));
        assert!(matches!(
            normalize_phrase(" -- ?? "),
            Err(AppError::InvalidQuery(_))
        ));
        assert_eq!(normalize_phrase("ak-47").unwrap(), "ak 47");
    }
}
