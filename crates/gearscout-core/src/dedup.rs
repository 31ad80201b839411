use std::collections::HashSet;
use std::hash::Hash;

/// Pages at least this similar to their predecessor are treated as repeats.
pub const DUPLICATE_THRESHOLD: f64 = 0.99;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`; 0 when both sets are empty.
pub fn jaccard_similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Detects a site serving the same results page again.
///
/// Some shops clamp out-of-range page numbers to the last real page
/// instead of answering 404; without this check pagination would never
/// end on them. One detector belongs to one site scrape.
#[derive(Debug, Clone)]
pub struct DuplicatePageDetector {
    previous: Option<HashSet<String>>,
    threshold: f64,
    last_similarity: f64,
}

impl DuplicatePageDetector {
    pub fn new() -> Self {
        Self::with_threshold(DUPLICATE_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            previous: None,
            threshold,
            last_similarity: 0.0,
        }
    }

    /// Compare `current` with the previous page and remember it as the new
    /// previous page. The first page is never a duplicate.
    pub fn is_duplicate(&mut self, current: HashSet<String>) -> bool {
        self.last_similarity = match &self.previous {
            Some(previous) => jaccard_similarity(previous, &current),
            None => 0.0,
        };
        let duplicate = self.previous.is_some() && self.last_similarity >= self.threshold;
        self.previous = Some(current);
        duplicate
    }

    /// Similarity computed by the last [`is_duplicate`](Self::is_duplicate) call.
    pub fn last_similarity(&self) -> f64 {
        self.last_similarity
    }
}

impl Default for DuplicatePageDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn similarity_of_empty_sets_is_zero() {
        assert_eq!(jaccard_similarity(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn similarity_of_identical_sets_is_one() {
        let s = set(&["a", "b", "c"]);
        assert_eq!(jaccard_similarity(&s, &s), 1.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let cases = [
            (set(&["a", "b"]), set(&["b", "c", "d"])),
            (set(&["a"]), set(&[])),
            (set(&["x", "y", "z"]), set(&["x", "y", "z", "w"])),
        ];
        for (a, b) in &cases {
            assert_eq!(jaccard_similarity(a, b), jaccard_similarity(b, a));
        }
        assert_eq!(jaccard_similarity(&cases[0].0, &cases[0].1), 0.25);
    }

    #[test]
    fn first_page_is_never_duplicate() {
        let mut detector = DuplicatePageDetector::new();
        assert!(!detector.is_duplicate(set(&["a", "b"])));
    }

    #[test]
    fn repeated_page_is_duplicate() {
        let mut detector = DuplicatePageDetector::new();
        assert!(!detector.is_duplicate(set(&["a", "b"])));
        assert!(detector.is_duplicate(set(&["a", "b"])));
        assert_eq!(detector.last_similarity(), 1.0);
    }

    #[test]
    fn different_pages_are_not_duplicates() {
        let mut detector = DuplicatePageDetector::new();
        assert!(!detector.is_duplicate(set(&["a", "b"])));
        assert!(!detector.is_duplicate(set(&["c", "d"])));
        // Compared against the page right before, not the first one.
        assert!(!detector.is_duplicate(set(&["a", "b"])));
    }

    #[test]
    fn two_empty_pages_are_not_duplicates() {
        let mut detector = DuplicatePageDetector::new();
        assert!(!detector.is_duplicate(set(&[])));
        assert!(!detector.is_duplicate(set(&[])));
    }

    #[test]
    fn near_identical_large_page_counts_as_duplicate() {
        let page: Vec<String> = (0..200).map(|i| format!("item {i}")).collect();
        let mut next = page.clone();
        next[0] = "item changed".into();

        let mut detector = DuplicatePageDetector::with_threshold(0.98);
        assert!(!detector.is_duplicate(page.into_iter().collect()));
        assert!(detector.is_duplicate(next.into_iter().collect()));
    }
}
