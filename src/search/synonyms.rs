//! Query expansion through synonyms and common misspellings.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Source of alternative terms for a query term
pub trait SynonymProvider: Send + Sync {
    /// Alternatives for `term` (lowercase); empty when none are known
    fn synonyms(&self, term: &str) -> Vec<String>;
}

static BUILTIN_SYNONYMS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();

    // Misspellings
    m.insert("brger", &["burger", "burgers"]);
    m.insert("buger", &["burger", "burgers"]);
    m.insert("burguer", &["burger", "burgers"]);
    m.insert("piza", &["pizza"]);
    m.insert("pizzza", &["pizza"]);
    m.insert("chinse", &["chinese"]);
    m.insert("chineese", &["chinese"]);
    m.insert("japanse", &["japanese"]);
    m.insert("japaneese", &["japanese"]);
    m.insert("korea", &["korean"]);
    m.insert("koreen", &["korean"]);
    m.insert("itallian", &["italian"]);
    m.insert("italain", &["italian"]);
    m.insert("filipno", &["filipino"]);
    m.insert("chiken", &["chicken"]);
    m.insert("chikcen", &["chicken"]);
    m.insert("cofee", &["coffee"]);
    m.insert("coffe", &["coffee"]);
    m.insert("desert", &["dessert", "desserts"]);
    m.insert("deserts", &["desserts", "dessert"]);
    m.insert("sushi", &["japanese", "maki"]);
    m.insert("shusi", &["sushi", "japanese"]);
    m.insert("noodle", &["noodles", "ramen"]);

    // Cuisine and dish synonyms
    m.insert("burger", &["burgers", "hamburger", "fast food"]);
    m.insert("pizza", &["italian", "pizzeria"]);
    m.insert("pasta", &["italian", "spaghetti"]);
    m.insert("chinese", &["dim sum", "noodles"]);
    m.insert("japanese", &["sushi", "ramen"]);
    m.insert("ramen", &["japanese", "noodles"]);
    m.insert("korean", &["samgyupsal", "bbq"]);
    m.insert("filipino", &["pinoy", "lutong bahay"]);
    m.insert("pinoy", &["filipino"]);
    m.insert("chicken", &["fried chicken", "grill"]);
    m.insert("coffee", &["cafe", "espresso"]);
    m.insert("cafe", &["coffee"]);
    m.insert("milk tea", &["boba", "bubble tea"]);
    m.insert("boba", &["milk tea", "bubble tea"]);
    m.insert("dessert", &["desserts", "cakes", "ice cream"]);
    m.insert("healthy", &["salad", "vegan"]);
    m.insert("vegan", &["vegetarian", "plant based"]);
    m.insert("fast food", &["burgers", "fries"]);

    m
});

/// The built-in synonym and misspelling table
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSynonymTable;

impl SynonymProvider for StaticSynonymTable {
    fn synonyms(&self, term: &str) -> Vec<String> {
        BUILTIN_SYNONYMS
            .get(term)
            .map(|terms| terms.iter().map(|t| t.to_string()).collect())
            .unwrap_or_default()
    }
}

/// Synonym table held in memory, e.g. loaded from configuration
#[derive(Debug, Clone, Default)]
pub struct MapSynonymProvider {
    entries: HashMap<String, Vec<String>>,
}

impl MapSynonymProvider {
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Self { entries }
    }
}

impl SynonymProvider for MapSynonymProvider {
    fn synonyms(&self, term: &str) -> Vec<String> {
        self.entries.get(term).cloned().unwrap_or_default()
    }
}

/// Expand a query into search terms.
///
/// The normalized query comes first, followed by synonyms of the whole query
/// and then of each token. Duplicates are dropped and at most `max_terms`
/// terms are returned.
pub fn expand_query(provider: &dyn SynonymProvider, query: &str, max_terms: usize) -> Vec<String> {
    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    if normalized.is_empty() || max_terms == 0 {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut terms = Vec::new();
    let mut push = |term: String, terms: &mut Vec<String>| {
        let term = term.to_lowercase();
        if !term.is_empty() && seen.insert(term.clone()) {
            terms.push(term);
        }
    };

    push(normalized.clone(), &mut terms);
    for synonym in provider.synonyms(&normalized) {
        push(synonym, &mut terms);
    }
    for token in normalized.split(' ') {
        for synonym in provider.synonyms(token) {
            push(synonym, &mut terms);
        }
    }

    terms.truncate(max_terms);
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_misspellings_are_corrected() {
        let table = StaticSynonymTable;
        assert_eq!(table.synonyms("brger")[0], "burger");
        assert_eq!(table.synonyms("chinse"), vec!["chinese".to_string()]);
        assert!(table.synonyms("zzzz").is_empty());
    }

    #[test]
    fn test_original_term_comes_first() {
        let terms = expand_query(&StaticSynonymTable, "  Brger ", 5);
        assert_eq!(terms[0], "brger");
        assert!(terms.contains(&"burger".to_string()));
    }

    #[test]
    fn test_multi_word_query_expands_tokens() {
        let terms = expand_query(&StaticSynonymTable, "cheap piza", 5);
        assert_eq!(terms, vec!["cheap piza".to_string(), "pizza".to_string()]);

        let terms = expand_query(&StaticSynonymTable, "milk tea", 5);
        assert_eq!(terms[0], "milk tea");
        assert!(terms.contains(&"boba".to_string()));
    }

    #[test]
    fn test_expansion_is_deduplicated_and_capped() {
        let mut entries = HashMap::new();
        entries.insert("Taco".to_string(), vec!["mexican".to_string(), "MEXICAN".to_string(), "burrito".to_string()]);
        entries.insert("mexican".to_string(), vec!["taco".to_string()]);
        let provider = MapSynonymProvider::new(entries);

        let terms = expand_query(&provider, "taco", 10);
        assert_eq!(terms, vec!["taco", "mexican", "burrito"]);

        let capped = expand_query(&provider, "taco", 2);
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn test_blank_query_expands_to_nothing() {
        assert!(expand_query(&StaticSynonymTable, "   ", 5).is_empty());
    }
}
