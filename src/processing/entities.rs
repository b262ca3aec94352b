//! Rule-based detection of organization and product names

use regex::Regex;

/// Short capitalized words that are almost never a technology or organization
const ACRONYM_STOP_LIST: &[&str] = &[
    "CV", "USA", "US", "UK", "EU", "PHD", "BSC", "MSC", "BS", "MS", "BA", "MBA", "GPA", "CEO",
    "CTO", "HR", "AM", "PM", "OK", "TBD", "FAQ", "ETC", "II", "III", "IV", "NA", "ID",
    // resume section headers
    "SKILLS", "WORK", "AWARDS", "HONORS", "ABOUT", "GOALS", "TOOLS", "ROLES", "LINKS", "NAME",
    "EMAIL", "PHONE", "INTRO", "CAREER", "CERTS", "COURSE", "JOBS", "TITLE", "DATES",
    "HOBBY", "OTHER", "MISC",
    // shouted prose
    "AND", "THE", "FOR", "WITH", "TO", "OF", "IN", "AT", "ON", "OR", "MY", "BY", "AN", "AS",
];

/// Finds product/organization-like tokens: `PostgreSQL`, `AWS`, `Node.js`
pub struct EntityRecognizer {
    camel_case: Regex,
    acronym: Regex,
    dotted_product: Regex,
}

impl Default for EntityRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRecognizer {
    pub fn new() -> Self {
        Self {
            camel_case: Regex::new(r"^[A-Za-z][a-z0-9]*[A-Z][A-Za-z0-9]*$")
                .expect("Invalid camel case regex"),
            acronym: Regex::new(r"^[A-Z]{2,6}$").expect("Invalid acronym regex"),
            dotted_product: Regex::new(r"(?i)^[a-z][a-z0-9]*\.(js|net|io|ai)$")
                .expect("Invalid dotted product regex"),
        }
    }

    /// Lowercased entity names in order of first appearance, without duplicates
    pub fn recognize(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for raw in text.split_whitespace() {
            let token = raw.trim_matches(|c: char| !(c.is_alphanumeric() || c == '+' || c == '#'));
            if token.is_empty() || !self.is_entity(token) {
                continue;
            }
            let name = token.to_lowercase();
            if !found.contains(&name) {
                found.push(name);
            }
        }
        found
    }

    fn is_entity(&self, token: &str) -> bool {
        if ACRONYM_STOP_LIST.contains(&token.to_uppercase().as_str()) {
            return false;
        }
        if self.acronym.is_match(token) {
            return true;
        }
        let has_lower = token.chars().any(|c| c.is_ascii_lowercase());
        (has_lower && self.camel_case.is_match(token)) || self.dotted_product.is_match(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_products() {
        let recognizer = EntityRecognizer::new();
        let entities =
            recognizer.recognize("Migrated PostgreSQL to AWS, built APIs in Node.js and GitHub Actions.");

        assert!(entities.contains(&"postgresql".to_string()));
        assert!(entities.contains(&"aws".to_string()));
        assert!(entities.contains(&"node.js".to_string()));
        assert!(entities.contains(&"github".to_string()));
        assert!(entities.contains(&"apis".to_string()));
    }

    #[test]
    fn test_ignores_plain_words_and_stop_acronyms() {
        let recognizer = EntityRecognizer::new();
        let entities = recognizer.recognize("I use Java daily. See my CV, PhD from the USA.");
        assert!(entities.is_empty(), "unexpected entities: {:?}", entities);
    }

    #[test]
    fn test_ignores_section_headers() {
        let recognizer = EntityRecognizer::new();
        let entities = recognizer.recognize("SKILLS\nSQL and GCP\nWORK\nAnalyst\nAWARDS\nBest paper");
        assert_eq!(entities, vec!["sql".to_string(), "gcp".to_string()]);
    }

    #[test]
    fn test_deduplicates() {
        let recognizer = EntityRecognizer::new();
        let entities = recognizer.recognize("TensorFlow, tensorflow and TensorFlow again");
        assert_eq!(entities, vec!["tensorflow".to_string()]);
    }
}
