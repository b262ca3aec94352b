//! Text processing and normalization

use regex::Regex;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

pub struct TextProcessor {
    stop_words: HashSet<&'static str>,
    email_regex: Regex,
    phone_regex: Regex,
    blank_line_indent_regex: Regex,
    inline_space_regex: Regex,
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextProcessor {
    pub fn new() -> Self {
        let email_regex = Regex::new(r"[\w.-]+@[\w.-]+").expect("Invalid email regex");

        let phone_regex =
            Regex::new(r"(\+?\d{1,3}[\s-]?)?(\d{10}|\d{5}[\s-]\d{5}|\d{3}[\s-]\d{3}[\s-]\d{4})")
                .expect("Invalid phone regex");

        let blank_line_indent_regex = Regex::new(r"\n\s+").expect("Invalid newline regex");
        let inline_space_regex = Regex::new(r"[ \t]+").expect("Invalid whitespace regex");

        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
            email_regex,
            phone_regex,
            blank_line_indent_regex,
            inline_space_regex,
        }
    }

    /// Normalize extracted text: unify line endings, drop indentation and blank lines, collapse spaces
    pub fn clean_text(&self, text: &str) -> String {
        let unified = text.replace('\r', "\n");
        let no_indent = self.blank_line_indent_regex.replace_all(&unified, "\n");
        let collapsed = self.inline_space_regex.replace_all(&no_indent, " ");
        collapsed.trim().to_string()
    }

    /// Lowercased word tokens of at least two characters, stop words removed
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.unicode_words()
            .map(|word| word.to_lowercase())
            .filter(|word| word.chars().count() > 1)
            .filter(|word| word.chars().any(|c| c.is_alphanumeric()))
            .filter(|word| !self.stop_words.contains(word.as_str()))
            .collect()
    }

    /// Mask email addresses and phone numbers for display
    pub fn redact_pii(&self, text: &str) -> String {
        let masked = self.phone_regex.replace_all(text, "[PHONE]");
        self.email_regex.replace_all(&masked, "[EMAIL]").to_string()
    }
}

/// Split text into sentences.
///
/// Breaks on whitespace that follows `.`, `!` or `?`. When that yields at most one
/// fragment the text is split on line breaks instead, and failing that on bare periods.
/// Fragments are trimmed and empty ones dropped. Text that leaves no fragment is one
/// sentence on its own; only blank input yields no sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut parts = split_after_terminators(text);
    if parts.len() <= 1 {
        parts = non_empty_trimmed(text.split(['\r', '\n']));
    }
    if parts.len() <= 1 {
        parts = non_empty_trimmed(text.split('.'));
    }
    if parts.is_empty() {
        parts.push(text.to_string());
    }
    parts
}

/// Split on runs of whitespace preceded by sentence-ending punctuation
pub fn split_after_terminators(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            parts.push(&text[start..idx]);
            let mut next_start = idx + c.len_utf8();
            while let Some(&(j, w)) = chars.peek() {
                if !w.is_whitespace() {
                    break;
                }
                next_start = j + w.len_utf8();
                chars.next();
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(c);
    }
    parts.push(&text[start..]);

    non_empty_trimmed(parts.into_iter())
}

fn non_empty_trimmed<'a>(parts: impl Iterator<Item = &'a str>) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Truncate to `max_chars` characters, appending `...` when anything was cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

/// Common English stop words excluded from lexical terms
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
    "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below",
    "beside", "besides", "between", "beyond", "both", "but", "by", "can", "cannot",
    "could", "did", "do", "does", "doing", "done", "down", "due", "during", "each", "eg",
    "either", "else", "elsewhere", "enough", "etc", "even", "ever", "every", "everyone",
    "everything", "everywhere", "except", "few", "for", "former", "formerly", "from",
    "further", "had", "has", "hasnt", "have", "having", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his", "how",
    "however", "i", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself",
    "just", "latter", "least", "less", "ltd", "made", "many", "may", "me", "meanwhile",
    "might", "mine", "more", "moreover", "most", "mostly", "much", "must", "my", "myself",
    "namely", "neither", "never", "nevertheless", "next", "no", "nobody", "none", "nor",
    "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "only",
    "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
    "over", "own", "per", "perhaps", "please", "rather", "re", "same", "seem", "seemed",
    "seeming", "seems", "several", "she", "should", "since", "so", "some", "somehow",
    "someone", "something", "sometime", "sometimes", "somewhere", "still", "such",
    "than", "that", "the", "their", "theirs", "them", "themselves", "then", "thence",
    "there", "thereafter", "thereby", "therefore", "therein", "these", "they", "this",
    "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
    "well", "were", "what", "whatever", "when", "whence", "whenever", "where",
    "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever", "whether",
    "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why", "will",
    "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
    "yourselves",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization() {
        let processor = TextProcessor::new();
        let tokens = processor.tokenize("Rust programming is awesome! I use it daily.");

        assert!(tokens.contains(&"rust".to_string()));
        assert!(tokens.contains(&"programming".to_string()));
        assert!(tokens.contains(&"awesome".to_string()));
        assert!(tokens.contains(&"daily".to_string()));

        assert!(!tokens.contains(&"is".to_string()));
        assert!(!tokens.contains(&"i".to_string()));
        assert!(!tokens.contains(&"it".to_string()));
    }

    #[test]
    fn test_tokenize_blank_text() {
        let processor = TextProcessor::new();
        assert!(processor.tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn test_sentence_split_on_terminators() {
        let sentences = split_sentences("Built ETL jobs. Led a team!  Shipped ML models? Yes");
        assert_eq!(
            sentences,
            vec!["Built ETL jobs.", "Led a team!", "Shipped ML models?", "Yes"]
        );
    }

    #[test]
    fn test_sentence_split_falls_back_to_lines() {
        let sentences = split_sentences("Python developer\nSQL analyst\n\nDocker user");
        assert_eq!(sentences, vec!["Python developer", "SQL analyst", "Docker user"]);
    }

    #[test]
    fn test_sentence_split_falls_back_to_bare_periods() {
        let sentences = split_sentences("python.sql.docker");
        assert_eq!(sentences, vec!["python", "sql", "docker"]);
    }

    #[test]
    fn test_sentence_split_single_fragment() {
        assert_eq!(split_sentences("  just one line  "), vec!["just one line"]);
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_punctuation_only_text_is_one_sentence() {
        assert_eq!(split_sentences("..."), vec!["..."]);
        assert_eq!(split_sentences(" !?. "), vec!["!?."]);
    }

    #[test]
    fn test_clean_text() {
        let processor = TextProcessor::new();
        let cleaned = processor.clean_text("  Jane   Doe\r\n    Engineer\t\tat  Acme  ");
        assert_eq!(cleaned, "Jane Doe\nEngineer at Acme");
    }

    #[test]
    fn test_pii_redaction() {
        let processor = TextProcessor::new();
        let text = "Contact jane.doe@example.com or 555-123-4567 or +91 9876543210";

        let redacted = processor.redact_pii(text);

        assert!(!redacted.contains("jane.doe@example.com"));
        assert!(!redacted.contains("555-123-4567"));
        assert!(!redacted.contains("9876543210"));
        assert!(redacted.contains("[EMAIL]"));
        assert!(redacted.contains("[PHONE]"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
    }
}
