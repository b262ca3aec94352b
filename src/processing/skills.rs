//! Dictionary-driven skill extraction and requirement classification

use crate::config::SkillsConfig;
use crate::error::{Result, ResumeRankerError};
use crate::processing::entities::EntityRecognizer;
use crate::processing::text_processor::split_after_terminators;
use aho_corasick::{AhoCorasick, MatchKind};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Normalized (lowercase) skill names
pub type SkillSet = BTreeSet<String>;

const DEFAULT_SKILLS: &[&str] = &[
    "python", "pandas", "numpy", "scikit-learn", "sklearn", "tensorflow", "pytorch", "sql",
    "postgres", "mysql", "aws", "azure", "gcp", "docker", "kubernetes", "streamlit", "opencv",
    "nlp", "bert", "transformer", "flask", "django", "html", "css", "javascript", "matplotlib",
    "seaborn", "plotly", "hadoop", "spark", "jupyter", "git", "rest api",
];

const REQUIRED_CUES: &[&str] = &["must", "required", "mandatory", "essential"];

const PREFERRED_CUES: &[&str] = &[
    "prefer",
    "nice to have",
    "nice-to-have",
    "desired",
    "optional",
    "bonus",
];

/// Skill dictionary as stored on disk: `{"skills": [...], "categories": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillDictionary {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

impl SkillDictionary {
    pub fn builtin() -> Self {
        Self {
            skills: DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect(),
            categories: BTreeMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResumeRankerError::DictionaryLoad(format!("{}: {}", path.display(), e))
        })?;
        let dictionary: SkillDictionary = serde_json::from_str(&content).map_err(|e| {
            ResumeRankerError::DictionaryLoad(format!("{}: {}", path.display(), e))
        })?;
        if dictionary.canonical_names().is_empty() {
            return Err(ResumeRankerError::DictionaryLoad(format!(
                "{}: no skills listed",
                path.display()
            )));
        }
        Ok(dictionary)
    }

    /// Load from `path`, falling back to the built-in list with a warning
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::load(path) {
            Ok(dictionary) => dictionary,
            Err(e) => {
                warn!("{}; using built-in skill list", e);
                Self::builtin()
            }
        }
    }

    /// Every listed name, lowercased and deduplicated
    pub fn canonical_names(&self) -> Vec<String> {
        self.skills
            .iter()
            .chain(self.categories.values().flatten())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// A dictionary skill found in text, with its byte span in the lowercased text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillOccurrence {
    pub skill: String,
    pub start: usize,
    pub end: usize,
}

/// Matcher compiled once from the dictionary
pub struct SkillMatcher {
    automaton: AhoCorasick,
    names: Vec<String>,
}

impl SkillMatcher {
    pub fn new(dictionary: &SkillDictionary) -> Result<Self> {
        let names = dictionary.canonical_names();
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(&names)
            .map_err(|e| {
                ResumeRankerError::ModelInitialization(format!(
                    "Failed to build skill matcher: {}",
                    e
                ))
            })?;
        Ok(Self { automaton, names })
    }

    pub fn skill_count(&self) -> usize {
        self.names.len()
    }

    /// Whole-word occurrences; longer names claim their span before shorter ones.
    /// Text is lowercased first so non-ASCII names fold too.
    pub fn find_all(&self, text: &str) -> Vec<SkillOccurrence> {
        let folded = text.to_lowercase();
        let text = folded.as_str();
        let mut candidates: Vec<SkillOccurrence> = self
            .automaton
            .find_overlapping_iter(text)
            .filter(|m| is_bounded(text, m.start(), m.end()))
            .map(|m| SkillOccurrence {
                skill: self.names[m.pattern().as_usize()].clone(),
                start: m.start(),
                end: m.end(),
            })
            .collect();

        candidates.sort_by(|a, b| {
            (b.end - b.start)
                .cmp(&(a.end - a.start))
                .then(a.start.cmp(&b.start))
        });

        let mut accepted: Vec<SkillOccurrence> = Vec::new();
        for candidate in candidates {
            let overlaps = accepted
                .iter()
                .any(|a| candidate.start < a.end && a.start < candidate.end);
            if !overlaps {
                accepted.push(candidate);
            }
        }
        accepted.sort_by_key(|o| o.start);
        accepted
    }

    pub fn find_skills(&self, text: &str) -> SkillSet {
        self.find_all(text).into_iter().map(|o| o.skill).collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text.get(..start).and_then(|s| s.chars().next_back());
    let after = text.get(end..).and_then(|s| s.chars().next());
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Skills a reference text asks for, bucketed by how strongly
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSkills {
    pub required: SkillSet,
    pub preferred: SkillSet,
    pub all: SkillSet,
}

pub struct SkillExtractor {
    matcher: SkillMatcher,
    entities: Option<EntityRecognizer>,
    entity_scan_chars: usize,
}

impl SkillExtractor {
    pub fn new(dictionary: &SkillDictionary) -> Result<Self> {
        Ok(Self {
            matcher: SkillMatcher::new(dictionary)?,
            entities: Some(EntityRecognizer::new()),
            entity_scan_chars: 5000,
        })
    }

    pub fn from_config(config: &SkillsConfig) -> Result<Self> {
        let dictionary = SkillDictionary::load_or_default(config.dictionary_path.as_deref());
        let mut extractor = Self::new(&dictionary)?;
        if !config.detect_entities {
            extractor.entities = None;
        }
        extractor.entity_scan_chars = config.entity_scan_chars;
        debug!(
            "Skill extractor ready with {} dictionary skills",
            extractor.skill_count()
        );
        Ok(extractor)
    }

    pub fn without_entities(mut self) -> Self {
        self.entities = None;
        self
    }

    pub fn skill_count(&self) -> usize {
        self.matcher.skill_count()
    }

    /// Dictionary skills plus recognized organization/product names
    pub fn extract(&self, text: &str) -> SkillSet {
        let mut skills = self.matcher.find_skills(text);
        if let Some(recognizer) = &self.entities {
            let scanned = match text.char_indices().nth(self.entity_scan_chars) {
                Some((idx, _)) => &text[..idx],
                None => text,
            };
            skills.extend(recognizer.recognize(scanned));
        }
        skills
    }

    /// Bucket the reference's dictionary skills by requirement cues, clause by clause
    pub fn classify_reference(&self, text: &str) -> ReferenceSkills {
        let mut required = SkillSet::new();
        let mut preferred = SkillSet::new();

        for line in text.lines() {
            for clause in split_after_terminators(line) {
                let lowered = clause.to_lowercase();
                if REQUIRED_CUES.iter().any(|cue| lowered.contains(cue)) {
                    required.extend(self.matcher.find_skills(&clause));
                } else if PREFERRED_CUES.iter().any(|cue| lowered.contains(cue)) {
                    preferred.extend(self.matcher.find_skills(&clause));
                }
            }
        }

        ReferenceSkills {
            required,
            preferred,
            all: self.matcher.find_skills(text),
        }
    }
}
