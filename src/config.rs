//! Run configuration
//!
//! Everything a run needs is carried in one `Config` value, including the
//! corpus location. The binary fills it from the command line.

use crate::corpus::DEFAULT_EXTENSIONS;
use crate::matcher::{EZAFE_LEMMA, MatchScope, Matcher};
use std::path::PathBuf;

/// Default CSV report path
pub const DEFAULT_OUTPUT: &str = "ezafe_constructions_output.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the annotated corpus files
    pub corpus_root: PathBuf,
    /// CSV report path
    pub output: PathBuf,
    /// Lemma that marks an ezafe particle
    pub particle_lemma: String,
    /// Scope of id lookups
    pub scope: MatchScope,
    /// File name suffixes to pick up from `corpus_root`
    pub extensions: Vec<String>,
    /// Worker threads; 1 processes files on the calling thread
    pub jobs: usize,
    /// Abort on the first unreadable file instead of skipping it
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            particle_lemma: EZAFE_LEMMA.to_string(),
            scope: MatchScope::default(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            jobs: 1,
            strict: false,
        }
    }
}

impl Config {
    /// Default configuration for the given corpus directory
    pub fn new(corpus_root: impl Into<PathBuf>) -> Self {
        Self {
            corpus_root: corpus_root.into(),
            ..Self::default()
        }
    }

    /// Matcher for this configuration
    pub fn matcher(&self) -> Matcher {
        Matcher::new(self.particle_lemma.clone()).with_scope(self.scope)
    }

    /// True when files should be processed on worker threads
    pub fn parallel(&self) -> bool {
        self.jobs > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new("corpus");

        assert_eq!(config.corpus_root, PathBuf::from("corpus"));
        assert_eq!(config.output, PathBuf::from("ezafe_constructions_output.csv"));
        assert_eq!(config.particle_lemma, "ī");
        assert_eq!(config.scope, MatchScope::Sentence);
        assert_eq!(config.extensions, vec![".conllu", ".conllu.gz"]);
        assert!(!config.parallel());
        assert!(!config.strict);
    }

    #[test]
    fn test_matcher_from_config() {
        let config = Config {
            particle_lemma: "i".to_string(),
            scope: MatchScope::Document,
            ..Config::default()
        };
        let matcher = config.matcher();

        assert_eq!(matcher.particle_lemma(), "i");
        assert_eq!(matcher.scope(), MatchScope::Document);
    }
}
