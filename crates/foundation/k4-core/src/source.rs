//! Candidate keyword sources
//!
//! The search only needs an ordered list of keywords; where they come from
//! (command-line keys, a wordlist file, a fixture) is behind this trait.

use crate::Result;
use std::collections::HashSet;

/// Supplies candidate keywords for one run.
pub trait KeywordSource: Send + Sync {
    /// Short name for logs and reports.
    fn label(&self) -> String;

    /// All keywords, in the order they should be tried.
    ///
    /// A source that cannot be read returns
    /// [`Error::CandidateSourceUnavailable`](crate::Error::CandidateSourceUnavailable).
    fn keywords(&self) -> Result<Vec<String>>;
}

/// Fixed in-memory keyword list.
#[derive(Debug, Clone, Default)]
pub struct StaticKeywords {
    label: String,
    words: Vec<String>,
}

impl StaticKeywords {
    /// Words are trimmed and upper-cased; blank entries are dropped.
    pub fn new<I, S>(label: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_uppercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { label: label.into(), words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl KeywordSource for StaticKeywords {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn keywords(&self) -> Result<Vec<String>> {
        Ok(self.words.clone())
    }
}

/// Sources tried in sequence; a keyword seen earlier is not repeated.
#[derive(Default)]
pub struct ChainedSource {
    sources: Vec<Box<dyn KeywordSource>>,
}

impl ChainedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl KeywordSource + 'static) -> Self {
        self.push(Box::new(source));
        self
    }

    pub fn push(&mut self, source: Box<dyn KeywordSource>) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl KeywordSource for ChainedSource {
    fn label(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.label())
            .collect::<Vec<_>>()
            .join(" + ")
    }

    fn keywords(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for source in &self.sources {
            for word in source.keywords()? {
                if seen.insert(word.clone()) {
                    out.push(word);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct Missing;

    impl KeywordSource for Missing {
        fn label(&self) -> String {
            "missing".into()
        }

        fn keywords(&self) -> Result<Vec<String>> {
            Err(Error::CandidateSourceUnavailable("no such file".into()))
        }
    }

    #[test]
    fn test_static_normalizes() {
        let s = StaticKeywords::new("keys", [" palimpsest ", "", "Kryptos"]);
        assert_eq!(s.keywords().unwrap(), vec!["PALIMPSEST", "KRYPTOS"]);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_chain_priority_and_dedup() {
        let chain = ChainedSource::new()
            .with(StaticKeywords::new("priority", ["BERLIN", "CLOCK"]))
            .with(StaticKeywords::new("dictionary", ["ABACUS", "clock", "BERLIN", "ZEBRA"]));
        assert_eq!(chain.label(), "priority + dictionary");
        assert_eq!(
            chain.keywords().unwrap(),
            vec!["BERLIN", "CLOCK", "ABACUS", "ZEBRA"]
        );
    }

    #[test]
    fn test_chain_propagates_unavailable() {
        let chain = ChainedSource::new()
            .with(StaticKeywords::new("priority", ["BERLIN"]))
            .with(Missing);
        assert!(matches!(chain.keywords(), Err(Error::CandidateSourceUnavailable(_))));
    }
}
