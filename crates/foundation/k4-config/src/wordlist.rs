//! Dictionary file candidate source

use crate::DictionarySettings;
use k4_core::{Alphabet, Error as CoreError, KeywordSource};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One word per line. Words are trimmed and upper-cased; only words of
/// acceptable length made entirely of alphabet symbols are kept.
#[derive(Debug, Clone)]
pub struct WordlistFile {
    path: PathBuf,
    alphabet: Alphabet,
    min_len: usize,
    max_len: usize,
}

impl WordlistFile {
    pub fn new(path: impl Into<PathBuf>, alphabet: Alphabet) -> Self {
        let defaults = DictionarySettings::default();
        Self {
            path: path.into(),
            alphabet,
            min_len: defaults.min_len,
            max_len: defaults.max_len,
        }
    }

    /// From the `dictionary` section; `None` when no path is configured.
    pub fn from_settings(settings: &DictionarySettings, alphabet: Alphabet) -> Option<Self> {
        settings.path.as_ref().map(|path| {
            Self::new(path, alphabet).with_lengths(settings.min_len, settings.max_len)
        })
    }

    pub fn with_lengths(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn accept(&self, word: &str) -> bool {
        let len = word.chars().count();
        (self.min_len..=self.max_len).contains(&len) && self.alphabet.covers(word)
    }
}

impl KeywordSource for WordlistFile {
    fn label(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn keywords(&self) -> k4_core::Result<Vec<String>> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            CoreError::CandidateSourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        let text = String::from_utf8_lossy(&bytes);

        let mut seen = HashSet::new();
        let mut words = Vec::new();
        let mut lines = 0usize;
        for line in text.lines() {
            lines += 1;
            let word = line.trim().to_uppercase();
            if self.accept(&word) && seen.insert(word.clone()) {
                words.push(word);
            }
        }

        debug!(
            path = %self.path.display(),
            lines,
            kept = words.len(),
            "Loaded wordlist"
        );
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn wordlist(lines: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(lines.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_filters_by_length_and_alphabet() {
        let file = wordlist("kryptos\n  berlin \nab\nthe\nDON'T\nextraordinarily\nincomprehensibility\nclock\n");
        let source = WordlistFile::new(file.path(), Alphabet::standard());
        assert_eq!(
            source.keywords().unwrap(),
            vec!["KRYPTOS", "BERLIN", "THE", "EXTRAORDINARILY", "CLOCK"]
        );
    }

    #[test]
    fn test_custom_lengths_and_dedup() {
        let file = wordlist("Shadow\nSHADOW\nab\nlight\r\n");
        let source = WordlistFile::new(file.path(), Alphabet::standard()).with_lengths(2, 5);
        assert_eq!(source.keywords().unwrap(), vec!["AB", "LIGHT"]);
    }

    #[test]
    fn test_respects_custom_alphabet() {
        let file = wordlist("ABBA\nCAB\nDAB\n");
        let alphabet = Alphabet::new("ABC".chars()).unwrap();
        let source = WordlistFile::new(file.path(), alphabet);
        assert_eq!(source.keywords().unwrap(), vec!["ABBA", "CAB"]);
    }

    #[test]
    fn test_missing_file_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = WordlistFile::new(dir.path().join("words.txt"), Alphabet::standard());
        assert_eq!(source.label(), "words.txt");
        assert!(matches!(source.keywords(), Err(CoreError::CandidateSourceUnavailable(_))));
    }

    #[test]
    fn test_from_settings() {
        let mut settings = DictionarySettings::default();
        assert!(WordlistFile::from_settings(&settings, Alphabet::standard()).is_none());
        settings.path = Some(PathBuf::from("/tmp/words"));
        settings.max_len = 8;
        let source = WordlistFile::from_settings(&settings, Alphabet::standard()).unwrap();
        assert_eq!(source.path(), Path::new("/tmp/words"));
        assert_eq!(source.max_len, 8);
    }
}
