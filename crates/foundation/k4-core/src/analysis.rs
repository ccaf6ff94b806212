//! Cryptanalysis Tools
//!
//! Index of Coincidence, deviation from English letter frequencies,
//! bigrams/trigrams

use crate::alphabet::single;
use std::collections::HashMap;

/// Standard English letter frequencies in percent, A through Z.
pub const ENGLISH_FREQUENCIES: [f64; 26] = [
    8.2, 1.5, 2.8, 4.3, 12.7, 2.2, 2.0, 6.1, 7.0, 0.2, 0.8, 4.0, 2.4, 6.7, 7.5, 1.9, 0.1, 6.0,
    6.3, 9.1, 2.8, 1.0, 2.4, 0.2, 2.0, 0.1,
];

/// Mean per-letter deviation below which text reads as English.
pub const DEFAULT_FREQUENCY_THRESHOLD: f64 = 2.0;

/// English text ≈ 0.067, random ≈ 0.038
pub const ENGLISH_IC: f64 = 0.0667;
pub const RANDOM_IC: f64 = 1.0 / 26.0;

#[inline]
fn upper(c: char) -> char {
    single(c.to_uppercase()).unwrap_or(c)
}

fn coincidence(counts: impl Iterator<Item = usize>, total: usize) -> f64 {
    if total < 2 {
        return 0.0;
    }
    let sum: usize = counts.map(|n| n * n.saturating_sub(1)).sum();
    sum as f64 / (total * (total - 1)) as f64
}

/// `Σ nᵢ(nᵢ-1) / (N(N-1))` over the alphabetic characters of `text`,
/// case-folded. Zero for fewer than two letters.
pub fn index_of_coincidence(text: &str) -> f64 {
    let mut ascii = [0usize; 26];
    let mut other: HashMap<char, usize> = HashMap::new();
    let mut total = 0;

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        let c = upper(c);
        if c.is_ascii_uppercase() {
            ascii[(c as u8 - b'A') as usize] += 1;
        } else {
            *other.entry(c).or_insert(0) += 1;
        }
        total += 1;
    }

    coincidence(ascii.iter().copied().chain(other.into_values()), total)
}

/// Mean absolute difference, in percentage points, between the observed
/// A–Z frequencies of `text` and [`ENGLISH_FREQUENCIES`].
///
/// `None` when `text` has no Latin letters.
pub fn frequency_deviation(text: &str) -> Option<f64> {
    let mut counts = [0usize; 26];
    let mut total = 0;
    for c in text.chars() {
        let c = c.to_ascii_uppercase();
        if c.is_ascii_uppercase() {
            counts[(c as u8 - b'A') as usize] += 1;
            total += 1;
        }
    }
    if total == 0 {
        return None;
    }
    Some(deviation(&counts, total))
}

fn deviation(counts: &[usize; 26], total: usize) -> f64 {
    let sum: f64 = counts
        .iter()
        .zip(ENGLISH_FREQUENCIES.iter())
        .map(|(&n, &expected)| (n as f64 / total as f64 * 100.0 - expected).abs())
        .sum();
    sum / 26.0
}

/// True when `text` deviates from English by less than `threshold`.
pub fn is_close_match(text: &str, threshold: f64) -> bool {
    frequency_deviation(text).is_some_and(|d| d < threshold)
}

/// Frequency analysis for cryptanalysis
#[derive(Debug, Clone, Default)]
pub struct FrequencyAnalysis {
    pub frequencies: HashMap<char, usize>,
    pub total_chars: usize,
    pub bigrams: HashMap<String, usize>,
    pub trigrams: HashMap<String, usize>,
}

impl FrequencyAnalysis {
    /// Analyze text for frequency patterns
    pub fn analyze(text: &str) -> Self {
        let mut frequencies: HashMap<char, usize> = HashMap::new();
        let mut bigrams: HashMap<String, usize> = HashMap::new();
        let mut trigrams: HashMap<String, usize> = HashMap::new();

        let chars: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).map(upper).collect();

        for &c in &chars {
            *frequencies.entry(c).or_insert(0) += 1;
        }

        for window in chars.windows(2) {
            *bigrams.entry(window.iter().collect()).or_insert(0) += 1;
        }

        for window in chars.windows(3) {
            *trigrams.entry(window.iter().collect()).or_insert(0) += 1;
        }

        Self {
            frequencies,
            total_chars: chars.len(),
            bigrams,
            trigrams,
        }
    }

    /// Get frequency as percentage
    pub fn frequency_percent(&self, c: char) -> f64 {
        let count = self.frequencies.get(&upper(c)).copied().unwrap_or(0);
        if self.total_chars > 0 {
            (count as f64 / self.total_chars as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn index_of_coincidence(&self) -> f64 {
        coincidence(self.frequencies.values().copied(), self.total_chars)
    }

    /// Deviation from English over A–Z; `None` without Latin letters.
    pub fn english_deviation(&self) -> Option<f64> {
        let mut counts = [0usize; 26];
        for (i, slot) in counts.iter_mut().enumerate() {
            *slot = self.frequencies.get(&((b'A' + i as u8) as char)).copied().unwrap_or(0);
        }
        let total: usize = counts.iter().sum();
        (total > 0).then(|| deviation(&counts, total))
    }

    /// Chi-squared test against English frequencies
    pub fn chi_squared_english(&self) -> f64 {
        if self.total_chars == 0 {
            return 0.0;
        }
        let mut chi_sq = 0.0;
        for (i, &expected) in ENGLISH_FREQUENCIES.iter().enumerate() {
            let c = (b'A' + i as u8) as char;
            let observed = self.frequency_percent(c) / 100.0;
            let expected = expected / 100.0;
            chi_sq += (observed - expected).powi(2) / expected;
        }
        chi_sq
    }

    /// Get top N most frequent characters
    pub fn top_chars(&self, n: usize) -> Vec<(char, usize)> {
        top(&self.frequencies, n)
    }

    /// Get top N bigrams
    pub fn top_bigrams(&self, n: usize) -> Vec<(String, usize)> {
        top(&self.bigrams, n)
    }

    /// Get top N trigrams
    pub fn top_trigrams(&self, n: usize) -> Vec<(String, usize)> {
        top(&self.trigrams, n)
    }

    /// Render as ASCII frequency chart
    pub fn render_ascii(&self) -> String {
        let mut lines = Vec::new();
        lines.push("FREQUENCY ANALYSIS".to_string());
        lines.push("═".repeat(40));

        let max_count = self.frequencies.values().copied().max().unwrap_or(1).max(1);
        let scale = 30.0 / max_count as f64;

        for (i, &english) in ENGLISH_FREQUENCIES.iter().enumerate() {
            let c = (b'A' + i as u8) as char;
            let count = self.frequencies.get(&c).copied().unwrap_or(0);
            let bar = "█".repeat((count as f64 * scale) as usize);
            lines.push(format!(
                "{}: {:5.2}% ({:4.1}) |{}",
                c,
                self.frequency_percent(c),
                english,
                bar
            ));
        }

        let grams = |v: Vec<(String, usize)>| {
            v.into_iter()
                .map(|(g, n)| format!("{g}:{n}"))
                .collect::<Vec<_>>()
                .join(" ")
        };

        lines.push(String::new());
        lines.push(format!("Letters: {}", self.total_chars));
        lines.push(format!("Index of Coincidence: {:.4}", self.index_of_coincidence()));
        match self.english_deviation() {
            Some(d) => lines.push(format!("English deviation: {:.4}", d)),
            None => lines.push("English deviation: n/a".to_string()),
        }
        lines.push(format!("Chi-squared (English): {:.4}", self.chi_squared_english()));
        lines.push(format!("Top bigrams: {}", grams(self.top_bigrams(10))));
        lines.push(format!("Top trigrams: {}", grams(self.top_trigrams(10))));

        lines.join("\n")
    }
}

/// Highest counts first; ties broken by key so output is stable.
fn top<K: Ord + Clone>(counts: &HashMap<K, usize>, n: usize) -> Vec<(K, usize)> {
    let mut sorted: Vec<_> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    sorted.into_iter().take(n).map(|(k, &n)| (k.clone(), n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const DICKENS: &str = "It was the best of times, it was the worst of times, it was the age of \
        wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch of \
        incredulity, it was the season of Light, it was the season of Darkness, it was the \
        spring of hope, it was the winter of despair, we had everything before us, we had \
        nothing before us, we were all going direct to Heaven, we were all going direct the \
        other way";

    fn random_letters(seed: u64, len: usize) -> String {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| (b'A' + rng.gen_range(0..26u8)) as char).collect()
    }

    #[test]
    fn test_english_table_sums_to_about_100() {
        let total: f64 = ENGLISH_FREQUENCIES.iter().sum();
        assert!((total - 100.3).abs() < 1e-9);
    }

    #[test]
    fn test_ic_english_passage() {
        let ic = index_of_coincidence(DICKENS);
        assert!((ic - 0.07384).abs() < 1e-4, "IC was {ic}");
    }

    #[test]
    fn test_ic_random_text() {
        let ic = index_of_coincidence(&random_letters(7, 5000));
        assert!(ic > 0.036 && ic < 0.041, "IC was {ic}");
    }

    #[test]
    fn test_ic_small_inputs() {
        assert_eq!(index_of_coincidence(""), 0.0);
        assert_eq!(index_of_coincidence("A"), 0.0);
        assert_eq!(index_of_coincidence("AB"), 0.0);
        assert_eq!(index_of_coincidence("aaaa"), 1.0);
        assert!((index_of_coincidence("A a B b") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_deviation_english_vs_random() {
        let english = frequency_deviation(DICKENS).unwrap();
        assert!((english - 1.25564).abs() < 1e-4, "deviation was {english}");
        assert!(is_close_match(DICKENS, DEFAULT_FREQUENCY_THRESHOLD));

        let random = random_letters(11, 5000);
        assert!(!is_close_match(&random, DEFAULT_FREQUENCY_THRESHOLD));
    }

    #[test]
    fn test_deviation_degenerate() {
        assert_eq!(frequency_deviation("1234 !?"), None);
        assert!(!is_close_match("", DEFAULT_FREQUENCY_THRESHOLD));
        let d = frequency_deviation("AAAA").unwrap();
        assert!((d - 7.073077).abs() < 1e-5);
    }

    #[test]
    fn test_frequency_analysis() {
        let analysis = FrequencyAnalysis::analyze("HELLO WORLD");
        assert_eq!(analysis.total_chars, 10);
        assert_eq!(analysis.frequencies.get(&'L').copied(), Some(3));
        assert!((analysis.frequency_percent('l') - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_struct_agrees_with_free_functions() {
        let analysis = FrequencyAnalysis::analyze(DICKENS);
        assert!((analysis.index_of_coincidence() - index_of_coincidence(DICKENS)).abs() < 1e-12);
        assert_eq!(analysis.english_deviation(), frequency_deviation(DICKENS));
    }

    #[test]
    fn test_top_ngrams() {
        let analysis = FrequencyAnalysis::analyze("the then there");
        assert_eq!(analysis.top_trigrams(1), vec![("THE".to_string(), 3)]);
        assert_eq!(
            analysis.top_bigrams(2),
            vec![("HE".to_string(), 3), ("TH".to_string(), 3)]
        );
        let top = FrequencyAnalysis::analyze("AAABBC").top_chars(2);
        assert_eq!(top, vec![('A', 3), ('B', 2)]);
    }

    #[test]
    fn test_render_mentions_statistics() {
        let report = FrequencyAnalysis::analyze(DICKENS).render_ascii();
        assert!(report.starts_with("FREQUENCY ANALYSIS"));
        assert!(report.contains("Index of Coincidence: 0.0738"));
        assert!(report.contains("Top trigrams:"));
    }
}
