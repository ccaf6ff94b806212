//! Gromark primers and running keys
//!
//! A five-digit primer seeds a lagged-Fibonacci digit chain:
//! `d[i] = (d[i-5] + d[i-4]) mod 10`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PRIMER_LEN: usize = 5;

/// Smallest and largest primers with exactly five digits and no leading zero.
pub const PRIMER_MIN: u32 = 10_000;
pub const PRIMER_MAX: u32 = 99_999;

/// Five-digit running-key seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Primer([u8; PRIMER_LEN]);

impl Primer {
    /// Primer from an integer in `10000..=99999`.
    pub fn new(value: u32) -> Result<Self> {
        if !(PRIMER_MIN..=PRIMER_MAX).contains(&value) {
            return Err(Error::InvalidPrimer(format!(
                "{value} is not a five-digit number"
            )));
        }
        Ok(Self::from_value(value))
    }

    fn from_value(value: u32) -> Self {
        Self([
            (value / 10_000 % 10) as u8,
            (value / 1_000 % 10) as u8,
            (value / 100 % 10) as u8,
            (value / 10 % 10) as u8,
            (value % 10) as u8,
        ])
    }

    pub fn digits(&self) -> [u8; PRIMER_LEN] {
        self.0
    }

    pub fn value(&self) -> u32 {
        self.0.iter().fold(0, |acc, &d| acc * 10 + d as u32)
    }
}

impl FromStr for Primer {
    type Err = Error;

    /// Exactly five ASCII digits; leading zeros are allowed here.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != PRIMER_LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPrimer(format!(
                "'{s}' is not exactly {PRIMER_LEN} decimal digits"
            )));
        }
        let mut digits = [0u8; PRIMER_LEN];
        for (d, b) in digits.iter_mut().zip(s.bytes()) {
            *d = b - b'0';
        }
        Ok(Self(digits))
    }
}

impl fmt::Display for Primer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in self.0 {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for Primer {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Primer> for String {
    fn from(primer: Primer) -> Self {
        primer.to_string()
    }
}

/// Inclusive range of integer primers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimerRange {
    start: u32,
    end: u32,
}

impl PrimerRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        Primer::new(start)?;
        Primer::new(end)?;
        if start > end {
            return Err(Error::InvalidPrimer(format!(
                "primer range {start}..={end} is empty"
            )));
        }
        Ok(Self { start, end })
    }

    /// Every five-digit primer, 10000 through 99999.
    pub fn full() -> Self {
        Self { start: PRIMER_MIN, end: PRIMER_MAX }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Always false; construction rejects empty ranges.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, primer: Primer) -> bool {
        (self.start..=self.end).contains(&primer.value())
    }

    pub fn iter(&self) -> impl Iterator<Item = Primer> {
        (self.start..=self.end).map(Primer::from_value)
    }

    /// Split into contiguous sub-ranges of at most `size` primers, in order.
    pub fn chunks(&self, size: usize) -> Vec<PrimerRange> {
        let size = size.max(1) as u32;
        let mut out = Vec::with_capacity(self.len().div_ceil(size as usize));
        let mut lo = self.start;
        loop {
            let hi = lo.saturating_add(size - 1).min(self.end);
            out.push(PrimerRange { start: lo, end: hi });
            if hi == self.end {
                break;
            }
            lo = hi + 1;
        }
        out
    }
}

impl Default for PrimerRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for PrimerRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Digit sequence generated from a primer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningKey {
    digits: Vec<u8>,
}

impl RunningKey {
    /// Running key of exactly `len` digits.
    ///
    /// For `len < 5` the first `len` primer digits are returned.
    pub fn generate(primer: Primer, len: usize) -> Self {
        let mut digits = Vec::with_capacity(len);
        Self::fill(primer, len, &mut digits);
        Self { digits }
    }

    /// Parse the primer and generate in one step.
    pub fn from_primer_str(primer: &str, len: usize) -> Result<Self> {
        Ok(Self::generate(primer.parse()?, len))
    }

    /// Regenerate into `buf`, reusing its allocation.
    pub fn fill(primer: Primer, len: usize, buf: &mut Vec<u8>) {
        buf.clear();
        buf.extend(primer.digits().iter().take(len));
        for i in PRIMER_LEN..len {
            let next = (buf[i - 5] + buf[i - 4]) % 10;
            buf.push(next);
        }
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }
}

impl fmt::Display for RunningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.digits {
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primer_parse() {
        let p: Primer = "32941".parse().unwrap();
        assert_eq!(p.digits(), [3, 2, 9, 4, 1]);
        assert_eq!(p.value(), 32941);
        assert_eq!(p.to_string(), "32941");

        let zero_led: Primer = "01234".parse().unwrap();
        assert_eq!(zero_led.value(), 1234);
        assert_eq!(zero_led.to_string(), "01234");
    }

    #[test]
    fn test_primer_rejects_malformed() {
        for bad in ["", "1234", "123456", "12a45", "-1234", "１２３４５"] {
            assert!(matches!(bad.parse::<Primer>(), Err(Error::InvalidPrimer(_))), "{bad}");
        }
        assert!(Primer::new(9_999).is_err());
        assert!(Primer::new(100_000).is_err());
        assert_eq!(Primer::new(10_000).unwrap().to_string(), "10000");
    }

    #[test]
    fn test_known_running_key() {
        let key = RunningKey::from_primer_str("32941", 20).unwrap();
        assert_eq!(key.to_string(), "32941513566481202932");
    }

    #[test]
    fn test_recurrence_holds() {
        for value in [10_000, 12_345, 32_941, 99_999] {
            let primer = Primer::new(value).unwrap();
            let key = RunningKey::generate(primer, 97);
            let d = key.digits();
            assert_eq!(d.len(), 97);
            assert_eq!(&d[..5], &primer.digits());
            for i in 5..d.len() {
                assert_eq!(d[i], (d[i - 5] + d[i - 4]) % 10);
            }
        }
    }

    #[test]
    fn test_short_length_truncates() {
        let key = RunningKey::from_primer_str("32941", 3).unwrap();
        assert_eq!(key.digits(), &[3, 2, 9]);
        assert!(RunningKey::from_primer_str("32941", 0).unwrap().is_empty());
    }

    #[test]
    fn test_fill_reuses_buffer() {
        let primer: Primer = "32941".parse().unwrap();
        let mut buf = vec![7; 3];
        RunningKey::fill(primer, 10, &mut buf);
        assert_eq!(buf, RunningKey::generate(primer, 10).digits());
    }

    #[test]
    fn test_range_chunks_exhaustive() {
        let range = PrimerRange::new(10_000, 12_499).unwrap();
        let chunks = range.chunks(1000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], PrimerRange::new(10_000, 10_999).unwrap());
        assert_eq!(chunks[2], PrimerRange::new(12_000, 12_499).unwrap());
        let total: usize = chunks.iter().map(PrimerRange::len).sum();
        assert_eq!(total, range.len());
        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end() + 1, pair[1].start());
        }
    }

    #[test]
    fn test_full_range() {
        let full = PrimerRange::full();
        assert_eq!(full.len(), 90_000);
        assert_eq!(full.chunks(1000).len(), 90);
        assert_eq!(full.iter().next().unwrap().to_string(), "10000");
        assert!(PrimerRange::new(20_000, 10_000).is_err());
    }
}
