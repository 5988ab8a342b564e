//! Tuning knobs for index construction and query defaults.

use serde::Serialize;

/// Number of recommendations returned when the caller does not ask for a count.
pub const DEFAULT_TOP_N: usize = 5;

/// Upper bound applied by hosts to caller supplied counts.
pub const MAX_TOP_N: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenizerConfig {
    /// Tokens with fewer characters are dropped.
    pub min_token_len: usize,
    /// Apply Snowball English stemming to every token.
    pub stem: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { min_token_len: 2, stem: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfMode {
    /// idf = ln((1 + N) / (1 + df)) + 1
    #[default]
    Smoothed,
    /// idf = ln(N / df)
    Plain,
}

impl IdfMode {
    pub fn idf(self, num_docs: usize, df: usize) -> f32 {
        let n = num_docs as f32;
        let df = df as f32;
        match self {
            IdfMode::Smoothed => ((1.0 + n) / (1.0 + df)).ln() + 1.0,
            IdfMode::Plain => (n / df.max(1.0)).ln(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexConfig {
    pub tokenizer: TokenizerConfig,
    pub idf: IdfMode,
    /// Use 1 + ln(tf) instead of the raw term count.
    pub sublinear_tf: bool,
}

impl IndexConfig {
    pub fn tf(&self, count: u32) -> f32 {
        if count == 0 {
            0.0
        } else if self.sublinear_tf {
            1.0 + (count as f32).ln()
        } else {
            count as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothed_idf_favours_rare_terms() {
        let rare = IdfMode::Smoothed.idf(10, 1);
        let common = IdfMode::Smoothed.idf(10, 10);
        assert!(rare > common);
        assert!((common - 1.0).abs() < 1e-6);
    }

    #[test]
    fn plain_idf_is_zero_for_ubiquitous_terms() {
        assert_eq!(IdfMode::Plain.idf(4, 4), 0.0);
    }

    #[test]
    fn sublinear_tf_dampens_counts() {
        let config = IndexConfig { sublinear_tf: true, ..IndexConfig::default() };
        assert_eq!(config.tf(1), 1.0);
        assert!(config.tf(10) < 10.0);
        assert_eq!(IndexConfig::default().tf(10), 10.0);
    }
}
