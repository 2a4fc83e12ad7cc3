// src/config.rs
use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PROVINCE_FILE: &str = "list_province.txt";
pub const DISTRICT_FILE: &str = "list_district.txt";
pub const WARD_FILE: &str = "list_ward.txt";
pub const HIERARCHY_FILE: &str = "hierarchy.json";

/// How accents are folded, both for reference names and for input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoldMode {
    /// Drop every diacritic; "Đồng Nai" becomes "dong nai".
    #[default]
    StripAll,
    /// Drop tone marks only; "Đồng Nai" becomes "đông nai".
    KeepLetters,
}

/// Tunable constants of the resolution pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Longest word n-gram, in tokens.
    pub max_word_ngram: usize,
    /// Tokens longer than this many characters also get char n-grams.
    pub char_ngram_token_threshold: usize,
    pub char_ngram_min: usize,
    pub char_ngram_max: usize,
    /// Edit distance ceiling (inclusive) for fuzzy matches.
    pub max_edit_distance: usize,
    /// Queries shorter than this are never fuzzy matched.
    pub fuzzy_min_len: usize,
    pub fuzzy_max_results: usize,
    /// Similarity bar for queries containing a digit.
    pub numeric_similarity: f64,
    /// Similarity bar for purely alphabetic queries.
    pub text_similarity: f64,
    /// Added to the score multiplier once per exact candidate.
    pub exact_match_bonus: f64,
    pub fold: FoldMode,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_word_ngram: 5,
            char_ngram_token_threshold: 10,
            char_ngram_min: 5,
            char_ngram_max: 20,
            max_edit_distance: 2,
            fuzzy_min_len: 4,
            fuzzy_max_results: 3,
            numeric_similarity: 0.85,
            text_similarity: 0.75,
            exact_match_bonus: 0.3,
            fold: FoldMode::StripAll,
        }
    }
}

impl ResolverConfig {
    /// Reads a JSON config; absent fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| ResolveError::io(path, e))?;
        let config: ResolverConfig =
            serde_json::from_str(&raw).map_err(|e| ResolveError::json(path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_word_ngram == 0 {
            return Err(ResolveError::InvalidConfig("max_word_ngram must be at least 1".into()));
        }
        if self.char_ngram_min == 0 || self.char_ngram_min > self.char_ngram_max {
            return Err(ResolveError::InvalidConfig(format!(
                "char n-gram bounds {}..={} are inverted or empty",
                self.char_ngram_min, self.char_ngram_max
            )));
        }
        for (name, value) in [
            ("numeric_similarity", self.numeric_similarity),
            ("text_similarity", self.text_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ResolveError::InvalidConfig(format!("{name} = {value} is outside [0, 1]")));
            }
        }
        if self.exact_match_bonus < 0.0 {
            return Err(ResolveError::InvalidConfig("exact_match_bonus must not be negative".into()));
        }
        Ok(())
    }

    pub fn similarity_threshold(&self, query: &str) -> f64 {
        if query.chars().any(|c| c.is_ascii_digit()) {
            self.numeric_similarity
        } else {
            self.text_similarity
        }
    }
}

/// Locations of the four reference artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencePaths {
    pub provinces: PathBuf,
    pub districts: PathBuf,
    pub wards: PathBuf,
    pub hierarchy: PathBuf,
}

impl ReferencePaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            provinces: dir.join(PROVINCE_FILE),
            districts: dir.join(DISTRICT_FILE),
            wards: dir.join(WARD_FILE),
            hierarchy: dir.join(HIERARCHY_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_edit_distance": 1, "fold": "keep_letters" }}"#).unwrap();

        let config = ResolverConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_edit_distance, 1);
        assert_eq!(config.fold, FoldMode::KeepLetters);
        assert_eq!(config.max_word_ngram, 5);
        assert_eq!(config.exact_match_bonus, 0.3);
    }

    #[test]
    fn inverted_char_bounds_are_rejected() {
        let config = ResolverConfig { char_ngram_min: 9, char_ngram_max: 4, ..Default::default() };
        assert!(matches!(config.validate(), Err(ResolveError::InvalidConfig(_))));
    }

    #[test]
    fn digit_queries_need_higher_similarity() {
        let config = ResolverConfig::default();
        assert_eq!(config.similarity_threshold("phuong 12"), 0.85);
        assert_eq!(config.similarity_threshold("trang dai"), 0.75);
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let err = ResolverConfig::from_file(Path::new("/nonexistent/resolver.json")).unwrap_err();
        assert!(matches!(err, ResolveError::Io { .. }));
    }
}
