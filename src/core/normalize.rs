// src/core/normalize.rs
use crate::config::FoldMode;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const GRAVE: char = '\u{0300}';
const ACUTE: char = '\u{0301}';
const TILDE: char = '\u{0303}';
const HOOK_ABOVE: char = '\u{0309}';
const DOT_BELOW: char = '\u{0323}';

/// Turns raw address text into the form the lexicon indexes are keyed by.
/// Implementations must be pure: the same input always yields the same output.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, raw: &str) -> String;
}

/// Folds accents away according to `mode`. Case is preserved.
pub fn fold(text: &str, mode: FoldMode) -> String {
    match mode {
        FoldMode::StripAll => text
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .map(|c| match c {
                'đ' => 'd',
                'Đ' => 'D',
                other => other,
            })
            .collect(),
        FoldMode::KeepLetters => text
            .nfd()
            .filter(|c| !matches!(*c, GRAVE | ACUTE | TILDE | HOOK_ABOVE | DOT_BELOW))
            .nfc()
            .collect(),
    }
}

/// Lowercases, folds and splits at anything that is not part of a word.
pub fn tokens(text: &str, mode: FoldMode) -> Vec<String> {
    let folded = fold(&text.to_lowercase(), mode);
    folded
        .split(|c: char| !(c.is_alphanumeric() || is_combining_mark(c)))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Canonical key of a reference name: folded tokens joined by single spaces.
pub fn name_key(name: &str, mode: FoldMode) -> String {
    tokens(name, mode).join(" ")
}

/// The default normalizer for Vietnamese addresses.
pub struct VietnameseNormalizer {
    mode: FoldMode,
}

impl VietnameseNormalizer {
    pub fn new(mode: FoldMode) -> Self {
        Self { mode }
    }

    /// Expands one standalone abbreviation token.
    fn expand(&self, token: &str) -> Option<&'static str> {
        match token {
            "tp" => Some("thành phố"),
            "tx" => Some("thị xã"),
            "tt" => Some("thị trấn"),
            "q" => Some("quận"),
            "h" => Some("huyện"),
            "t" => Some("tỉnh"),
            "p" | "f" => Some("phường"),
            "x" => Some("xã"),
            "kp" => Some("khu phố"),
            "kdc" => Some("khu dân cư"),
            "kcn" => Some("khu công nghiệp"),
            "kdt" => Some("khu đô thị"),
            _ => None,
        }
    }
}

impl Default for VietnameseNormalizer {
    fn default() -> Self {
        Self::new(FoldMode::StripAll)
    }
}

impl Normalizer for VietnameseNormalizer {
    fn normalize(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for token in tokens(raw, self.mode) {
            if !out.is_empty() {
                out.push(' ');
            }
            match self.expand(&token) {
                Some(expansion) => out.push_str(&fold(expansion, self.mode)),
                None => out.push_str(&token),
            }
        }
        out
    }
}
