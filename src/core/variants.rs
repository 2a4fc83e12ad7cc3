// src/core/variants.rs
//! Lookup keys derived from a canonical name.

use crate::config::FoldMode;
use crate::core::normalize::{fold, name_key};
use crate::core::types::Category;
use std::collections::BTreeSet;

/// Vietnamese number words for 1..=30, folded per mode on use.
fn number_word(n: u32) -> Option<&'static str> {
    let word = match n {
        1 => "một",
        2 => "hai",
        3 => "ba",
        4 => "bốn",
        5 => "năm",
        6 => "sáu",
        7 => "bảy",
        8 => "tám",
        9 => "chín",
        10 => "mười",
        11 => "mười một",
        12 => "mười hai",
        13 => "mười ba",
        14 => "mười bốn",
        15 => "mười lăm",
        16 => "mười sáu",
        17 => "mười bảy",
        18 => "mười tám",
        19 => "mười chín",
        20 => "hai mươi",
        21 => "hai mươi mốt",
        22 => "hai mươi hai",
        23 => "hai mươi ba",
        24 => "hai mươi bốn",
        25 => "hai mươi lăm",
        26 => "hai mươi sáu",
        27 => "hai mươi bảy",
        28 => "hai mươi tám",
        29 => "hai mươi chín",
        30 => "ba mươi",
        _ => return None,
    };
    Some(word)
}

/// Every variant key for `name` in `category`, sorted and de-duplicated.
/// The base key (`name_key`) is always included.
pub fn generate(name: &str, category: Category, mode: FoldMode) -> Vec<String> {
    let base = name_key(name, mode);
    let mut out = BTreeSet::new();
    if base.is_empty() {
        return Vec::new();
    }
    out.insert(base.clone());

    if base.chars().all(|c| c.is_ascii_digit()) {
        numeric_variants(&base, category, mode, &mut out);
    } else {
        text_variants(&base, &mut out);
    }
    out.into_iter().collect()
}

fn numeric_variants(digits: &str, category: Category, mode: FoldMode, out: &mut BTreeSet<String>) {
    let unpadded = digits.trim_start_matches('0');
    let unpadded = if unpadded.is_empty() { "0" } else { unpadded };
    let value: Option<u32> = unpadded.parse().ok();

    let mut bodies = vec![unpadded.to_string()];
    if let Some(n) = value.filter(|n| *n < 10) {
        bodies.push(format!("0{n}"));
    }
    if let Some(word) = value.and_then(number_word) {
        let word = fold(word, mode);
        bodies.push(word.replace(' ', ""));
        bodies.push(word);
    }

    for body in &bodies {
        out.insert(body.clone());
        for prefix in category.numeric_prefixes() {
            let prefix = fold(prefix, mode);
            out.insert(format!("{prefix}{body}"));
            out.insert(format!("{prefix} {body}"));
        }
    }
}

/// Glued and abbreviated spellings of a multi-word name, e.g. for
/// "ho chi minh": "hochiminh", "hcm", "hchiminh", "ho chiminh", ...
fn text_variants(base: &str, out: &mut BTreeSet<String>) {
    let words: Vec<&str> = base.split(' ').collect();
    let n = words.len();
    if n < 2 {
        return;
    }
    out.insert(words.concat());
    if n > 4 {
        return;
    }

    fn initial(word: &str) -> String {
        word.chars().next().map(String::from).unwrap_or_default()
    }

    if n >= 3 {
        out.insert(words.iter().map(|w| initial(w)).collect());
    }
    // One word shortened to its initial, the rest glued.
    for i in 0..n.min(3) {
        let glued: String = words
            .iter()
            .enumerate()
            .map(|(j, w)| if i == j { initial(w) } else { (*w).to_string() })
            .collect();
        out.insert(glued);
    }
    // Single space at each inner boundary, the rest glued.
    if n >= 3 {
        for split in 1..n {
            out.insert(format!("{} {}", words[..split].concat(), words[split..].concat()));
        }
    }
}
