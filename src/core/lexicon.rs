// src/core/lexicon.rs
use crate::config::FoldMode;
use crate::core::trie::VariantTrie;
use crate::core::types::{Category, NameId, VariantId};
use crate::core::variants;
use crate::fuzzy::similarity::{cosine_similarity, edit_distance};
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// One normalized key and every canonical name that produces it.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct VariantEntry {
    key: String,
    /// Sorted, de-duplicated.
    names: Vec<NameId>,
}

/// A trie hit found while walking the input from a fixed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexiconHit {
    pub name_id: NameId,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyHit {
    pub name_id: NameId,
    pub similarity: f64,
    pub distance: usize,
}

/// Variant index for one administrative category.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LexiconIndex {
    category: Category,
    fold: FoldMode,
    names: Vec<String>,
    variants: Vec<VariantEntry>,
    trie: VariantTrie,
    /// Variant ids grouped by key length in characters, for fuzzy pre-filtering.
    buckets: BTreeMap<usize, Vec<VariantId>>,
}

impl LexiconIndex {
    pub fn empty(category: Category, fold: FoldMode) -> Self {
        Self {
            category,
            fold,
            names: Vec::new(),
            variants: Vec::new(),
            trie: VariantTrie::new(),
            buckets: BTreeMap::new(),
        }
    }

    /// Builds the index from canonical names. Blank lines are skipped and a
    /// name listed twice is stored once.
    pub fn build<I, S>(category: Category, names: I, fold: FoldMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::empty(category, fold);
        let mut seen: HashSet<String> = HashSet::new();

        for raw in names {
            let name = raw.as_ref().trim();
            if name.is_empty() || seen.contains(name) {
                continue;
            }
            let name_id = index.names.len();
            index.names.push(name.to_string());
            seen.insert(name.to_string());

            for key in variants::generate(name, category, fold) {
                index.insert_variant(&key, name_id);
            }
        }

        debug!(
            "built {} lexicon: {} names, {} variants, {} trie keys",
            category,
            index.names.len(),
            index.variants.len(),
            index.trie.len()
        );
        index
    }

    fn insert_variant(&mut self, key: &str, name_id: NameId) {
        let candidate_id = self.variants.len();
        let variant_id = self.trie.insert(key, candidate_id);
        if variant_id == candidate_id {
            self.variants.push(VariantEntry { key: key.to_string(), names: vec![name_id] });
            self.buckets.entry(key.chars().count()).or_default().push(variant_id);
        } else {
            let names = &mut self.variants[variant_id].names;
            if let Err(pos) = names.binary_search(&name_id) {
                names.insert(pos, name_id);
            }
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn fold(&self) -> FoldMode {
        self.fold
    }

    /// Number of canonical names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    pub fn name(&self, id: NameId) -> &str {
        &self.names[id]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Ids of every canonical name stored under exactly `text`.
    pub fn exact_ids(&self, text: &str) -> &[NameId] {
        match self.trie.get(text) {
            Some(variant) => &self.variants[variant].names,
            None => &[],
        }
    }

    pub fn exact(&self, text: &str) -> Vec<&str> {
        self.exact_ids(text).iter().map(|&id| self.name(id)).collect()
    }

    /// Every stored variant that starts at `position` in `text`, shortest
    /// first. Shorter matches are kept so the selector can weigh them
    /// against longer ones.
    pub fn longest_matches_from(&self, text: &[char], position: usize) -> Vec<LexiconHit> {
        self.trie
            .terminals_from(text, position)
            .into_iter()
            .flat_map(|(variant, end)| {
                self.variants[variant].names.iter().map(move |&name_id| LexiconHit {
                    name_id,
                    start: position,
                    end,
                })
            })
            .collect()
    }

    /// Approximate lookup. Keys whose length differs from `text` by more than
    /// `max_edit_distance` are never compared. Surviving keys must be within
    /// the edit distance ceiling and reach `min_similarity`. One hit per
    /// canonical name (its best key), ordered by similarity, then distance,
    /// then name id.
    pub fn fuzzy(&self, text: &str, max_edit_distance: usize, min_similarity: f64) -> Vec<FuzzyHit> {
        let len = text.chars().count();
        if len == 0 {
            return Vec::new();
        }
        let lo = len.saturating_sub(max_edit_distance);
        let hi = len + max_edit_distance;

        let mut best: BTreeMap<NameId, FuzzyHit> = BTreeMap::new();
        for variant_id in self.buckets.range(lo..=hi).flat_map(|(_, ids)| ids.iter().copied()) {
            let entry = &self.variants[variant_id];
            let distance = edit_distance(text, &entry.key);
            if distance > max_edit_distance {
                continue;
            }
            let similarity = cosine_similarity(text, &entry.key);
            if similarity < min_similarity {
                continue;
            }
            for &name_id in &entry.names {
                let hit = FuzzyHit { name_id, similarity, distance };
                best.entry(name_id)
                    .and_modify(|current| {
                        if rank(&hit, current) == Ordering::Less {
                            *current = hit;
                        }
                    })
                    .or_insert(hit);
            }
        }

        let mut hits: Vec<FuzzyHit> = best.into_values().collect();
        hits.sort_by(rank);
        hits
    }

    /// Canonical names having a variant that starts with `prefix`, in key
    /// order, each listed once.
    pub fn starts_with(&self, prefix: &str) -> Vec<&str> {
        let mut seen = vec![false; self.names.len()];
        let mut out = Vec::new();
        for variant in self.trie.collect_under(prefix) {
            for &id in &self.variants[variant].names {
                if !seen[id] {
                    seen[id] = true;
                    out.push(self.name(id));
                }
            }
        }
        out
    }
}

/// The three per-category indexes, consulted ward first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lexicons {
    pub ward: LexiconIndex,
    pub district: LexiconIndex,
    pub province: LexiconIndex,
}

impl Lexicons {
    pub fn empty(fold: FoldMode) -> Self {
        Self {
            ward: LexiconIndex::empty(Category::Ward, fold),
            district: LexiconIndex::empty(Category::District, fold),
            province: LexiconIndex::empty(Category::Province, fold),
        }
    }

    pub fn get(&self, category: Category) -> &LexiconIndex {
        match category {
            Category::Ward => &self.ward,
            Category::District => &self.district,
            Category::Province => &self.province,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &LexiconIndex> {
        Category::ALL.into_iter().map(move |c| self.get(c))
    }
}

fn rank(a: &FuzzyHit, b: &FuzzyHit) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then(a.distance.cmp(&b.distance))
        .then(a.name_id.cmp(&b.name_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::name_key;

    fn wards() -> LexiconIndex {
        LexiconIndex::build(
            Category::Ward,
            ["Trảng Dài", "Nghi Hương", "3", "Long Bình Tân", "", "Trảng Dài", "Phúc Xá"],
            FoldMode::StripAll,
        )
    }

    #[test]
    fn every_name_is_found_under_its_base_key() {
        let index = wards();
        for name in index.names() {
            let key = name_key(name, FoldMode::StripAll);
            assert_eq!(index.exact(&key), vec![name], "lookup of {key}");
        }
    }

    #[test]
    fn duplicates_and_blanks_are_dropped() {
        let index = wards();
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn numeric_ward_resolves_through_prefixed_key() {
        let index = wards();
        assert_eq!(index.exact("p3"), vec!["3"]);
        assert_eq!(index.exact("phuong 03"), vec!["3"]);
        assert_eq!(index.exact("ba"), vec!["3"]);
        assert!(index.exact("q3").is_empty());
    }

    #[test]
    fn colliding_variants_keep_every_name() {
        let index = LexiconIndex::build(Category::District, ["Hòa An", "Hoà An", "Hóa An"], FoldMode::StripAll);
        assert_eq!(index.exact("hoa an"), vec!["Hòa An", "Hoà An", "Hóa An"]);
    }

    #[test]
    fn longest_matches_from_keeps_shorter_hits() {
        let index = LexiconIndex::build(Category::Ward, ["Long", "Long Bình", "Long Bình Tân"], FoldMode::StripAll);
        let text: Vec<char> = "kp long binh tan".chars().collect();
        let hits = index.longest_matches_from(&text, 3);
        let spans: Vec<(&str, usize, usize)> =
            hits.iter().map(|h| (index.name(h.name_id), h.start, h.end)).collect();
        assert_eq!(
            spans,
            vec![("Long", 3, 7), ("Long Bình", 3, 12), ("Long Bình Tân", 3, 16)]
        );
    }

    #[test]
    fn fuzzy_tolerates_a_typo() {
        let index = wards();
        let hits = index.fuzzy("trang dsi", 2, 0.75);
        assert_eq!(hits.first().map(|h| index.name(h.name_id)), Some("Trảng Dài"));
        assert_eq!(hits[0].distance, 1);
    }

    #[test]
    fn fuzzy_respects_similarity_bar() {
        let index = wards();
        assert!(index.fuzzy("trang dsi", 2, 0.99).is_empty());
    }

    #[test]
    fn numeric_near_miss_needs_the_lower_bar() {
        let index = LexiconIndex::build(Category::Ward, ["12"], FoldMode::StripAll);
        // "p 19" against "p 12": one substitution, cosine exactly 0.75.
        assert!(index.fuzzy("p 19", 2, 0.85).is_empty());
        let hits = index.fuzzy("p 19", 2, 0.75);
        assert_eq!(hits.len(), 1);
        assert_eq!(index.name(hits[0].name_id), "12");
        assert_eq!(hits[0].distance, 1);
    }

    #[test]
    fn fuzzy_ignores_keys_far_in_length() {
        let index = wards();
        assert!(index.fuzzy("nghi huong thi", 2, 0.0).is_empty());
    }

    #[test]
    fn starts_with_lists_each_name_once() {
        let index = wards();
        assert_eq!(index.starts_with("trang"), vec!["Trảng Dài"]);
        assert_eq!(index.starts_with("p"), vec!["3", "Phúc Xá"]);
    }

    #[test]
    fn empty_index_matches_nothing() {
        let index = LexiconIndex::empty(Category::Province, FoldMode::StripAll);
        assert!(index.exact("ha noi").is_empty());
        assert!(index.fuzzy("ha noi", 2, 0.0).is_empty());
        assert!(index.longest_matches_from(&['h', 'a'], 0).is_empty());
    }
}
