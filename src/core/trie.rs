// --- File: src/core/trie.rs
use crate::core::types::VariantId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct TrieNode {
    children: BTreeMap<char, usize>,
    variant: Option<VariantId>,
}

/// Arena-backed character trie over normalized variant keys.
/// Children are ordered, so every enumeration is deterministic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariantTrie {
    nodes: Vec<TrieNode>,
    keys: usize,
}

impl Default for VariantTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl VariantTrie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::default()], keys: 0 }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys == 0
    }

    /// Inserts `key`, attaching `variant` to its terminal node.
    /// If the key is already present the existing id is kept and returned.
    /// O(k) where k is the key length in characters.
    pub fn insert(&mut self, key: &str, variant: VariantId) -> VariantId {
        let mut node_idx = 0;
        for ch in key.chars() {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&ch) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(TrieNode::default());
                self.nodes[node_idx].children.insert(ch, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
        }
        match self.nodes[node_idx].variant {
            Some(existing) => existing,
            None => {
                self.nodes[node_idx].variant = Some(variant);
                self.keys += 1;
                variant
            }
        }
    }

    fn descend<I: IntoIterator<Item = char>>(&self, chars: I) -> Option<usize> {
        let mut node_idx = 0;
        for ch in chars {
            node_idx = *self.nodes[node_idx].children.get(&ch)?;
        }
        Some(node_idx)
    }

    /// The variant stored under exactly `key`, if any.
    pub fn get(&self, key: &str) -> Option<VariantId> {
        self.descend(key.chars()).and_then(|idx| self.nodes[idx].variant)
    }

    /// Walks `text` from `start` and reports every terminal passed on the way,
    /// shortest first, as `(variant, end)` with `end` exclusive.
    pub fn terminals_from(&self, text: &[char], start: usize) -> Vec<(VariantId, usize)> {
        let mut found = Vec::new();
        let mut node_idx = 0;
        for (i, ch) in text.iter().enumerate().skip(start) {
            match self.nodes[node_idx].children.get(ch) {
                Some(&next) => node_idx = next,
                None => break,
            }
            if let Some(variant) = self.nodes[node_idx].variant {
                found.push((variant, i + 1));
            }
        }
        found
    }

    /// Every variant whose key starts with `prefix`, in key order.
    pub fn collect_under(&self, prefix: &str) -> Vec<VariantId> {
        let Some(root) = self.descend(prefix.chars()) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if let Some(variant) = node.variant {
                out.push(variant);
            }
            // Reverse push so the smallest child is popped first.
            stack.extend(node.children.values().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn sample() -> VariantTrie {
        let mut trie = VariantTrie::new();
        trie.insert("ba", 0);
        trie.insert("ba dinh", 1);
        trie.insert("ba ria", 2);
        trie.insert("bac ninh", 3);
        trie
    }

    #[test]
    fn get_requires_a_terminal() {
        let trie = sample();
        assert_eq!(trie.get("ba dinh"), Some(1));
        assert_eq!(trie.get("ba d"), None);
        assert_eq!(trie.get(""), None);
        assert_eq!(trie.get("xyz"), None);
    }

    #[test]
    fn duplicate_insert_keeps_first_id() {
        let mut trie = sample();
        assert_eq!(trie.insert("ba ria", 9), 2);
        assert_eq!(trie.len(), 4);
    }

    #[test]
    fn terminals_from_reports_every_prefix_match() {
        let trie = sample();
        let text = chars("x ba dinh");
        assert_eq!(trie.terminals_from(&text, 2), vec![(0, 4), (1, 9)]);
        assert!(trie.terminals_from(&text, 0).is_empty());
        assert!(trie.terminals_from(&text, 42).is_empty());
    }

    #[test]
    fn collect_under_is_ordered_by_key() {
        let trie = sample();
        assert_eq!(trie.collect_under("ba"), vec![0, 1, 2, 3]);
        assert_eq!(trie.collect_under("ba "), vec![1, 2]);
        assert!(trie.collect_under("q").is_empty());
    }

    #[test]
    fn deep_keys_do_not_recurse() {
        let mut trie = VariantTrie::new();
        let long = "a".repeat(50_000);
        trie.insert(&long, 7);
        assert_eq!(trie.collect_under("a"), vec![7]);
    }
}
