pub mod candidates;
pub mod engine;
pub mod hierarchy;
pub mod lexicon;
pub mod normalize;
pub mod selector;
pub mod trie;
pub mod types;
pub mod variants;
