// src/core/candidates.rs
use crate::config::ResolverConfig;
use crate::core::lexicon::{LexiconIndex, Lexicons};
use crate::core::types::{Candidate, Category, MatchKind, NameId, NgramKind, Span};
use std::collections::HashSet;

/// A whitespace-delimited token, as character offsets into the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
}

impl Token {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

pub fn tokenize(chars: &[char]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (i, ch) in chars.iter().enumerate() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(Token { start: s, end: i });
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(Token { start: s, end: chars.len() });
    }
    tokens
}

/// Collects candidates, keeping the first of any (category, span, name) repeat.
#[derive(Default)]
struct CandidateSink {
    seen: HashSet<(Category, Span, NameId)>,
    items: Vec<Candidate>,
}

impl CandidateSink {
    fn push(&mut self, candidate: Candidate) {
        if self.seen.insert((candidate.category, candidate.span, candidate.name_id)) {
            self.items.push(candidate);
        }
    }
}

/// Scans normalized text for substrings naming a ward, district or province.
pub struct CandidateGenerator<'a> {
    lexicons: &'a Lexicons,
    config: &'a ResolverConfig,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(lexicons: &'a Lexicons, config: &'a ResolverConfig) -> Self {
        Self { lexicons, config }
    }

    pub fn generate(&self, normalized: &str) -> Vec<Candidate> {
        let chars: Vec<char> = normalized.chars().collect();
        let tokens = tokenize(&chars);
        let mut sink = CandidateSink::default();

        self.word_ngrams(&chars, &tokens, &mut sink);
        for token in tokens.iter().filter(|t| t.len() > self.config.char_ngram_token_threshold) {
            self.char_ngrams(&chars, *token, &mut sink);
        }
        sink.items
    }

    fn word_ngrams(&self, chars: &[char], tokens: &[Token], sink: &mut CandidateSink) {
        for i in 0..tokens.len() {
            let mut query = String::new();
            for j in i..tokens.len().min(i + self.config.max_word_ngram) {
                if j > i {
                    query.push(' ');
                }
                query.extend(&chars[tokens[j].start..tokens[j].end]);

                let span = Span::new(tokens[i].start, tokens[j].end);
                for lexicon in self.lexicons.iter() {
                    self.lookup(lexicon, &query, span, NgramKind::Word, sink);
                }
            }
        }
    }

    /// Windows inside one glued token. Exact hits come from trie walks at each
    /// start offset; windows without an exact hit fall back to fuzzy search.
    fn char_ngrams(&self, chars: &[char], token: Token, sink: &mut CandidateSink) {
        let min = self.config.char_ngram_min;
        let max = self.config.char_ngram_max.min(token.len());
        if min > max {
            return;
        }
        let within = &chars[..token.end];

        for lexicon in self.lexicons.iter() {
            let mut exact_windows: HashSet<(usize, usize)> = HashSet::new();
            for start in token.start..token.end {
                for hit in lexicon.longest_matches_from(within, start) {
                    let len = hit.end - hit.start;
                    if len < min || len > max {
                        continue;
                    }
                    exact_windows.insert((hit.start, hit.end));
                    sink.push(Candidate {
                        category: lexicon.category(),
                        span: Span::new(hit.start, hit.end),
                        name_id: hit.name_id,
                        canonical: lexicon.name(hit.name_id).to_string(),
                        matched_text: chars[hit.start..hit.end].iter().collect(),
                        ngram: NgramKind::Char,
                        match_kind: MatchKind::Exact,
                        similarity: 1.0,
                    });
                }
            }

            for len in min..=max {
                for start in token.start..=token.end - len {
                    if exact_windows.contains(&(start, start + len)) {
                        continue;
                    }
                    let query: String = chars[start..start + len].iter().collect();
                    self.fuzzy_lookup(lexicon, &query, Span::new(start, start + len), NgramKind::Char, sink);
                }
            }
        }
    }

    fn lookup(&self, lexicon: &LexiconIndex, query: &str, span: Span, ngram: NgramKind, sink: &mut CandidateSink) {
        let exact = lexicon.exact_ids(query);
        if exact.is_empty() {
            self.fuzzy_lookup(lexicon, query, span, ngram, sink);
            return;
        }
        for &name_id in exact {
            sink.push(Candidate {
                category: lexicon.category(),
                span,
                name_id,
                canonical: lexicon.name(name_id).to_string(),
                matched_text: query.to_string(),
                ngram,
                match_kind: MatchKind::Exact,
                similarity: 1.0,
            });
        }
    }

    fn fuzzy_lookup(&self, lexicon: &LexiconIndex, query: &str, span: Span, ngram: NgramKind, sink: &mut CandidateSink) {
        if query.chars().count() < self.config.fuzzy_min_len {
            return;
        }
        let threshold = self.config.similarity_threshold(query);
        let hits = lexicon.fuzzy(query, self.config.max_edit_distance, threshold);
        for hit in hits.into_iter().take(self.config.fuzzy_max_results) {
            sink.push(Candidate {
                category: lexicon.category(),
                span,
                name_id: hit.name_id,
                canonical: lexicon.name(hit.name_id).to_string(),
                matched_text: query.to_string(),
                ngram,
                match_kind: MatchKind::Fuzzy,
                similarity: hit.similarity,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FoldMode;

    fn lexicons() -> Lexicons {
        let fold = FoldMode::StripAll;
        Lexicons {
            ward: LexiconIndex::build(Category::Ward, ["Trảng Dài", "3", "Yên Nghĩa"], fold),
            district: LexiconIndex::build(Category::District, ["Biên Hòa", "Hà Đông"], fold),
            province: LexiconIndex::build(Category::Province, ["Đồng Nai", "Hà Nội"], fold),
        }
    }

    fn find<'c>(candidates: &'c [Candidate], canonical: &str) -> Vec<&'c Candidate> {
        candidates.iter().filter(|c| c.canonical == canonical).collect()
    }

    fn at<'c>(candidates: &'c [Candidate], canonical: &str, span: Span) -> Option<&'c Candidate> {
        candidates.iter().find(|c| c.canonical == canonical && c.span == span)
    }

    #[test]
    fn tokenize_records_character_offsets() {
        let chars: Vec<char> = "  ab cde  f".chars().collect();
        let spans: Vec<(usize, usize)> = tokenize(&chars).iter().map(|t| (t.start, t.end)).collect();
        assert_eq!(spans, vec![(2, 4), (5, 8), (10, 11)]);
    }

    #[test]
    fn word_ngrams_find_exact_names_with_spans() {
        let lex = lexicons();
        let config = ResolverConfig::default();
        let text = "khu pho 3 trang dai bien hoa dong nai";
        let candidates = CandidateGenerator::new(&lex, &config).generate(text);

        let ward = at(&candidates, "Trảng Dài", Span::new(10, 19)).unwrap();
        assert_eq!(ward.match_kind, MatchKind::Exact);
        assert_eq!(ward.ngram, NgramKind::Word);
        assert_eq!(ward.matched_text, "trang dai");

        assert!(at(&candidates, "3", Span::new(8, 9)).unwrap().is_exact());
        assert!(at(&candidates, "Biên Hòa", Span::new(20, 28)).unwrap().is_exact());
        assert!(at(&candidates, "Đồng Nai", Span::new(29, 37)).unwrap().is_exact());
    }

    #[test]
    fn typo_produces_fuzzy_candidate() {
        let lex = lexicons();
        let config = ResolverConfig::default();
        let candidates = CandidateGenerator::new(&lex, &config).generate("trang dsi");
        let ward = at(&candidates, "Trảng Dài", Span::new(0, 9)).unwrap();
        assert_eq!(ward.match_kind, MatchKind::Fuzzy);
        assert!(ward.similarity >= config.text_similarity);
        assert!(find(&candidates, "Trảng Dài").iter().all(|c| !c.is_exact()));
    }

    #[test]
    fn digit_queries_use_the_numeric_threshold() {
        let fold = FoldMode::StripAll;
        let lex = Lexicons {
            ward: LexiconIndex::build(Category::Ward, ["12"], fold),
            district: LexiconIndex::empty(Category::District, fold),
            province: LexiconIndex::empty(Category::Province, fold),
        };
        let config = ResolverConfig::default();
        assert!(CandidateGenerator::new(&lex, &config).generate("p 19").is_empty());

        let relaxed = ResolverConfig { numeric_similarity: 0.75, ..Default::default() };
        let candidates = CandidateGenerator::new(&lex, &relaxed).generate("p 19");
        let ward = at(&candidates, "12", Span::new(0, 4)).unwrap();
        assert_eq!(ward.match_kind, MatchKind::Fuzzy);
    }

    #[test]
    fn glued_token_is_scanned_with_char_windows() {
        let lex = lexicons();
        let config = ResolverConfig::default();
        let candidates = CandidateGenerator::new(&lex, &config).generate("yennghiahadonghanoi");

        let ward = find(&candidates, "Yên Nghĩa");
        assert!(ward.iter().any(|c| c.span == Span::new(0, 8) && c.is_exact() && c.ngram == NgramKind::Char));
        let district = find(&candidates, "Hà Đông");
        assert!(district.iter().any(|c| c.span == Span::new(8, 14) && c.is_exact()));
        let province = find(&candidates, "Hà Nội");
        assert!(province.iter().any(|c| c.span == Span::new(14, 19) && c.is_exact()));
    }

    #[test]
    fn short_tokens_get_no_char_windows() {
        let lex = lexicons();
        let config = ResolverConfig::default();
        let candidates = CandidateGenerator::new(&lex, &config).generate("hanoi");
        assert!(candidates.iter().all(|c| c.ngram == NgramKind::Word));
        assert_eq!(find(&candidates, "Hà Nội").len(), 1);
    }

    #[test]
    fn candidates_are_unique_per_category_span_and_name() {
        let lex = lexicons();
        let config = ResolverConfig { char_ngram_token_threshold: 4, ..Default::default() };
        let candidates = CandidateGenerator::new(&lex, &config).generate("dongnai");
        let mut keys: Vec<_> = candidates.iter().map(|c| (c.category, c.span, c.name_id)).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        let whole: Vec<_> = find(&candidates, "Đồng Nai").into_iter().filter(|c| c.span == Span::new(0, 7)).collect();
        assert_eq!(whole.len(), 1);
        assert_eq!(whole[0].ngram, NgramKind::Word);
    }

    #[test]
    fn blank_input_has_no_candidates() {
        let lex = lexicons();
        let config = ResolverConfig::default();
        let generator = CandidateGenerator::new(&lex, &config);
        assert!(generator.generate("").is_empty());
        assert!(generator.generate("   ").is_empty());
    }

    #[test]
    fn every_candidate_span_is_well_formed() {
        let lex = lexicons();
        let config = ResolverConfig::default();
        let text = "p3 trangdaibienhoa dong nai";
        let len = text.chars().count();
        for c in CandidateGenerator::new(&lex, &config).generate(text) {
            assert!(c.span.start < c.span.end && c.span.end <= len, "{c:?}");
        }
    }
}
