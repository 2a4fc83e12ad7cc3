// src/core/selector.rs
use crate::core::hierarchy::ContextualHierarchy;
use crate::core::types::{Candidate, Category, ResolutionResult};
use std::cmp::Ordering;
use std::collections::HashMap;

/// The winning combination: at most one candidate index per category, in
/// `Category::slot` order (ward, district, province).
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub picks: [Option<usize>; 3],
    pub score: f64,
}

impl Selection {
    fn none() -> Self {
        Self { picks: [None; 3], score: 0.0 }
    }

    pub fn get(&self, category: Category) -> Option<usize> {
        self.picks[category.slot()]
    }

    pub fn result(&self, candidates: &[Candidate]) -> ResolutionResult {
        let name = |category: Category| self.get(category).map(|i| candidates[i].canonical.clone());
        ResolutionResult {
            province: name(Category::Province),
            district: name(Category::District),
            ward: name(Category::Ward),
        }
    }
}

/// Total matched length times `1 + bonus` per exact candidate.
pub fn score(candidates: &[Candidate], picks: &[Option<usize>; 3], exact_bonus: f64) -> f64 {
    let chosen = picks.iter().flatten().map(|&i| &candidates[i]);
    let (length, exact) = chosen.fold((0usize, 0usize), |(len, exact), c| {
        (len + c.span.len(), exact + usize::from(c.is_exact()))
    });
    length as f64 * (1.0 + exact_bonus * exact as f64)
}

fn canonical<'c>(candidates: &'c [Candidate], picks: &[Option<usize>; 3], category: Category) -> &'c str {
    picks[category.slot()].map_or("", |i| candidates[i].canonical.as_str())
}

fn is_valid(candidates: &[Candidate], picks: &[Option<usize>; 3], hierarchy: &ContextualHierarchy) -> bool {
    hierarchy.is_valid(
        canonical(candidates, picks, Category::Ward),
        canonical(candidates, picks, Category::District),
        canonical(candidates, picks, Category::Province),
    )
}

fn span_len(candidates: &[Candidate], pick: Option<usize>) -> usize {
    pick.map_or(0, |i| candidates[i].span.len())
}

/// Smaller index first; an unfilled slot sorts after any candidate.
fn pick_order(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order among combinations of equal score: longer province, district and
/// ward spans, then the smallest (province, district, ward) candidate indices.
fn tie_break(candidates: &[Candidate], a: &[Option<usize>; 3], b: &[Option<usize>; 3]) -> Ordering {
    let slots = [Category::Province, Category::District, Category::Ward].map(Category::slot);
    let mut order = Ordering::Equal;
    for slot in slots {
        order = order.then_with(|| span_len(candidates, b[slot]).cmp(&span_len(candidates, a[slot])));
    }
    for slot in slots {
        order = order.then_with(|| pick_order(a[slot], b[slot]));
    }
    order
}

/// `Less` when `a` should win over `b`: higher score, then [`tie_break`].
fn preference(candidates: &[Candidate], a: &Selection, b: &Selection) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| tie_break(candidates, &a.picks, &b.picks))
}

fn offer(best: &mut Selection, contender: Selection, candidates: &[Candidate]) {
    if preference(candidates, &contender, best) == Ordering::Less {
        *best = contender;
    }
}

/// Partial combination grown left to right by the sweep.
#[derive(Clone, Copy)]
struct SweepState {
    mask: u8,
    picks: [Option<usize>; 3],
    last_end: Option<usize>,
    length: usize,
    exact: usize,
    live: bool,
}

impl SweepState {
    const EMPTY: SweepState =
        SweepState { mask: 0, picks: [None; 3], last_end: None, length: 0, exact: 0, live: true };

    fn extend(&self, index: usize, candidate: &Candidate) -> SweepState {
        let mut picks = self.picks;
        picks[candidate.category.slot()] = Some(index);
        SweepState {
            mask: self.mask | candidate.category.bit(),
            picks,
            last_end: Some(candidate.span.end),
            length: self.length + candidate.span.len(),
            exact: self.exact + usize::from(candidate.is_exact()),
            live: true,
        }
    }

    /// True when every completion of `other` scores no better than the same
    /// completion of `self`. Both must hold the same categories and names.
    fn dominates(&self, other: &SweepState, candidates: &[Candidate], exact_bonus: f64) -> bool {
        if self.last_end > other.last_end || self.length < other.length {
            return false;
        }
        if exact_bonus > 0.0 && self.exact < other.exact {
            return false;
        }
        if self.length > other.length || (exact_bonus > 0.0 && self.exact > other.exact) {
            return true;
        }
        tie_break(candidates, &self.picks, &other.picks) == Ordering::Less
    }
}

/// Partials that hold the same categories with the same names are
/// interchangeable for every later check.
type StateKey<'c> = (u8, [Option<&'c str>; 3]);

fn state_key<'c>(candidates: &'c [Candidate], state: &SweepState, hierarchy: &ContextualHierarchy) -> StateKey<'c> {
    if hierarchy.is_empty() {
        return (state.mask, [None; 3]);
    }
    (state.mask, state.picks.map(|pick| pick.map(|i| candidates[i].canonical.as_str())))
}

/// Only the parent/child checks that can never be repaired by adding a
/// further pick. The skip-level ward/province check is not one of them
/// because a later district can lift it.
fn pairs_compatible(
    candidates: &[Candidate],
    picks: &[Option<usize>; 3],
    hierarchy: &ContextualHierarchy,
) -> bool {
    if hierarchy.is_empty() {
        return true;
    }
    let ward = picks[Category::Ward.slot()].map(|i| candidates[i].canonical.as_str());
    let district = picks[Category::District.slot()].map(|i| candidates[i].canonical.as_str());
    let province = picks[Category::Province.slot()].map(|i| candidates[i].canonical.as_str());

    if let (Some(d), Some(p)) = (district, province) {
        if !hierarchy.is_district_in_province(d, p) {
            return false;
        }
    }
    if let (Some(w), Some(d)) = (ward, district) {
        if !hierarchy.is_ward_in_district(w, d) {
            return false;
        }
    }
    true
}

/// Picks the highest-scoring set of mutually non-overlapping candidates,
/// at most one per category, that the hierarchy accepts.
///
/// Candidates are swept in order of span end. Each partial combination
/// records which categories it already holds and where its last span ends,
/// so a candidate can only extend it when its category is free and it starts
/// strictly after that end. Partials failing a district/province or
/// ward/district check are dropped as soon as they form; the complete
/// validity test runs on the finished combinations.
pub fn select(candidates: &[Candidate], hierarchy: &ContextualHierarchy, exact_bonus: f64) -> Selection {
    sweep(candidates, hierarchy, exact_bonus).0
}

/// The sweep behind [`select`], also reporting how many partial
/// combinations were kept alive.
///
/// A new partial is discarded when a kept one with the same key ends no
/// later, is no shorter and has no fewer exact picks. Since partials are
/// created in order of end, a new one can only evict kept partials that end
/// at the same place.
fn sweep(candidates: &[Candidate], hierarchy: &ContextualHierarchy, exact_bonus: f64) -> (Selection, usize) {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| (candidates[i].span.end, candidates[i].span.start, i));

    let mut states = vec![SweepState::EMPTY];
    let mut groups: HashMap<StateKey<'_>, Vec<usize>> = HashMap::new();
    groups.insert(state_key(candidates, &SweepState::EMPTY, hierarchy), vec![0]);

    for &index in &order {
        let candidate = &candidates[index];
        let bit = candidate.category.bit();
        let existing = states.len();
        for s in 0..existing {
            let state = states[s];
            if !state.live || state.mask & bit != 0 || state.last_end.is_some_and(|end| candidate.span.start <= end) {
                continue;
            }
            let next = state.extend(index, candidate);
            if !pairs_compatible(candidates, &next.picks, hierarchy) {
                continue;
            }

            let members = groups.entry(state_key(candidates, &next, hierarchy)).or_default();
            if members.iter().any(|&m| states[m].dominates(&next, candidates, exact_bonus)) {
                continue;
            }
            members.retain(|&m| {
                let evicted = next.dominates(&states[m], candidates, exact_bonus);
                if evicted {
                    states[m].live = false;
                }
                !evicted
            });
            members.push(states.len());
            states.push(next);
        }
    }

    let mut best = Selection::none();
    let mut kept = 0;
    for state in states.iter().filter(|s| s.live) {
        kept += 1;
        if !is_valid(candidates, &state.picks, hierarchy) {
            continue;
        }
        let contender = Selection { picks: state.picks, score: score(candidates, &state.picks, exact_bonus) };
        offer(&mut best, contender, candidates);
    }
    (best, kept)
}

/// Exhaustive search over every (province, district, ward) triple. Same
/// result as [`select`]; kept as a reference for it.
pub fn select_brute_force(candidates: &[Candidate], hierarchy: &ContextualHierarchy, exact_bonus: f64) -> Selection {
    let of = |category: Category| -> Vec<Option<usize>> {
        std::iter::once(None)
            .chain(candidates.iter().enumerate().filter(|(_, c)| c.category == category).map(|(i, _)| Some(i)))
            .collect()
    };
    let (wards, districts, provinces) = (of(Category::Ward), of(Category::District), of(Category::Province));

    let mut best = Selection::none();
    for &p in &provinces {
        for &d in &districts {
            for &w in &wards {
                let picks = [w, d, p];
                let chosen: Vec<usize> = picks.iter().flatten().copied().collect();
                let disjoint = chosen.iter().enumerate().all(|(k, &a)| {
                    chosen[k + 1..].iter().all(|&b| !candidates[a].span.conflicts_with(&candidates[b].span))
                });
                if !disjoint || !is_valid(candidates, &picks, hierarchy) {
                    continue;
                }
                let contender = Selection { picks, score: score(candidates, &picks, exact_bonus) };
                offer(&mut best, contender, candidates);
            }
        }
    }
    best
}
