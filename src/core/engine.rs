use crate::config::{ReferencePaths, ResolverConfig};
use crate::core::candidates::CandidateGenerator;
use crate::core::hierarchy::ContextualHierarchy;
use crate::core::lexicon::{LexiconIndex, Lexicons};
use crate::core::normalize::{name_key, Normalizer, VietnameseNormalizer};
use crate::core::selector::{self, Selection};
use crate::core::types::{AddressRecord, Candidate, Category, ResolutionResult};
use crate::persistence;
use log::{debug, info};

/// Candidates and the chosen combination for one input, kept for callers
/// that want to show why a result was picked.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub normalized: String,
    pub candidates: Vec<Candidate>,
    pub selection: Selection,
    pub result: ResolutionResult,
}

// The resolver owns every index and the hierarchy; nothing is mutated after
// construction, so it can be shared across threads behind an `Arc`.
pub struct AddressResolver {
    pub lexicons: Lexicons,
    pub hierarchy: ContextualHierarchy,
    pub config: ResolverConfig,
    normalizer: Box<dyn Normalizer>,
}

impl AddressResolver {
    /// A resolver with no reference data. Resolves everything to empty.
    pub fn new(config: ResolverConfig) -> Self {
        let lexicons = Lexicons::empty(config.fold);
        Self::from_parts(lexicons, ContextualHierarchy::new(), config)
    }

    pub fn from_parts(lexicons: Lexicons, hierarchy: ContextualHierarchy, config: ResolverConfig) -> Self {
        let normalizer = Box::new(VietnameseNormalizer::new(config.fold));
        Self { lexicons, hierarchy, config, normalizer }
    }

    /// Builds the three lexicons from in-memory name lists.
    pub fn from_names<S: AsRef<str>>(
        provinces: &[S],
        districts: &[S],
        wards: &[S],
        hierarchy: ContextualHierarchy,
        config: ResolverConfig,
    ) -> Self {
        let fold = config.fold;
        let lexicons = Lexicons {
            ward: LexiconIndex::build(Category::Ward, wards, fold),
            district: LexiconIndex::build(Category::District, districts, fold),
            province: LexiconIndex::build(Category::Province, provinces, fold),
        };
        Self::from_parts(lexicons, hierarchy, config)
    }

    /// Loads the reference files. Unreadable files leave their part empty.
    pub fn from_reference(paths: &ReferencePaths, config: ResolverConfig) -> Self {
        let provinces = persistence::load_names(&paths.provinces);
        let districts = persistence::load_names(&paths.districts);
        let wards = persistence::load_names(&paths.wards);
        let hierarchy = persistence::load_hierarchy(&paths.hierarchy);

        let resolver = Self::from_names(&provinces, &districts, &wards, hierarchy, config);
        info!(
            "resolver ready: {} provinces, {} districts, {} wards ({} hierarchy provinces)",
            resolver.lexicons.province.len(),
            resolver.lexicons.district.len(),
            resolver.lexicons.ward.len(),
            resolver.hierarchy.province_count()
        );
        resolver
    }

    /// Replaces the normalizer applied by [`resolve`](Self::resolve).
    pub fn with_normalizer(mut self, normalizer: impl Normalizer + 'static) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    pub fn resolve(&self, raw: &str) -> ResolutionResult {
        self.explain(raw).result
    }

    /// Resolves text that is already in normalized form.
    pub fn resolve_normalized(&self, normalized: &str) -> ResolutionResult {
        self.run(normalized.to_string()).result
    }

    pub fn resolve_record(&self, raw: &str) -> AddressRecord {
        self.resolve(raw).to_record()
    }

    /// Like [`resolve`](Self::resolve) but keeps the intermediate candidates.
    pub fn explain(&self, raw: &str) -> Resolution {
        self.run(self.normalize(raw))
    }

    fn run(&self, normalized: String) -> Resolution {
        let candidates = CandidateGenerator::new(&self.lexicons, &self.config).generate(&normalized);
        let selection = selector::select(&candidates, &self.hierarchy, self.config.exact_match_bonus);
        let result = selection.result(&candidates);
        debug!(
            "resolved {:?}: {} candidates, score {:.2} -> {:?}",
            normalized,
            candidates.len(),
            selection.score,
            result
        );
        Resolution { normalized, candidates, selection, result }
    }

    /// Names in `category` with a variant starting with `prefix`. The prefix
    /// is folded but not abbreviation-expanded, so a trailing partial word
    /// such as the "h" of "Biên H" stays a prefix.
    pub fn suggest(&self, category: Category, prefix: &str) -> Vec<&str> {
        let key = name_key(prefix, self.config.fold);
        self.lexicons.get(category).starts_with(&key)
    }
}
