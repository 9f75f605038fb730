// 🏷️ Category Classifier - multinomial naive Bayes over token features
//
// Trained once from labeled phrases, then read-only. A TrainedModel holds no
// interior mutability, so it can be shared across threads behind an Arc.

use crate::error::{PipelineError, PipelineResult};
use crate::tokenizer::{tokenize, TokenShape};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

// ============================================================================
// CATEGORY
// ============================================================================

/// Entity category. Declaration order is the wire order of entity buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Organization,
    Person,
    Location,
    Date,
    Money,
    Percent,
    Unknown,
}

impl Category {
    /// Every category that can hold entities (all but Unknown)
    pub const ENTITY_CATEGORIES: [Category; 6] = [
        Category::Organization,
        Category::Person,
        Category::Location,
        Category::Date,
        Category::Money,
        Category::Percent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Organization => "ORGANIZATION",
            Category::Person => "PERSON",
            Category::Location => "LOCATION",
            Category::Date => "DATE",
            Category::Money => "MONEY",
            Category::Percent => "PERCENT",
            Category::Unknown => "UNKNOWN",
        }
    }

    pub fn parse(s: &str) -> Option<Category> {
        let upper = s.trim().to_uppercase();
        Category::ENTITY_CATEGORIES
            .into_iter()
            .chain(std::iter::once(Category::Unknown))
            .find(|c| c.as_str() == upper)
    }

    pub fn is_entity(&self) -> bool {
        *self != Category::Unknown
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TRAINING INPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub text: String,
    pub category: Category,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        TrainingExample {
            text: text.into(),
            category,
        }
    }
}

/// Classifier tuning knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    /// Laplace smoothing
    pub alpha: f64,

    /// Lowest posterior accepted as a label; below it the token is Unknown
    pub min_confidence: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        ClassifierParams {
            alpha: 1.0,
            min_confidence: 0.2,
        }
    }
}

impl ClassifierParams {
    pub fn validate(&self) -> PipelineResult<()> {
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return Err(PipelineError::Configuration(format!(
                "classifier alpha must be positive, got {}",
                self.alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(PipelineError::Configuration(format!(
                "classifier min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

// ============================================================================
// FEATURES
// ============================================================================

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "her", "his",
    "in", "is", "it", "its", "of", "on", "or", "she", "that", "the", "their", "they", "this",
    "to", "was", "were", "will", "with",
];

/// Features of a single token: its lowercase form (unless a stopword) plus
/// a shape feature for numeric tokens
pub fn token_features(token: &str) -> Vec<String> {
    let mut features = Vec::with_capacity(2);

    let lower = token.to_lowercase();
    if !lower.is_empty() && !STOPWORDS.contains(&lower.as_str()) {
        features.push(lower);
    }

    if let Some(shape) = TokenShape::of(token) {
        features.push(shape.feature().to_string());
    }

    features
}

fn text_features(text: &str) -> Vec<String> {
    tokenize(text)
        .iter()
        .flat_map(|token| token_features(token))
        .collect()
}

// ============================================================================
// TRAINED MODEL
// ============================================================================

#[derive(Debug, Clone)]
struct CategoryModel {
    category: Category,
    log_prior: f64,
    /// ln P(feature | category) for every vocabulary feature
    feature_log_probs: HashMap<String, f64>,
}

/// Immutable result of training
#[derive(Debug, Clone)]
pub struct TrainedModel {
    params: ClassifierParams,
    /// Sorted by category, so iteration order is fixed
    categories: Vec<CategoryModel>,
    vocabulary: BTreeSet<String>,
    example_count: usize,
}

/// Fit a model on labeled examples
pub fn train(examples: &[TrainingExample], params: ClassifierParams) -> PipelineResult<TrainedModel> {
    params.validate()?;

    if examples.is_empty() {
        return Err(PipelineError::Training(
            "training set is empty; no category can be learned".to_string(),
        ));
    }

    if let Some(bad) = examples.iter().find(|e| !e.category.is_entity()) {
        return Err(PipelineError::Training(format!(
            "example {:?} is labeled UNKNOWN; only entity categories can be trained",
            bad.text
        )));
    }

    let mut doc_counts: BTreeMap<Category, usize> = BTreeMap::new();
    let mut feature_counts: BTreeMap<Category, HashMap<String, usize>> = BTreeMap::new();
    let mut feature_totals: BTreeMap<Category, usize> = BTreeMap::new();
    let mut vocabulary = BTreeSet::new();

    for example in examples {
        *doc_counts.entry(example.category).or_insert(0) += 1;
        let counts = feature_counts.entry(example.category).or_default();
        let total = feature_totals.entry(example.category).or_insert(0);

        for feature in text_features(&example.text) {
            *counts.entry(feature.clone()).or_insert(0) += 1;
            *total += 1;
            vocabulary.insert(feature);
        }
    }

    if vocabulary.is_empty() {
        return Err(PipelineError::Training(
            "training examples contain no usable features".to_string(),
        ));
    }

    let total_docs = examples.len() as f64;
    let vocab_size = vocabulary.len() as f64;

    let categories: Vec<CategoryModel> = doc_counts
        .iter()
        .map(|(&category, &docs)| {
            let counts = &feature_counts[&category];
            let denominator = feature_totals[&category] as f64 + params.alpha * vocab_size;

            let feature_log_probs = vocabulary
                .iter()
                .map(|feature| {
                    let count = counts.get(feature).copied().unwrap_or(0) as f64;
                    (feature.clone(), ((count + params.alpha) / denominator).ln())
                })
                .collect();

            CategoryModel {
                category,
                log_prior: (docs as f64 / total_docs).ln(),
                feature_log_probs,
            }
        })
        .collect();

    info!(
        examples = examples.len(),
        categories = categories.len(),
        vocabulary = vocabulary.len(),
        "trained entity classifier"
    );

    Ok(TrainedModel {
        params,
        categories,
        vocabulary,
        example_count: examples.len(),
    })
}

/// Classify a token under a trained model
pub fn classify(model: &TrainedModel, token: &str) -> Category {
    model.classify(token)
}

impl TrainedModel {
    /// Posterior probability per trained category, in category order.
    /// Empty when none of the token's features were seen in training.
    pub fn posteriors(&self, token: &str) -> Vec<(Category, f64)> {
        let features: Vec<String> = token_features(token)
            .into_iter()
            .filter(|f| self.vocabulary.contains(f))
            .collect();

        if features.is_empty() {
            return Vec::new();
        }

        let scores: Vec<(Category, f64)> = self
            .categories
            .iter()
            .map(|model| {
                let log_prob = features
                    .iter()
                    .filter_map(|f| model.feature_log_probs.get(f))
                    .sum::<f64>();
                (model.category, model.log_prior + log_prob)
            })
            .collect();

        // Softmax in log space
        let max_score = scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        let sum_exp: f64 = scores.iter().map(|(_, s)| (s - max_score).exp()).sum();

        scores
            .into_iter()
            .map(|(category, s)| (category, (s - max_score).exp() / sum_exp))
            .collect()
    }

    /// Most probable category, or Unknown for unseen tokens, ties, and
    /// posteriors under the confidence floor
    pub fn classify(&self, token: &str) -> Category {
        let posteriors = self.posteriors(token);

        let mut best: Option<(Category, f64)> = None;
        let mut runner_up = f64::NEG_INFINITY;
        for (category, p) in posteriors {
            match best {
                Some((_, best_p)) if p <= best_p => runner_up = runner_up.max(p),
                Some((_, best_p)) => {
                    runner_up = best_p;
                    best = Some((category, p));
                }
                None => best = Some((category, p)),
            }
        }

        match best {
            Some((_, p)) if (p - runner_up).abs() <= f64::EPSILON => Category::Unknown,
            Some((_, p)) if p < self.params.min_confidence => Category::Unknown,
            Some((category, _)) => category,
            None => Category::Unknown,
        }
    }

    pub fn params(&self) -> ClassifierParams {
        self.params
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn example_count(&self) -> usize {
        self.example_count
    }

    /// Categories seen during training, in category order
    pub fn categories(&self) -> Vec<Category> {
        self.categories.iter().map(|m| m.category).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::reference_examples;
    use std::sync::Arc;

    fn reference_model() -> TrainedModel {
        train(&reference_examples(), ClassifierParams::default()).unwrap()
    }

    #[test]
    fn test_empty_training_set_fails() {
        let err = train(&[], ClassifierParams::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
    }

    #[test]
    fn test_unknown_label_fails() {
        let examples = vec![TrainingExample::new("whatever", Category::Unknown)];
        let err = train(&examples, ClassifierParams::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
    }

    #[test]
    fn test_featureless_training_set_fails() {
        let examples = vec![TrainingExample::new("at the ... of", Category::Person)];
        let err = train(&examples, ClassifierParams::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
    }

    #[test]
    fn test_invalid_params_fail() {
        let examples = reference_examples();

        let params = ClassifierParams { alpha: 0.0, ..Default::default() };
        assert!(matches!(train(&examples, params), Err(PipelineError::Configuration(_))));

        let params = ClassifierParams { min_confidence: 1.5, ..Default::default() };
        assert!(matches!(train(&examples, params), Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_reference_model_shape() {
        let model = reference_model();
        assert_eq!(model.example_count(), 6);
        assert_eq!(model.categories(), Category::ENTITY_CATEGORIES.to_vec());
        // john smith works apple inc | microsoft corporation reported earnings |
        // new york office | january 15 #number 2024 #year | $120,000 #money | 25% #percent
        assert_eq!(model.vocabulary_size(), 21);
    }

    #[test]
    fn test_reference_classifications() {
        let model = reference_model();

        assert_eq!(classify(&model, "John"), Category::Person);
        assert_eq!(classify(&model, "Apple"), Category::Person);
        assert_eq!(classify(&model, "Microsoft"), Category::Organization);
        assert_eq!(classify(&model, "York"), Category::Location);
        assert_eq!(classify(&model, "January"), Category::Date);
        assert_eq!(classify(&model, "2024"), Category::Date);
        assert_eq!(classify(&model, "$120,000"), Category::Money);
        assert_eq!(classify(&model, "25%"), Category::Percent);
    }

    #[test]
    fn test_shape_features_generalize_numbers() {
        let model = reference_model();

        assert_eq!(classify(&model, "$50"), Category::Money);
        assert_eq!(classify(&model, "7%"), Category::Percent);
        assert_eq!(classify(&model, "1999"), Category::Date);
    }

    #[test]
    fn test_out_of_vocabulary_is_unknown() {
        let model = reference_model();

        assert_eq!(classify(&model, "Cupertino"), Category::Unknown);
        assert_eq!(classify(&model, "Q1"), Category::Unknown);
        assert!(model.posteriors("Cupertino").is_empty());
    }

    #[test]
    fn test_empty_and_stopword_tokens_are_unknown() {
        let model = reference_model();

        assert_eq!(classify(&model, ""), Category::Unknown);
        // "at" appears in the PERSON phrase but is a stopword
        assert_eq!(classify(&model, "at"), Category::Unknown);
    }

    #[test]
    fn test_case_insensitive_features() {
        let model = reference_model();
        assert_eq!(classify(&model, "MICROSOFT"), classify(&model, "microsoft"));
    }

    #[test]
    fn test_posteriors_sum_to_one() {
        let model = reference_model();
        let posteriors = model.posteriors("Microsoft");

        assert_eq!(posteriors.len(), 6);
        let sum: f64 = posteriors.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let (best, _) = posteriors
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(*best, Category::Organization);
    }

    #[test]
    fn test_confidence_floor() {
        let params = ClassifierParams { min_confidence: 0.99, ..Default::default() };
        let model = train(&reference_examples(), params).unwrap();

        assert_eq!(classify(&model, "John"), Category::Unknown);
    }

    #[test]
    fn test_tie_is_unknown() {
        let examples = vec![
            TrainingExample::new("alpha", Category::Person),
            TrainingExample::new("alpha", Category::Location),
        ];
        let model = train(&examples, ClassifierParams::default()).unwrap();

        assert_eq!(classify(&model, "alpha"), Category::Unknown);
    }

    #[test]
    fn test_single_category_model() {
        let examples = vec![TrainingExample::new("Acme Corp", Category::Organization)];
        let model = train(&examples, ClassifierParams::default()).unwrap();

        assert_eq!(classify(&model, "acme"), Category::Organization);
        assert_eq!(classify(&model, "Globex"), Category::Unknown);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let model = reference_model();
        for token in ["John", "office", "$50", "billion", "15", ""] {
            let first = classify(&model, token);
            for _ in 0..10 {
                assert_eq!(classify(&model, token), first);
            }
        }
    }

    #[test]
    fn test_concurrent_reads_match_sequential() {
        let model = Arc::new(reference_model());
        let tokens: Vec<String> = tokenize(
            "John Smith works at Apple Inc. He received $120,000 on January 15, 2024. \
             Microsoft Corporation grew 25% in the New York office.",
        );

        let sequential: Vec<Category> = tokens.iter().map(|t| classify(&model, t)).collect();

        let parallel: Vec<Vec<Category>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let model = Arc::clone(&model);
                    let tokens = &tokens;
                    scope.spawn(move || {
                        tokens
                            .iter()
                            .map(|t| classify(&model, t))
                            .collect::<Vec<Category>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for result in parallel {
            assert_eq!(result, sequential);
        }
    }

    #[test]
    fn test_category_parse_and_display() {
        assert_eq!(Category::parse("money"), Some(Category::Money));
        assert_eq!(Category::parse(" PERSON "), Some(Category::Person));
        assert_eq!(Category::parse("EVENT"), None);
        assert_eq!(Category::Organization.to_string(), "ORGANIZATION");
        assert_eq!(
            serde_json::to_string(&Category::Percent).unwrap(),
            "\"PERCENT\""
        );
    }
}
