// 🔎 Entity Extractor - tokenize, classify per token, bucket by category
//
// Single pass, no backtracking. Each token is classified on its own; see
// spans.rs for the optional multi-token merge.

use crate::classifier::{Category, TrainedModel};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

// ============================================================================
// CLASSIFIED TOKEN STREAM
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedToken {
    pub token: String,
    pub category: Category,
}

/// Every token of `text` with its category, in source order (Unknown included)
pub fn classify_tokens(text: &str, model: &TrainedModel) -> Vec<ClassifiedToken> {
    Tokenizer::new()
        .tokenize(text)
        .into_iter()
        .map(|token| {
            let category = model.classify(&token);
            ClassifiedToken { token, category }
        })
        .collect()
}

// ============================================================================
// ENTITY BUCKET
// ============================================================================

/// Category → tokens in order of appearance, duplicates kept.
/// Always carries exactly the six entity categories as keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityBucket {
    buckets: BTreeMap<Category, Vec<String>>,
}

impl EntityBucket {
    /// Bucket with every entity category present and empty
    pub fn new() -> Self {
        EntityBucket {
            buckets: Category::ENTITY_CATEGORIES
                .into_iter()
                .map(|c| (c, Vec::new()))
                .collect(),
        }
    }

    /// Append a token; Unknown tokens are not entities and are dropped
    pub fn push(&mut self, category: Category, token: impl Into<String>) -> bool {
        if !category.is_entity() {
            return false;
        }
        self.buckets.entry(category).or_default().push(token.into());
        true
    }

    pub fn get(&self, category: Category) -> &[String] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, category: Category) -> usize {
        self.get(category).len()
    }

    /// Total entities across every category
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn categories(&self) -> Vec<Category> {
        self.buckets.keys().copied().collect()
    }

    /// True when the key set is exactly the entity categories
    pub fn has_stable_keys(&self) -> bool {
        self.buckets.keys().copied().eq(Category::ENTITY_CATEGORIES)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> {
        self.buckets.iter().map(|(c, tokens)| (*c, tokens.as_slice()))
    }
}

impl Default for EntityBucket {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract categorized entities from document text
pub fn extract(text: &str, model: &TrainedModel) -> EntityBucket {
    let classified = classify_tokens(text, model);
    let token_count = classified.len();

    let mut bucket = EntityBucket::new();
    for ClassifiedToken { token, category } in classified {
        bucket.push(category, token);
    }

    debug!(tokens = token_count, entities = bucket.total(), "extracted entities");
    bucket
}

// ============================================================================
// TESTS
// ============================================================================
