// 🧩 Entity Spans - post-processing over the classified token stream
//
// Runs after classification and never changes extract() output. Adjacent
// tokens sharing a category become one span ("New" "York" → "New York").

use crate::classifier::{Category, TrainedModel};
use crate::extractor::{classify_tokens, ClassifiedToken};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub category: Category,
    /// Index of the first token in the classified stream
    pub start: usize,
    /// Number of tokens merged into this span
    pub len: usize,
}

/// Merge runs of same-category tokens. Unknown tokens break runs and are dropped.
pub fn merge_spans(tokens: &[ClassifiedToken]) -> Vec<EntitySpan> {
    let mut spans: Vec<EntitySpan> = Vec::new();

    for (index, ClassifiedToken { token, category }) in tokens.iter().enumerate() {
        if !category.is_entity() {
            continue;
        }

        match spans.last_mut() {
            Some(span) if span.category == *category && span.start + span.len == index => {
                span.text.push(' ');
                span.text.push_str(token);
                span.len += 1;
            }
            _ => spans.push(EntitySpan {
                text: token.clone(),
                category: *category,
                start: index,
                len: 1,
            }),
        }
    }

    spans
}

/// Classify `text` and merge the result into spans
pub fn extract_spans(text: &str, model: &TrainedModel) -> Vec<EntitySpan> {
    merge_spans(&classify_tokens(text, model))
}
