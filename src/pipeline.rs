// 🔁 Document Analyzer - the per-request pipeline
//
// tokenize → classify per token → bucket → synthesize → compose
//
// Built once at startup. The trained model sits behind an Arc and is never
// mutated, so one analyzer serves concurrent requests without locking.

use crate::analytics::Synthesizer;
use crate::classifier::{train, TrainedModel, TrainingExample};
use crate::config::AppConfig;
use crate::error::PipelineResult;
use crate::extractor::extract;
use crate::response::{compose, ResponsePayload};
use crate::spans::{extract_spans, EntitySpan};
use crate::training::{load_training_set, reference_examples};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DocumentAnalyzer {
    model: Arc<TrainedModel>,
    synthesizer: Synthesizer,
}

impl DocumentAnalyzer {
    /// Wire an analyzer from already-built parts
    pub fn new(model: Arc<TrainedModel>, synthesizer: Synthesizer) -> Self {
        DocumentAnalyzer { model, synthesizer }
    }

    /// Train on `examples` and validate the synthesizer settings in `config`
    pub fn from_examples(examples: &[TrainingExample], config: &AppConfig) -> PipelineResult<Self> {
        config.validate()?;
        let model = train(examples, config.classifier.params)?;
        let synthesizer = Synthesizer::new(config.synthesizer.clone())?;
        Ok(DocumentAnalyzer::new(Arc::new(model), synthesizer))
    }

    /// Full startup path: load the configured training set (or the
    /// reference phrases), train, validate. Any error here is fatal.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let examples = match &config.classifier.training_path {
            Some(path) => load_training_set(path)?,
            None => reference_examples(),
        };

        let analyzer = Self::from_examples(&examples, config)
            .context("Failed to initialize document analyzer")?;

        info!(
            examples = examples.len(),
            vocabulary = analyzer.model.vocabulary_size(),
            "document analyzer ready"
        );
        Ok(analyzer)
    }

    pub fn model(&self) -> &Arc<TrainedModel> {
        &self.model
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    /// Analyze with fresh (non-reproducible) analytics
    pub fn analyze(&self, text: &str) -> PipelineResult<ResponsePayload> {
        self.analyze_with_seed(text, None)
    }

    /// Analyze with analytics drawn from `seed` when given
    pub fn analyze_with_seed(&self, text: &str, seed: Option<u64>) -> PipelineResult<ResponsePayload> {
        let entities = extract(text, &self.model);
        let analytics = self.synthesizer.synthesize(seed);
        compose(entities, analytics)
    }

    pub fn analyze_seeded(&self, text: &str, seed: u64) -> PipelineResult<ResponsePayload> {
        self.analyze_with_seed(text, Some(seed))
    }

    /// Merged multi-token entity spans
    pub fn spans(&self, text: &str) -> Vec<EntitySpan> {
        extract_spans(text, &self.model)
    }
}
