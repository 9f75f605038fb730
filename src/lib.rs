// Doc Insight - Core Library
// Document entity extraction and analytics synthesis.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod error;
pub mod tokenizer;
pub mod classifier;
pub mod training;
pub mod extractor;
pub mod spans;      // Span merging over the classified token stream
pub mod analytics;
pub mod response;
pub mod pipeline;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{PipelineError, PipelineResult};
pub use tokenizer::{tokenize, TokenShape, Tokenizer};
pub use classifier::{
    classify, train, token_features,
    Category, ClassifierParams, TrainedModel, TrainingExample,
};
pub use training::{
    load_training_set, parse_training_csv, parse_training_json, reference_examples,
};
pub use extractor::{classify_tokens, extract, ClassifiedToken, EntityBucket};
pub use spans::{extract_spans, merge_spans, EntitySpan};
pub use analytics::{
    AnalysisType, AnalyticsPayload, Bounds, DocumentRecord, EntityDistribution,
    FraudRiskDistribution, HistoryRecord, Synthesizer, SynthesizerConfig, TransactionSummary,
    FRAUD_RISK_TOTAL, RISK_BUCKET_LABELS, TREND_LABELS,
};
pub use response::{compose, ResponsePayload};
pub use pipeline::DocumentAnalyzer;
pub use config::{AppConfig, ClassifierConfig, ServerConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
