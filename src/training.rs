// 📚 Training Sets - reference phrases and file loaders
//
// Loaders accept JSON ([{"text": ..., "category": ...}]) or CSV with a
// `text,category` header. Category labels are case-insensitive.

use crate::classifier::{Category, TrainingExample};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::Path;

/// The six phrases the service has always shipped with
pub fn reference_examples() -> Vec<TrainingExample> {
    vec![
        TrainingExample::new("John Smith works at Apple Inc.", Category::Person),
        TrainingExample::new("Microsoft Corporation reported earnings", Category::Organization),
        TrainingExample::new("New York office", Category::Location),
        TrainingExample::new("January 15, 2024", Category::Date),
        TrainingExample::new("$120,000", Category::Money),
        TrainingExample::new("25%", Category::Percent),
    ]
}

#[derive(Debug, Deserialize)]
struct RawExample {
    text: String,
    category: String,
}

impl RawExample {
    fn into_example(self, position: usize) -> Result<TrainingExample> {
        let category = Category::parse(&self.category).ok_or_else(|| {
            anyhow!(
                "Unknown category {:?} in training example {}",
                self.category,
                position + 1
            )
        })?;
        Ok(TrainingExample::new(self.text, category))
    }
}

/// Parse a JSON training set
pub fn parse_training_json(content: &str) -> Result<Vec<TrainingExample>> {
    let raw: Vec<RawExample> =
        serde_json::from_str(content).context("Failed to parse training set JSON")?;

    raw.into_iter()
        .enumerate()
        .map(|(i, r)| r.into_example(i))
        .collect()
}

/// Parse a CSV training set from any reader
pub fn parse_training_csv<R: Read>(reader: R) -> Result<Vec<TrainingExample>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut examples = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let raw: RawExample = result.context("Failed to deserialize training example")?;
        examples.push(raw.into_example(i)?);
    }

    Ok(examples)
}

/// Load a training set, picking the format from the file extension
pub fn load_training_set<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingExample>> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open training set: {:?}", path))?;
        parse_training_csv(file)
    } else {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read training set: {:?}", path))?;
        parse_training_json(&content)
    }
}

// ============================================================================
// TESTS
// ============================================================================
