// 📦 Response Composer - entities + analytics in one payload

use crate::analytics::AnalyticsPayload;
use crate::error::{PipelineError, PipelineResult};
use crate::extractor::EntityBucket;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The unit returned per upload. Analytics fields sit at the top level next
/// to `entities`, which is what the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePayload {
    pub entities: EntityBucket,
    #[serde(flatten)]
    pub analytics: AnalyticsPayload,
}

/// Merge extraction output with synthesized analytics, re-checking invariants
pub fn compose(entities: EntityBucket, analytics: AnalyticsPayload) -> PipelineResult<ResponsePayload> {
    if !entities.has_stable_keys() {
        let message = format!(
            "entity buckets must be exactly the six entity categories, got {:?}",
            entities.categories()
        );
        warn!("{}", message);
        return Err(PipelineError::InvariantViolation(message));
    }

    if let Err(err) = analytics.validate() {
        warn!(error = %err, "synthesized analytics failed validation");
        return Err(err);
    }

    Ok(ResponsePayload {
        entities,
        analytics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{Synthesizer, SynthesizerConfig};
    use crate::classifier::Category;

    fn analytics(seed: u64) -> AnalyticsPayload {
        Synthesizer::new(SynthesizerConfig::default())
            .unwrap()
            .synthesize(Some(seed))
    }

    #[test]
    fn test_compose_keeps_both_halves() {
        let mut entities = EntityBucket::new();
        entities.push(Category::Money, "$120,000");
        let analytics = analytics(1);

        let response = compose(entities.clone(), analytics.clone()).unwrap();
        assert_eq!(response.entities, entities);
        assert_eq!(response.analytics, analytics);
    }

    #[test]
    fn test_compose_rejects_inconsistent_analytics() {
        let mut analytics = analytics(2);
        analytics.fraud_risk.low += 5;

        let err = compose(EntityBucket::new(), analytics).unwrap_err();
        assert!(matches!(err, PipelineError::InvariantViolation(_)));
    }

    #[test]
    fn test_compose_rejects_missing_bucket_keys() {
        let entities: EntityBucket = serde_json::from_str(r#"{"MONEY": ["$5"]}"#).unwrap();

        let err = compose(entities, analytics(3)).unwrap_err();
        assert!(matches!(err, PipelineError::InvariantViolation(_)));
    }

    #[test]
    fn test_flattened_wire_format() {
        let response = compose(EntityBucket::new(), analytics(4)).unwrap();
        let json = serde_json::to_value(&response).unwrap();

        let object = json.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "analysisHistory",
                "entities",
                "entityDistribution",
                "fraudRisk",
                "recentDocuments",
                "riskDistribution",
                "transactionSummary",
                "transactionTrends",
            ]
        );

        for category in Category::ENTITY_CATEGORIES {
            assert!(json["entities"][category.as_str()].as_array().unwrap().is_empty());
        }
        assert_eq!(json["transactionTrends"].as_array().unwrap().len(), 6);
        assert_eq!(json["riskDistribution"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_response_round_trips_through_json() {
        let response = compose(EntityBucket::new(), analytics(5)).unwrap();
        let json = serde_json::to_string(&response).unwrap();
        let back: ResponsePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.analytics.fraud_risk, response.analytics.fraud_risk);
        assert_eq!(back.entities, response.entities);
    }
}
