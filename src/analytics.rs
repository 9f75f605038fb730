// 📊 Analytics Synthesizer - bounded summary figures for the dashboard
//
// Every field is drawn from a configured half-open range [min, max). Money
// and trend figures are drawn as whole minor units, so rounding to the
// configured precision never reaches max. The random source is injected, so a
// seeded StdRng reproduces a payload exactly.
//
// Invariants of every payload:
// - fraud low + medium + high == 100
// - net == income - expenses (computed in minor units, then scaled)
// - 6 trend values, 5 risk buckets (enforced by the array types)

use crate::error::{PipelineError, PipelineResult};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Fraud risk percentages always add up to this
pub const FRAUD_RISK_TOTAL: u32 = 100;

pub const TREND_MONTHS: usize = 6;

pub const RISK_BUCKETS: usize = 5;

/// One trend value per month label
pub const TREND_LABELS: [&str; TREND_MONTHS] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

/// Risk-score histogram buckets
pub const RISK_BUCKET_LABELS: [&str; RISK_BUCKETS] = ["0-20", "21-40", "41-60", "61-80", "81-100"];

/// Longest document or history list a config may ask for
pub const MAX_LIST_LEN: usize = 100;

pub const MAX_DECIMAL_PLACES: u32 = 6;

/// Longest lookback for synthesized timestamps
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Largest money or trend bound, in minor units; keeps every drawn figure an
/// exact integer in f64 with headroom for the net check
pub const MAX_MINOR_UNITS: f64 = 281_474_976_710_656.0;

/// Net may differ from income - expenses by this many ulps of the larger figure
const NET_ULPS: f64 = 4.0;

// ============================================================================
// BOUNDS
// ============================================================================

/// Half-open range [min, max). When min == max the draw is always min.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: T,
    pub max: T,
}

impl<T> Bounds<T> {
    pub const fn new(min: T, max: T) -> Self {
        Bounds { min, max }
    }
}

/// `value * scale` rounded up to a whole minor unit, snapping float noise
/// (1.15 * 100 = 114.99999999999999) onto the grid first
fn ceil_minor_units(value: f64, scale: f64) -> f64 {
    let units = value * scale;
    let nearest = units.round();
    if (units - nearest).abs() <= 2.0 * f64::EPSILON * units.abs().max(1.0) {
        nearest
    } else {
        units.ceil()
    }
}

impl Bounds<f64> {
    fn check(&self, field: &str, decimal_places: u32) -> PipelineResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(config_error(format!("{field} bounds must be finite")));
        }
        if self.min < 0.0 {
            return Err(config_error(format!(
                "{field} minimum must not be negative, got {}",
                self.min
            )));
        }
        if self.min > self.max {
            return Err(config_error(format!(
                "{field} range is inverted: [{}, {})",
                self.min, self.max
            )));
        }

        let scale = minor_unit_scale(decimal_places);
        let (lo, hi) = (ceil_minor_units(self.min, scale), ceil_minor_units(self.max, scale));
        if hi > MAX_MINOR_UNITS {
            return Err(config_error(format!(
                "{field} maximum {} exceeds {MAX_MINOR_UNITS} minor units at {decimal_places} decimal places",
                self.max
            )));
        }
        if self.min < self.max && lo >= hi {
            return Err(config_error(format!(
                "{field} range [{}, {}) holds no value at {decimal_places} decimal places",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Draw a whole number of minor units in [min, max); validated bounds only
    fn draw_minor_units<R: Rng + ?Sized>(&self, rng: &mut R, scale: f64) -> i64 {
        if self.min >= self.max {
            (self.min * scale).round() as i64
        } else {
            let lo = ceil_minor_units(self.min, scale) as i64;
            let hi = ceil_minor_units(self.max, scale) as i64;
            rng.gen_range(lo..hi)
        }
    }
}

/// Integer bounds are read as i64 so negative counts in a config file reach
/// `validate` and fail as configuration errors
impl Bounds<i64> {
    fn check(&self, field: &str) -> PipelineResult<()> {
        if self.min < 0 {
            return Err(config_error(format!(
                "{field} minimum must not be negative, got {}",
                self.min
            )));
        }
        if self.max > i64::from(u32::MAX) {
            return Err(config_error(format!(
                "{field} maximum must be at most {}, got {}",
                u32::MAX,
                self.max
            )));
        }
        if self.min > self.max {
            return Err(config_error(format!(
                "{field} range is inverted: [{}, {})",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Largest value a draw can produce
    pub fn highest(&self) -> i64 {
        if self.min >= self.max {
            self.min
        } else {
            self.max - 1
        }
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        let value = if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        };
        // checked against [0, u32::MAX] by `check`
        value as u32
    }
}

fn minor_unit_scale(decimal_places: u32) -> f64 {
    10_f64.powi(decimal_places as i32)
}

fn config_error(message: String) -> PipelineError {
    PipelineError::Configuration(message)
}

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisType {
    #[serde(rename = "NER Analysis")]
    NerAnalysis,
    #[serde(rename = "Fraud Detection")]
    FraudDetection,
    #[serde(rename = "Transaction Analysis")]
    TransactionAnalysis,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 3] = [
        AnalysisType::NerAnalysis,
        AnalysisType::FraudDetection,
        AnalysisType::TransactionAnalysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::NerAnalysis => "NER Analysis",
            AnalysisType::FraudDetection => "Fraud Detection",
            AnalysisType::TransactionAnalysis => "Transaction Analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    pub income: Bounds<f64>,
    pub expenses: Bounds<f64>,

    /// Low-risk share; high risk takes whatever low and medium leave
    pub fraud_low: Bounds<i64>,
    /// Medium-risk share, capped per draw at 100 - low
    pub fraud_medium: Bounds<i64>,

    pub organizations: Bounds<i64>,
    pub people: Bounds<i64>,
    pub locations: Bounds<i64>,
    pub dates: Bounds<i64>,

    pub trend_value: Bounds<f64>,
    pub risk_bucket: Bounds<i64>,

    pub document_count: usize,
    pub history_count: usize,

    /// Timestamps fall within this many days before "now"
    pub window_days: u32,

    pub analysis_types: Vec<AnalysisType>,

    /// Precision of monetary and trend figures
    pub decimal_places: u32,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        SynthesizerConfig {
            income: Bounds::new(50_000.0, 100_000.0),
            expenses: Bounds::new(30_000.0, 60_000.0),
            fraud_low: Bounds::new(60, 80),
            fraud_medium: Bounds::new(15, 30),
            organizations: Bounds::new(20, 50),
            people: Bounds::new(15, 40),
            locations: Bounds::new(10, 30),
            dates: Bounds::new(5, 20),
            trend_value: Bounds::new(100.0, 200.0),
            risk_bucket: Bounds::new(5, 20),
            document_count: 5,
            history_count: 5,
            window_days: 30,
            analysis_types: AnalysisType::ALL.to_vec(),
            decimal_places: 2,
        }
    }
}

impl SynthesizerConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        // Money bounds are checked in minor units, so precision comes first
        if self.decimal_places > MAX_DECIMAL_PLACES {
            return Err(config_error(format!(
                "decimal_places must be at most {MAX_DECIMAL_PLACES}, got {}",
                self.decimal_places
            )));
        }

        self.income.check("income", self.decimal_places)?;
        self.expenses.check("expenses", self.decimal_places)?;
        self.trend_value.check("trend_value", self.decimal_places)?;

        self.fraud_low.check("fraud_low")?;
        self.fraud_medium.check("fraud_medium")?;
        self.organizations.check("organizations")?;
        self.people.check("people")?;
        self.locations.check("locations")?;
        self.dates.check("dates")?;
        self.risk_bucket.check("risk_bucket")?;

        // The medium draw is capped, so only its minimum must always fit
        let worst_case = self.fraud_low.highest() + self.fraud_medium.min;
        if worst_case > i64::from(FRAUD_RISK_TOTAL) {
            return Err(config_error(format!(
                "fraud_low maximum plus fraud_medium minimum is {worst_case}, above {FRAUD_RISK_TOTAL}"
            )));
        }

        if self.document_count > MAX_LIST_LEN || self.history_count > MAX_LIST_LEN {
            return Err(config_error(format!(
                "document and history lists are limited to {MAX_LIST_LEN} entries"
            )));
        }

        if self.history_count > 0 && self.analysis_types.is_empty() {
            return Err(config_error(
                "analysis_types must not be empty when history entries are requested".to_string(),
            ));
        }

        if self.window_days > MAX_WINDOW_DAYS {
            return Err(config_error(format!(
                "window_days must be at most {MAX_WINDOW_DAYS}, got {}",
                self.window_days
            )));
        }

        Ok(())
    }
}

// ============================================================================
// PAYLOAD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

impl TransactionSummary {
    /// Build from integer minor units (cents at 2 decimal places)
    pub fn from_minor_units(income: i64, expenses: i64, decimal_places: u32) -> Self {
        let scale = minor_unit_scale(decimal_places);
        TransactionSummary {
            income: income as f64 / scale,
            expenses: expenses as f64 / scale,
            net: (income - expenses) as f64 / scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudRiskDistribution {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

impl FraudRiskDistribution {
    pub fn total(&self) -> u32 {
        self.low + self.medium + self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDistribution {
    pub organizations: u32,
    pub people: u32,
    pub locations: u32,
    pub dates: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub document_name: String,
    pub analysis_type: AnalysisType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPayload {
    pub transaction_summary: TransactionSummary,
    pub fraud_risk: FraudRiskDistribution,
    pub entity_distribution: EntityDistribution,
    pub transaction_trends: [f64; TREND_MONTHS],
    pub risk_distribution: [u32; RISK_BUCKETS],
    pub recent_documents: Vec<DocumentRecord>,
    pub analysis_history: Vec<HistoryRecord>,
}

impl AnalyticsPayload {
    /// Every broken invariant, described; empty when the payload is consistent
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let fraud = &self.fraud_risk;
        if fraud.total() != FRAUD_RISK_TOTAL {
            violations.push(format!(
                "fraud risk {} + {} + {} = {}, expected {}",
                fraud.low,
                fraud.medium,
                fraud.high,
                fraud.total(),
                FRAUD_RISK_TOTAL
            ));
        }

        let summary = &self.transaction_summary;
        let figures = [summary.income, summary.expenses, summary.net];
        if figures.iter().any(|v| !v.is_finite()) {
            violations.push("transaction summary contains a non-finite value".to_string());
        } else if (summary.net - (summary.income - summary.expenses)).abs() > net_tolerance(summary) {
            violations.push(format!(
                "net {} != income {} - expenses {}",
                summary.net, summary.income, summary.expenses
            ));
        }

        if self.transaction_trends.iter().any(|v| !v.is_finite()) {
            violations.push("transaction trends contain a non-finite value".to_string());
        }

        if self.recent_documents.len() > MAX_LIST_LEN {
            violations.push(format!(
                "{} recent documents exceed the limit of {MAX_LIST_LEN}",
                self.recent_documents.len()
            ));
        }
        if self.analysis_history.len() > MAX_LIST_LEN {
            violations.push(format!(
                "{} history entries exceed the limit of {MAX_LIST_LEN}",
                self.analysis_history.len()
            ));
        }

        violations
    }

    pub fn validate(&self) -> PipelineResult<()> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::InvariantViolation(violations.join("; ")))
        }
    }
}

/// Float slack of `income - expenses` against a net scaled from minor units.
/// Within validated bounds this stays under half a minor unit at any precision.
fn net_tolerance(summary: &TransactionSummary) -> f64 {
    let magnitude = summary.income.abs().max(summary.expenses.abs()).max(1.0);
    NET_ULPS * f64::EPSILON * magnitude
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

/// Validated synthesizer; construction is the only fallible step
#[derive(Debug, Clone)]
pub struct Synthesizer {
    config: SynthesizerConfig,
}

impl Synthesizer {
    pub fn new(config: SynthesizerConfig) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Synthesizer { config })
    }

    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Seeded draws are reproducible; `None` uses the thread-local generator
    pub fn synthesize(&self, seed: Option<u64>) -> AnalyticsPayload {
        let now = Utc::now();
        match seed {
            Some(seed) => self.synthesize_with(&mut StdRng::seed_from_u64(seed), now),
            None => self.synthesize_with(&mut rand::thread_rng(), now),
        }
    }

    /// Draw a payload from `rng`, with timestamps counted back from `now`
    pub fn synthesize_with<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> AnalyticsPayload {
        let cfg = &self.config;
        let scale = minor_unit_scale(cfg.decimal_places);

        let income = cfg.income.draw_minor_units(rng, scale);
        let expenses = cfg.expenses.draw_minor_units(rng, scale);
        let transaction_summary =
            TransactionSummary::from_minor_units(income, expenses, cfg.decimal_places);

        let low = cfg.fraud_low.draw(rng);
        let room = FRAUD_RISK_TOTAL - low;
        let medium_max = cfg.fraud_medium.max.min(i64::from(room) + 1);
        let medium = Bounds::new(cfg.fraud_medium.min, medium_max).draw(rng);
        let fraud_risk = FraudRiskDistribution {
            low,
            medium,
            high: room.saturating_sub(medium),
        };

        let entity_distribution = EntityDistribution {
            organizations: cfg.organizations.draw(rng),
            people: cfg.people.draw(rng),
            locations: cfg.locations.draw(rng),
            dates: cfg.dates.draw(rng),
        };

        let transaction_trends =
            std::array::from_fn(|_| cfg.trend_value.draw_minor_units(rng, scale) as f64 / scale);
        let risk_distribution = std::array::from_fn(|_| cfg.risk_bucket.draw(rng));

        let recent_documents = (1..=cfg.document_count)
            .map(|n| DocumentRecord {
                name: document_name(n),
                date: self.past_timestamp(rng, now),
            })
            .collect();

        let analysis_history = (1..=cfg.history_count)
            .map(|n| HistoryRecord {
                date: self.past_timestamp(rng, now),
                document_name: document_name(n),
                analysis_type: cfg.analysis_types[rng.gen_range(0..cfg.analysis_types.len())],
            })
            .collect();

        AnalyticsPayload {
            transaction_summary,
            fraud_risk,
            entity_distribution,
            transaction_trends,
            risk_distribution,
            recent_documents,
            analysis_history,
        }
    }

    fn past_timestamp<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
        let window_ms = i64::from(self.config.window_days) * 24 * 60 * 60 * 1000;
        if window_ms == 0 {
            return now;
        }
        now - Duration::milliseconds(rng.gen_range(0..window_ms))
    }
}

fn document_name(n: usize) -> String {
    format!("Document_{n}.pdf")
}

// ============================================================================
// TESTS
// ============================================================================
