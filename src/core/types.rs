use std::fmt;

use serde::Serialize;

/// One stochastic macro-economic input: a normal distribution truncated to
/// `[min, max]`. Invariant: `min <= mean <= max` and `std_dev >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionRange {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl DistributionRange {
    pub fn validate(&self, label: &str) -> Result<(), SimulationError> {
        let values = [self.min, self.max, self.mean, self.std_dev];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SimulationError::InvalidParameters(format!(
                "{label} range must be finite"
            )));
        }
        if self.min > self.mean || self.mean > self.max {
            return Err(SimulationError::InvalidParameters(format!(
                "{label} range must satisfy min <= mean <= max"
            )));
        }
        if self.std_dev < 0.0 {
            return Err(SimulationError::InvalidParameters(format!(
                "{label} standard deviation must be >= 0"
            )));
        }
        Ok(())
    }
}

/// Confidence level for the tail statistics. Only the three supported levels
/// are representable.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfidenceLevel {
    Ninety,
    NinetyFive,
    NinetyNine,
}

impl ConfidenceLevel {
    pub fn value(self) -> f64 {
        match self {
            ConfidenceLevel::Ninety => 0.90,
            ConfidenceLevel::NinetyFive => 0.95,
            ConfidenceLevel::NinetyNine => 0.99,
        }
    }

    pub fn from_value(value: f64) -> Option<Self> {
        if (value - 0.90).abs() < 1e-9 {
            Some(ConfidenceLevel::Ninety)
        } else if (value - 0.95).abs() < 1e-9 {
            Some(ConfidenceLevel::NinetyFive)
        } else if (value - 0.99).abs() < 1e-9 {
            Some(ConfidenceLevel::NinetyNine)
        } else {
            None
        }
    }
}

/// Immutable input to one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationParameters {
    pub inflation: DistributionRange,
    pub investment_return: DistributionRange,
    pub gdp_growth: DistributionRange,
    pub iterations: u32,
    pub time_horizon_years: u32,
    pub confidence_level: ConfidenceLevel,
    pub seed: u64,
}

impl SimulationParameters {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.iterations == 0 {
            return Err(SimulationError::InvalidParameters(
                "iterations must be > 0".to_string(),
            ));
        }
        if self.time_horizon_years == 0 {
            return Err(SimulationError::InvalidParameters(
                "time horizon must be > 0 years".to_string(),
            ));
        }
        self.inflation.validate("inflation")?;
        self.investment_return.validate("investment return")?;
        self.gdp_growth.validate("GDP growth")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// One sampled triple of economic factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicDraw {
    pub inflation: f64,
    pub investment_return: f64,
    pub gdp_growth: f64,
}

/// One evaluated scenario. Built once per iteration, never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketScenario {
    pub id: String,
    pub probability: f64,
    pub income: f64,
    pub expenses: f64,
    pub net_income: f64,
    pub sustainability: f64,
    pub risk_tier: RiskTier,
    pub drawn_parameters: EconomicDraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailValues {
    pub p95: f64,
    pub p99: f64,
}

/// Aggregate downside-risk statistics over one scenario population.
///
/// Ratios with a zero denominator carry the documented sentinel: positive
/// mean gives `+inf`, negative mean `-inf`, zero mean `0.0`. serde_json
/// renders non-finite doubles as `null` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskMetrics {
    pub value_at_risk: TailValues,
    pub conditional_value_at_risk: TailValues,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub maximum_drawdown: f64,
    pub calmar_ratio: f64,
    pub ulcer_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub total_scenarios: u32,
    pub successful_scenarios: u32,
    pub success_rate: f64,
    pub average_income: f64,
    pub median_income: f64,
    pub worst_case_income: f64,
    pub best_case_income: f64,
    pub volatility: f64,
}

/// Everything one run produces. Owned exclusively by the caller once
/// returned; nothing in the core retains state across runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub summary: SimulationSummary,
    pub scenarios: Vec<MarketScenario>,
    pub risk_metrics: RiskMetrics,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Invalid `SimulationParameters`; rejected before generation begins.
    InvalidParameters(String),
    /// A non-finite value appeared mid-loop. The run aborts with no partial
    /// results.
    Computation(String),
    /// The progress observer requested cancellation.
    Cancelled,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidParameters(msg) => {
                write!(f, "invalid simulation parameters: {msg}")
            }
            SimulationError::Computation(msg) => write!(f, "computation failed: {msg}"),
            SimulationError::Cancelled => write!(f, "simulation cancelled"),
        }
    }
}

impl std::error::Error for SimulationError {}
