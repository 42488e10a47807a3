mod engine;
mod metrics;
mod recommend;
mod sampler;
mod scenario;
mod types;

pub use engine::{
    Phase, Progress, build_summary, run_simulation, run_simulation_with_observer,
    run_simulation_with_source,
};
pub use metrics::compute_risk_metrics;
pub use recommend::recommendations;
pub use sampler::{RandomSource, Rng, sample_bounded};
pub use scenario::{
    LOW_RISK_SUSTAINABILITY, MEDIUM_RISK_SUSTAINABILITY, ScenarioOutcome, YIELD_INTERVAL,
    draw_economics, evaluate_scenario, generate_scenarios, risk_tier_for,
};
pub use types::{
    ConfidenceLevel, DistributionRange, EconomicDraw, MarketScenario, RiskMetrics, RiskTier,
    SimulationError, SimulationParameters, SimulationResult, SimulationSummary, TailValues,
};
