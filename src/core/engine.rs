use super::metrics::{compute_risk_metrics, mean, median_sorted, population_std_dev};
use super::recommend::recommendations;
use super::sampler::{RandomSource, Rng};
use super::scenario::{LOW_RISK_SUSTAINABILITY, generate_scenarios};
use super::types::{
    MarketScenario, SimulationError, SimulationParameters, SimulationResult, SimulationSummary,
};

/// Where a run currently is. Idle is "not yet called"; Done and Failed are
/// the returned `Result`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Phase {
    Generating,
    Aggregating,
}

/// Progress report handed to the observer at every suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub phase: Phase,
    pub completed: u32,
    pub total: u32,
}

/// Runs one complete simulation: validate, generate the scenario
/// population, reduce it into summary statistics, risk metrics, and
/// recommendations.
pub fn run_simulation(
    params: &SimulationParameters,
    base_pension: f64,
) -> Result<SimulationResult, SimulationError> {
    run_simulation_with_observer(params, base_pension, &mut |_| true)
}

/// Like [`run_simulation`] but with a cooperative-yield observer. The
/// observer is invoked every 100 generated scenarios and once before
/// aggregation; returning `false` cancels the run with no partial results.
/// The observer is the host seam: an event-loop host can pump its queue
/// there, a worker host can check a cancellation flag.
pub fn run_simulation_with_observer(
    params: &SimulationParameters,
    base_pension: f64,
    observer: &mut dyn FnMut(Progress) -> bool,
) -> Result<SimulationResult, SimulationError> {
    let mut rng = Rng::new(params.seed);
    run_simulation_with_source(params, base_pension, &mut rng, observer)
}

/// Full-control entry point: caller supplies the random source. Two
/// concurrent runs share no state; every value lives in the arguments and
/// the returned result.
pub fn run_simulation_with_source<R: RandomSource + ?Sized>(
    params: &SimulationParameters,
    base_pension: f64,
    rng: &mut R,
    observer: &mut dyn FnMut(Progress) -> bool,
) -> Result<SimulationResult, SimulationError> {
    params.validate()?;
    if !base_pension.is_finite() || base_pension < 0.0 {
        return Err(SimulationError::InvalidParameters(
            "base pension must be finite and >= 0".to_string(),
        ));
    }

    let total = params.iterations;
    let scenarios = generate_scenarios(params, base_pension, rng, &mut |completed| {
        observer(Progress {
            phase: Phase::Generating,
            completed,
            total,
        })
    })?;

    if !observer(Progress {
        phase: Phase::Aggregating,
        completed: total,
        total,
    }) {
        return Err(SimulationError::Cancelled);
    }

    let summary = build_summary(&scenarios);
    let risk_metrics = compute_risk_metrics(&scenarios);
    let recommendations = recommendations(&risk_metrics);

    Ok(SimulationResult {
        summary,
        scenarios,
        risk_metrics,
        recommendations,
    })
}

/// Reduces the population into the headline summary. Success means
/// sustainability strictly above 0.7; all income statistics are taken over
/// net income.
pub fn build_summary(scenarios: &[MarketScenario]) -> SimulationSummary {
    let net_incomes: Vec<f64> = scenarios.iter().map(|s| s.net_income).collect();
    let mut sorted = net_incomes.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let total = scenarios.len() as u32;
    let successful = scenarios
        .iter()
        .filter(|s| s.sustainability > LOW_RISK_SUSTAINABILITY)
        .count() as u32;
    let average = mean(&net_incomes);

    SimulationSummary {
        total_scenarios: total,
        successful_scenarios: successful,
        success_rate: if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64
        },
        average_income: average,
        median_income: median_sorted(&sorted),
        worst_case_income: sorted.first().copied().unwrap_or(0.0),
        best_case_income: sorted.last().copied().unwrap_or(0.0),
        volatility: population_std_dev(&net_incomes, average),
    }
}
