use super::sampler::{RandomSource, sample_bounded};
use super::types::{
    EconomicDraw, MarketScenario, RiskTier, SimulationError, SimulationParameters,
};

/// Sustainability at or above this fraction marks a low-risk scenario.
pub const LOW_RISK_SUSTAINABILITY: f64 = 0.7;
/// Sustainability at or above this fraction (but below the low-risk bound)
/// marks a medium-risk scenario.
pub const MEDIUM_RISK_SUSTAINABILITY: f64 = 0.4;

/// The generation loop reports progress after every block of this many
/// iterations so a cooperative host can yield.
pub const YIELD_INTERVAL: u32 = 100;

#[derive(Debug, Clone, Copy)]
pub struct ScenarioOutcome {
    pub income: f64,
    pub expenses: f64,
    pub net_income: f64,
    pub sustainability: f64,
    pub risk_tier: RiskTier,
}

/// Samples one independent triple of economic factors. No cross-factor
/// correlation is modeled.
pub fn draw_economics<R: RandomSource + ?Sized>(
    params: &SimulationParameters,
    rng: &mut R,
) -> EconomicDraw {
    EconomicDraw {
        inflation: sample_bounded(&params.inflation, rng),
        investment_return: sample_bounded(&params.investment_return, rng),
        gdp_growth: sample_bounded(&params.gdp_growth, rng),
    }
}

/// Maps one economic draw plus the baseline pension into a scenario outcome.
///
/// Fixed-point formulas; a zero adjusted income would make the
/// sustainability division undefined, so that case is pinned to
/// sustainability 0 and the high risk tier.
pub fn evaluate_scenario(base_pension: f64, draw: &EconomicDraw) -> ScenarioOutcome {
    let market_adjustment = 1.0 + (draw.investment_return - draw.inflation) * 0.1;
    let economic_adjustment = 1.0 + draw.gdp_growth * 0.05;
    let adjusted_income = base_pension * market_adjustment * economic_adjustment;

    let expenses = adjusted_income * (0.3 + draw.inflation * 0.5);
    let net_income = adjusted_income - expenses;

    let sustainability = if adjusted_income == 0.0 {
        0.0
    } else {
        (net_income / adjusted_income).clamp(0.0, 1.0)
    };

    ScenarioOutcome {
        income: adjusted_income,
        expenses,
        net_income,
        sustainability,
        risk_tier: risk_tier_for(sustainability),
    }
}

pub fn risk_tier_for(sustainability: f64) -> RiskTier {
    if sustainability >= LOW_RISK_SUSTAINABILITY {
        RiskTier::Low
    } else if sustainability >= MEDIUM_RISK_SUSTAINABILITY {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

/// Produces the full scenario population: `iterations` i.i.d. draws, each
/// equally likely by construction. `tick` receives the completed count every
/// [`YIELD_INTERVAL`] iterations; returning `false` cancels the run.
pub fn generate_scenarios<R: RandomSource + ?Sized>(
    params: &SimulationParameters,
    base_pension: f64,
    rng: &mut R,
    tick: &mut dyn FnMut(u32) -> bool,
) -> Result<Vec<MarketScenario>, SimulationError> {
    let iterations = params.iterations;
    let probability = 1.0 / iterations as f64;
    let mut scenarios = Vec::with_capacity(iterations as usize);

    for i in 0..iterations {
        let draw = draw_economics(params, rng);
        let outcome = evaluate_scenario(base_pension, &draw);
        if !outcome.net_income.is_finite() || !outcome.income.is_finite() {
            return Err(SimulationError::Computation(format!(
                "scenario {i} produced a non-finite income"
            )));
        }

        scenarios.push(MarketScenario {
            id: format!("scenario_{i}"),
            probability,
            income: outcome.income,
            expenses: outcome.expenses,
            net_income: outcome.net_income,
            sustainability: outcome.sustainability,
            risk_tier: outcome.risk_tier,
            drawn_parameters: draw,
        });

        let completed = i + 1;
        if completed % YIELD_INTERVAL == 0 && completed < iterations && !tick(completed) {
            return Err(SimulationError::Cancelled);
        }
    }

    Ok(scenarios)
}
