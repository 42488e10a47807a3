use super::types::{MarketScenario, RiskMetrics, TailValues};

/// Reduces the full scenario population into the aggregate risk statistics.
///
/// Pure function of the net-income sequence: identical input yields
/// bit-identical output, and the input order matters only to the drawdown
/// walk, which deliberately treats the population in generation order.
pub fn compute_risk_metrics(scenarios: &[MarketScenario]) -> RiskMetrics {
    let net_incomes: Vec<f64> = scenarios.iter().map(|s| s.net_income).collect();
    let mut sorted = net_incomes.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = mean(&net_incomes);
    let volatility = population_std_dev(&net_incomes, mean);

    let var95 = percentile_sorted(&sorted, 0.05);
    let var99 = percentile_sorted(&sorted, 0.01);

    let (maximum_drawdown, ulcer_index) = drawdown_profile(&net_incomes);

    RiskMetrics {
        value_at_risk: TailValues {
            p95: var95,
            p99: var99,
        },
        conditional_value_at_risk: TailValues {
            p95: tail_average(&sorted, var95),
            p99: tail_average(&sorted, var99),
        },
        sharpe_ratio: risk_ratio(mean, volatility),
        sortino_ratio: risk_ratio(mean, downside_deviation(&net_incomes, mean)),
        maximum_drawdown,
        calmar_ratio: risk_ratio(mean, maximum_drawdown),
        ulcer_index,
    }
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Middle element for odd lengths, average of the two middle elements for
/// even lengths. Expects an ascending-sorted slice.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Population standard deviation (divide by n, not n - 1).
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Index percentile over an ascending-sorted slice: `floor(p * n)`, clamped
/// to the last element so p near 1 cannot read out of bounds.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

/// Mean of all values at or below the threshold (the tail average behind
/// CVaR). The threshold is itself an element of the slice, so the tail is
/// never empty.
fn tail_average(sorted: &[f64], threshold: f64) -> f64 {
    let tail: Vec<f64> = sorted.iter().copied().take_while(|v| *v <= threshold).collect();
    mean(&tail)
}

/// Population RMS of deviations below the full-sample mean, over the
/// strictly-below subset only. Zero when no value falls below the mean.
fn downside_deviation(values: &[f64], mean: f64) -> f64 {
    let mut sum_sq = 0.0;
    let mut count = 0_usize;
    for v in values {
        if *v < mean {
            sum_sq += (v - mean) * (v - mean);
            count += 1;
        }
    }
    if count == 0 {
        return 0.0;
    }
    (sum_sq / count as f64).sqrt()
}

/// Running-peak walk in generation order. Returns the maximum drawdown and
/// the Ulcer index (RMS of the per-step drawdowns). A non-positive peak
/// contributes drawdown 0 rather than dividing by it.
fn drawdown_profile(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let mut peak = values[0];
    let mut max_drawdown = 0.0_f64;
    let mut sum_sq = 0.0;
    for v in values {
        peak = peak.max(*v);
        let drawdown = if peak > 0.0 { (peak - v) / peak } else { 0.0 };
        max_drawdown = max_drawdown.max(drawdown);
        sum_sq += drawdown * drawdown;
    }

    (max_drawdown, (sum_sq / values.len() as f64).sqrt())
}

/// Reward-per-risk ratio with the documented zero-denominator sentinel:
/// positive mean maps to `+inf`, negative mean to `-inf`, zero mean to 0.
fn risk_ratio(mean: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        mean / denominator
    } else if mean == 0.0 {
        0.0
    } else if mean > 0.0 {
        f64::INFINITY
    } else {
        f64::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EconomicDraw, RiskTier};
    use proptest::collection::vec;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn scenarios_from_net_incomes(net_incomes: &[f64]) -> Vec<MarketScenario> {
        let probability = 1.0 / net_incomes.len() as f64;
        net_incomes
            .iter()
            .enumerate()
            .map(|(i, net)| MarketScenario {
                id: format!("scenario_{i}"),
                probability,
                income: net + 1_000.0,
                expenses: 1_000.0,
                net_income: *net,
                sustainability: 0.5,
                risk_tier: RiskTier::Medium,
                drawn_parameters: EconomicDraw {
                    inflation: 0.02,
                    investment_return: 0.06,
                    gdp_growth: 0.02,
                },
            })
            .collect()
    }

    #[test]
    fn median_odd_length_is_middle_element() {
        assert_approx(median_sorted(&[1.0, 5.0, 9.0]), 5.0);
    }

    #[test]
    fn median_even_length_averages_middle_pair() {
        assert_approx(median_sorted(&[1.0, 3.0, 7.0, 9.0]), 5.0);
    }

    #[test]
    fn percentile_uses_floor_index_and_clamps_top() {
        let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_approx(percentile_sorted(&sorted, 0.0), 10.0);
        // floor(0.05 * 5) = 0
        assert_approx(percentile_sorted(&sorted, 0.05), 10.0);
        // floor(0.5 * 5) = 2
        assert_approx(percentile_sorted(&sorted, 0.5), 30.0);
        // floor(0.999 * 5) = 4
        assert_approx(percentile_sorted(&sorted, 0.999), 50.0);
        // floor(1.0 * 5) = 5 would read past the end without the clamp
        assert_approx(percentile_sorted(&sorted, 1.0), 50.0);
    }

    #[test]
    fn var_and_cvar_capture_the_left_tail() {
        // 100 values: 0, 10, 20, ..., 990
        let values: Vec<f64> = (0..100).map(|i| i as f64 * 10.0).collect();
        let scenarios = scenarios_from_net_incomes(&values);
        let metrics = compute_risk_metrics(&scenarios);

        // floor(0.05 * 100) = 5 -> 50; floor(0.01 * 100) = 1 -> 10
        assert_approx(metrics.value_at_risk.p95, 50.0);
        assert_approx(metrics.value_at_risk.p99, 10.0);
        // tail <= 50 is {0,10,20,30,40,50}; tail <= 10 is {0,10}
        assert_approx(metrics.conditional_value_at_risk.p95, 25.0);
        assert_approx(metrics.conditional_value_at_risk.p99, 5.0);
        assert!(metrics.conditional_value_at_risk.p95 <= metrics.value_at_risk.p95);
        assert!(metrics.conditional_value_at_risk.p99 <= metrics.value_at_risk.p99);
    }

    #[test]
    fn sharpe_and_sortino_use_population_deviations() {
        let values = [10.0, 20.0, 30.0, 40.0];
        let scenarios = scenarios_from_net_incomes(&values);
        let metrics = compute_risk_metrics(&scenarios);

        let mean = 25.0;
        // deviations +-15, +-5: sqrt((225 + 25 + 25 + 225) / 4)
        let volatility = (500.0_f64 / 4.0).sqrt();
        assert_approx(metrics.sharpe_ratio, mean / volatility);

        // below-mean subset {10, 20}: sqrt((225 + 25) / 2)
        let downside = (250.0_f64 / 2.0).sqrt();
        assert_approx(metrics.sortino_ratio, mean / downside);
    }

    #[test]
    fn drawdown_walk_tracks_running_peak_in_generation_order() {
        let values = [100.0, 80.0, 120.0, 60.0];
        let scenarios = scenarios_from_net_incomes(&values);
        let metrics = compute_risk_metrics(&scenarios);

        // peaks 100, 100, 120, 120 -> drawdowns 0, 0.2, 0, 0.5
        assert_approx(metrics.maximum_drawdown, 0.5);
        assert_approx(metrics.ulcer_index, (0.0725_f64).sqrt());
        assert_approx(metrics.calmar_ratio, 90.0 / 0.5);
    }

    #[test]
    fn constant_positive_population_hits_every_sentinel() {
        let scenarios = scenarios_from_net_incomes(&[500.0; 8]);
        let metrics = compute_risk_metrics(&scenarios);

        assert_eq!(metrics.sharpe_ratio, f64::INFINITY);
        assert_eq!(metrics.sortino_ratio, f64::INFINITY);
        assert_eq!(metrics.calmar_ratio, f64::INFINITY);
        assert_approx(metrics.maximum_drawdown, 0.0);
        assert_approx(metrics.ulcer_index, 0.0);
    }

    #[test]
    fn all_zero_population_yields_zero_ratios() {
        let scenarios = scenarios_from_net_incomes(&[0.0; 6]);
        let metrics = compute_risk_metrics(&scenarios);
        assert_approx(metrics.sharpe_ratio, 0.0);
        assert_approx(metrics.sortino_ratio, 0.0);
        assert_approx(metrics.calmar_ratio, 0.0);
    }

    #[test]
    fn negative_mean_with_zero_downside_spread_is_negative_infinity() {
        // Constant negative net income: no value strictly below the mean.
        let scenarios = scenarios_from_net_incomes(&[-100.0; 4]);
        let metrics = compute_risk_metrics(&scenarios);
        assert_eq!(metrics.sortino_ratio, f64::NEG_INFINITY);
    }

    #[test]
    fn compute_is_idempotent() {
        let values: Vec<f64> = (0..257).map(|i| ((i * 37) % 101) as f64 - 50.0).collect();
        let scenarios = scenarios_from_net_incomes(&values);
        let first = compute_risk_metrics(&scenarios);
        let second = compute_risk_metrics(&scenarios);
        assert_eq!(first, second);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]
        #[test]
        fn percentile_is_monotone_in_p(values in vec(-1e6_f64..1e6, 1..200)) {
            let mut sorted = values;
            sorted.sort_by(|a, b| a.total_cmp(b));
            let p0 = percentile_sorted(&sorted, 0.0);
            let p50 = percentile_sorted(&sorted, 0.5);
            let p999 = percentile_sorted(&sorted, 0.999);
            prop_assert!(p0 <= p50);
            prop_assert!(p50 <= p999);
        }

        #[test]
        fn drawdowns_stay_in_unit_range_for_positive_series(
            values in vec(1.0_f64..1e6, 1..200),
        ) {
            let scenarios = scenarios_from_net_incomes(&values);
            let metrics = compute_risk_metrics(&scenarios);
            prop_assert!(metrics.maximum_drawdown >= 0.0 && metrics.maximum_drawdown < 1.0);
            prop_assert!(metrics.ulcer_index >= 0.0 && metrics.ulcer_index <= 1.0);
        }
    }
}
