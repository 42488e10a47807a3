use super::types::RiskMetrics;

/// A negative 95% VaR means the worst 5% of scenarios lose money outright.
const VAR_WARNING_THRESHOLD: f64 = 0.0;
/// Below this Sharpe ratio the reward per unit of volatility is poor.
const SHARPE_WARNING_THRESHOLD: f64 = 1.0;
/// Peak-to-trough declines beyond this fraction warrant trimming exposure.
const DRAWDOWN_WARNING_THRESHOLD: f64 = 0.2;

/// Maps risk statistics into guidance strings. The checks are independent;
/// any subset of the messages can be emitted.
pub fn recommendations(metrics: &RiskMetrics) -> Vec<String> {
    let mut out = Vec::new();

    if metrics.value_at_risk.p95 < VAR_WARNING_THRESHOLD {
        out.push(
            "Downside scenarios show negative net income; consider risk-reduction \
             strategies such as increasing guaranteed income sources."
                .to_string(),
        );
    }

    if metrics.sharpe_ratio < SHARPE_WARNING_THRESHOLD {
        out.push(
            "Risk-adjusted returns are low; consider rebalancing the risk/return \
             mix of the underlying portfolio."
                .to_string(),
        );
    }

    if metrics.maximum_drawdown > DRAWDOWN_WARNING_THRESHOLD {
        out.push(
            "Projected drawdowns exceed 20% of peak income; consider limiting \
             exposure to volatile components."
                .to_string(),
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TailValues;

    fn metrics(var95: f64, sharpe: f64, max_drawdown: f64) -> RiskMetrics {
        RiskMetrics {
            value_at_risk: TailValues {
                p95: var95,
                p99: var95,
            },
            conditional_value_at_risk: TailValues {
                p95: var95,
                p99: var95,
            },
            sharpe_ratio: sharpe,
            sortino_ratio: sharpe,
            maximum_drawdown: max_drawdown,
            calmar_ratio: 1.0,
            ulcer_index: 0.05,
        }
    }

    #[test]
    fn healthy_metrics_emit_no_guidance() {
        assert!(recommendations(&metrics(5_000.0, 1.5, 0.1)).is_empty());
    }

    #[test]
    fn each_threshold_triggers_independently() {
        let only_var = recommendations(&metrics(-1.0, 1.5, 0.1));
        assert_eq!(only_var.len(), 1);
        assert!(only_var[0].contains("risk-reduction"));

        let only_sharpe = recommendations(&metrics(5_000.0, 0.9, 0.1));
        assert_eq!(only_sharpe.len(), 1);
        assert!(only_sharpe[0].contains("risk/return"));

        let only_drawdown = recommendations(&metrics(5_000.0, 1.5, 0.25));
        assert_eq!(only_drawdown.len(), 1);
        assert!(only_drawdown[0].contains("volatile"));
    }

    #[test]
    fn all_thresholds_can_fire_together() {
        assert_eq!(recommendations(&metrics(-1.0, 0.5, 0.3)).len(), 3);
    }

    #[test]
    fn boundary_values_do_not_trigger() {
        // Thresholds are strict inequalities.
        assert!(recommendations(&metrics(0.0, 1.0, 0.2)).is_empty());
    }
}
