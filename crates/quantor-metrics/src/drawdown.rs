/// Maximum peak-to-trough decline, expressed as a positive fraction.
/// Timeframe-agnostic: operates on whatever bar size the equity curve is in.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut running_max = equity_curve[0];
    let mut worst = 0.0_f64;
    for &value in equity_curve {
        running_max = running_max.max(value);
        if running_max != 0.0 {
            let drawdown = (value - running_max) / running_max;
            worst = worst.min(drawdown);
        }
    }
    -worst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_drawdown_on_monotonic_rise() {
        assert_eq!(max_drawdown(&[100.0, 110.0, 120.0]), 0.0);
    }

    #[test]
    fn drawdown_measured_from_prior_peak() {
        let curve = [100.0, 150.0, 75.0, 90.0];
        assert!((max_drawdown(&curve) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn single_point_has_no_drawdown() {
        assert_eq!(max_drawdown(&[100.0]), 0.0);
    }
}
