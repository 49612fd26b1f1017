//! Statistical analysis of aggregated simulation results: confidence
//! intervals, distribution metrics, a 2x2 chi-square independence test,
//! Cohen's d effect size, and power/sample-size approximations. All pure
//! functions over plain numbers; nothing here touches game state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceInterval {
    pub margin: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Wald interval for a proportion. `confidence` of 0.99 selects z = 2.576,
/// anything else uses the 95% z = 1.96. An empty sample has zero margin.
pub fn confidence_interval(proportion: f64, sample_size: u32, confidence: f64) -> ConfidenceInterval {
    if sample_size == 0 {
        return ConfidenceInterval {
            margin: 0.0,
            lower: proportion,
            upper: proportion,
        };
    }
    let z = if confidence == 0.99 { 2.576 } else { 1.96 };
    let standard_error = (proportion * (1.0 - proportion) / sample_size as f64).sqrt();
    let margin = z * standard_error;
    ConfidenceInterval {
        margin,
        lower: (proportion - margin).max(0.0),
        upper: (proportion + margin).min(1.0),
    }
}

/// Population standard deviation (divides by n, not n-1).
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quartiles {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
}

/// Five-number summary with linear-interpolation percentiles, as used for
/// box plots. Empty input yields all zeros.
pub fn quartiles(values: &[f64]) -> Quartiles {
    if values.is_empty() {
        return Quartiles::default();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("values must not be NaN"));
    let n = sorted.len();

    let percentile = |p: f64| {
        let index = (n - 1) as f64 * p;
        let lower = index.floor() as usize;
        let upper = index.ceil() as usize;
        let weight = index - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    };

    let q1 = percentile(0.25);
    let q3 = percentile(0.75);
    Quartiles {
        min: sorted[0],
        q1,
        median: percentile(0.5),
        q3,
        max: sorted[n - 1],
        iqr: q3 - q1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub p_value: f64,
    pub is_significant: bool,
    pub degrees_of_freedom: u32,
}

/// Pearson chi-square independence test on the 2x2 win/loss table of two
/// strategies. A zero-total table is reported as no evidence (p = 1).
pub fn chi_square_test(wins1: u32, losses1: u32, wins2: u32, losses2: u32) -> ChiSquareResult {
    let total1 = (wins1 + losses1) as f64;
    let total2 = (wins2 + losses2) as f64;
    let total_wins = (wins1 + wins2) as f64;
    let total_losses = (losses1 + losses2) as f64;
    let grand_total = total1 + total2;

    if grand_total == 0.0 {
        return ChiSquareResult {
            statistic: 0.0,
            p_value: 1.0,
            is_significant: false,
            degrees_of_freedom: 1,
        };
    }

    let expected = [
        total1 * total_wins / grand_total,
        total1 * total_losses / grand_total,
        total2 * total_wins / grand_total,
        total2 * total_losses / grand_total,
    ];
    let observed = [wins1 as f64, losses1 as f64, wins2 as f64, losses2 as f64];
    let statistic: f64 = observed
        .iter()
        .zip(expected.iter())
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum();

    let p_value = chi_square_to_p_value(statistic);
    ChiSquareResult {
        statistic,
        p_value,
        is_significant: p_value < 0.05,
        degrees_of_freedom: 1,
    }
}

/// Threshold-table p-value for df = 1, with a smooth fallback (never below
/// 0.10) for small statistics.
fn chi_square_to_p_value(statistic: f64) -> f64 {
    if statistic > 10.83 {
        0.001
    } else if statistic > 6.63 {
        0.01
    } else if statistic > 3.84 {
        0.05
    } else if statistic > 2.71 {
        0.10
    } else {
        (1.0 / (1.0 + statistic)).max(0.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    pub fn interpretation(&self) -> &'static str {
        match self {
            EffectMagnitude::Negligible => "negligible effect",
            EffectMagnitude::Small => "small effect",
            EffectMagnitude::Medium => "medium effect",
            EffectMagnitude::Large => "large effect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohenD {
    pub d: f64,
    pub magnitude: EffectMagnitude,
    pub interpretation: String,
}

/// Cohen's d with pooled standard deviation. Degenerate samples (either
/// group empty) report no effect.
pub fn cohen_d(mean1: f64, mean2: f64, std1: f64, std2: f64, n1: u32, n2: u32) -> CohenD {
    if n1 == 0 || n2 == 0 {
        return CohenD {
            d: 0.0,
            magnitude: EffectMagnitude::Negligible,
            interpretation: EffectMagnitude::Negligible.interpretation().to_string(),
        };
    }
    let n1 = n1 as f64;
    let n2 = n2 as f64;
    let pooled_std =
        (((n1 - 1.0) * std1 * std1 + (n2 - 1.0) * std2 * std2) / (n1 + n2 - 2.0)).sqrt();
    let d = ((mean1 - mean2) / pooled_std).abs();
    let magnitude = if d < 0.2 {
        EffectMagnitude::Negligible
    } else if d < 0.5 {
        EffectMagnitude::Small
    } else if d < 0.8 {
        EffectMagnitude::Medium
    } else {
        EffectMagnitude::Large
    };
    CohenD {
        d,
        magnitude,
        interpretation: magnitude.interpretation().to_string(),
    }
}

/// Normal-approximation power of a two-sample test at alpha = 0.05 for
/// `n` games per group and the given expected effect size.
pub fn power(n: u32, effect_size: f64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let delta = effect_size * (n as f64 / 2.0).sqrt();
    let z_crit = 1.96;
    (1.0 - normal_cdf(z_crit - delta)).clamp(0.0, 1.0)
}

/// Games per group needed for 80% power at alpha = 0.05 (two-tailed),
/// n = 2 * (z_alpha + z_beta)^2 / d^2.
pub fn required_sample_size(effect_size: f64) -> f64 {
    if effect_size == 0.0 {
        return f64::INFINITY;
    }
    let z_alpha: f64 = 1.96;
    let z_beta: f64 = 0.84;
    (2.0 * (z_alpha + z_beta).powi(2) / effect_size.powi(2)).ceil()
}

fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Abramowitz & Stegun approximation 7.1.26, max error ~1.5e-7.
fn erf(x: f64) -> f64 {
    let sign = if x >= 0.0 { 1.0 } else { -1.0 };
    let x = x.abs();

    let a1 = 0.254829592;
    let a2 = -0.284496736;
    let a3 = 1.421413741;
    let a4 = -1.453152027;
    let a5 = 1.061405429;
    let p = 0.3275911;

    let t = 1.0 / (1.0 + p * x);
    let y = 1.0 - ((((a5 * t + a4) * t + a3) * t + a2) * t + a1) * t * (-x * x).exp();
    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_confidence_interval_empty_sample() {
        let ci = confidence_interval(0.5, 0, 0.95);
        assert_eq!(ci.margin, 0.0);
        assert_eq!(ci.lower, 0.5);
        assert_eq!(ci.upper, 0.5);
    }

    #[test]
    fn test_confidence_interval_known_value() {
        // p=0.5, n=100: se=0.05, margin=1.96*0.05=0.098
        let ci = confidence_interval(0.5, 100, 0.95);
        assert!(close(ci.margin, 0.098, 1e-9));
        assert!(close(ci.lower, 0.402, 1e-9));
        assert!(close(ci.upper, 0.598, 1e-9));

        let ci99 = confidence_interval(0.5, 100, 0.99);
        assert!(ci99.margin > ci.margin);
    }

    #[test]
    fn test_confidence_interval_clamps_bounds() {
        let ci = confidence_interval(0.98, 20, 0.95);
        assert!(ci.upper <= 1.0);
        let ci = confidence_interval(0.02, 20, 0.95);
        assert!(ci.lower >= 0.0);
    }

    #[test]
    fn test_standard_deviation() {
        assert_eq!(standard_deviation(&[]), 0.0);
        assert_eq!(standard_deviation(&[4.0, 4.0, 4.0]), 0.0);
        // Population sd of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(close(standard_deviation(&values), 2.0, 1e-12));
    }

    #[test]
    fn test_quartiles_empty() {
        assert_eq!(quartiles(&[]), Quartiles::default());
    }

    #[test]
    fn test_quartiles_known_series() {
        let q = quartiles(&[7.0, 1.0, 3.0, 5.0, 9.0]);
        assert_eq!(q.min, 1.0);
        assert_eq!(q.q1, 3.0);
        assert_eq!(q.median, 5.0);
        assert_eq!(q.q3, 7.0);
        assert_eq!(q.max, 9.0);
        assert_eq!(q.iqr, 4.0);
    }

    #[test]
    fn test_quartiles_interpolates() {
        // (n-1)*0.25 = 0.75 for n=4: q1 = 1*(0.25) + 2*(0.75)
        let q = quartiles(&[1.0, 2.0, 3.0, 4.0]);
        assert!(close(q.q1, 1.75, 1e-12));
        assert!(close(q.median, 2.5, 1e-12));
        assert!(close(q.q3, 3.25, 1e-12));
    }

    #[test]
    fn test_chi_square_zero_total() {
        let result = chi_square_test(0, 0, 0, 0);
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
        assert!(!result.is_significant);
        assert_eq!(result.degrees_of_freedom, 1);
    }

    #[test]
    fn test_chi_square_balanced_table() {
        let result = chi_square_test(50, 50, 50, 50);
        assert!(close(result.statistic, 0.0, 1e-12));
        assert!(!result.is_significant);
        assert!(result.p_value >= 0.10);
    }

    #[test]
    fn test_chi_square_lopsided_table() {
        // 80/20 vs 20/80 over 200 games: statistic = 72, far past 10.83
        let result = chi_square_test(80, 20, 20, 80);
        assert!(close(result.statistic, 72.0, 1e-9));
        assert_eq!(result.p_value, 0.001);
        assert!(result.is_significant);
    }

    #[test]
    fn test_chi_square_threshold_bands() {
        // statistic = 4 lands in the 0.05 band, statistic = 3 in the 0.10 band
        assert_eq!(chi_square_to_p_value(4.0), 0.05);
        assert_eq!(chi_square_to_p_value(7.0), 0.01);
        assert_eq!(chi_square_to_p_value(3.0), 0.10);
        assert!(chi_square_to_p_value(0.5) >= 0.10);
    }

    #[test]
    fn test_cohen_d_degenerate() {
        let effect = cohen_d(1.0, 2.0, 1.0, 1.0, 0, 10);
        assert_eq!(effect.d, 0.0);
        assert_eq!(effect.magnitude, EffectMagnitude::Negligible);
        assert_eq!(effect.interpretation, "negligible effect");
    }

    #[test]
    fn test_cohen_d_buckets() {
        // Equal sds make the pooled sd equal to them; d = |mean diff| / sd
        let effect = cohen_d(10.0, 10.1, 1.0, 1.0, 50, 50);
        assert_eq!(effect.magnitude, EffectMagnitude::Negligible);
        let effect = cohen_d(10.0, 10.3, 1.0, 1.0, 50, 50);
        assert_eq!(effect.magnitude, EffectMagnitude::Small);
        let effect = cohen_d(10.0, 10.6, 1.0, 1.0, 50, 50);
        assert_eq!(effect.magnitude, EffectMagnitude::Medium);
        let effect = cohen_d(10.0, 11.5, 1.0, 1.0, 50, 50);
        assert_eq!(effect.magnitude, EffectMagnitude::Large);
        assert!(close(effect.d, 1.5, 1e-12));
        assert_eq!(effect.interpretation, "large effect");
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["interpretation"], "large effect");
    }

    #[test]
    fn test_power_bounds_and_growth() {
        assert_eq!(power(0, 0.5), 0.0);
        assert_eq!(power(1, 0.5), 0.0);
        let small = power(20, 0.5);
        let large = power(200, 0.5);
        assert!(small > 0.0 && small < 1.0);
        assert!(large > small);
        assert!(large <= 1.0);
        // d=0.5 at n=64 per group is the textbook ~80% power point
        assert!(close(power(64, 0.5), 0.8, 0.05));
    }

    #[test]
    fn test_required_sample_size() {
        assert_eq!(required_sample_size(0.0), f64::INFINITY);
        // 2 * 2.8^2 / 0.25 = 62.72, rounded up
        assert_eq!(required_sample_size(0.5), 63.0);
        assert_eq!(required_sample_size(0.8), 25.0);
    }

    #[test]
    fn test_erf_reference_values() {
        assert!(close(erf(0.0), 0.0, 1e-7));
        assert!(close(erf(1.0), 0.8427008, 1e-6));
        assert!(close(erf(-1.0), -0.8427008, 1e-6));
        assert!(close(normal_cdf(0.0), 0.5, 1e-7));
        assert!(close(normal_cdf(1.96), 0.975, 1e-3));
    }
}
