use log::warn;

use crate::core::Metric;

/// Score assigned to every observed value of a zero-variance metric.
pub const MIDPOINT_SCORE: f64 = 50.0;

/// Min-max normalize one metric column to the 0-100 scale.
///
/// Bounds come from the non-missing subset of the full cohort, so the
/// result is deterministic for a given input vector. Metrics where lower
/// raw values are better are inverted so that 100 is always the best
/// attainable score. Missing entries stay missing; this stage never
/// fabricates a value.
///
/// Every observed value of a zero-variance metric maps to
/// [`MIDPOINT_SCORE`]; the condition is logged.
pub fn normalize_series(metric: Metric, values: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some((min, max)) = observed_bounds(values) else {
        warn!(
            "metric {} has no observed values in this cohort; nothing to normalize",
            metric
        );
        return vec![None; values.len()];
    };

    if min == max {
        warn!(
            "metric {} has zero variance across the cohort (constant {}); \
             assigning midpoint score {} to all records",
            metric, min, MIDPOINT_SCORE
        );
        return values.iter().map(|v| v.map(|_| MIDPOINT_SCORE)).collect();
    }

    let range = max - min;
    values
        .iter()
        .map(|v| v.map(|x| rescale(x, min, range, metric.lower_is_better())))
        .collect()
}

fn rescale(value: f64, min: f64, range: f64, invert: bool) -> f64 {
    let scaled = (value - min) / range * 100.0;
    if invert {
        100.0 - scaled
    } else {
        scaled
    }
}

fn observed_bounds(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values.iter().flatten().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}
