//! Initial difficulty estimation
//!
//! New cards start with an ease predicted from the length of their answer,
//! using a simple linear regression of ease against answer length over the
//! existing collection. Longer answers are expected to be harder, so a model
//! with a positive correlation is rejected outright.

use super::models::{clamp_ease, Card, DEFAULT_EASE};

/// A model is only fit when there are more samples than this
pub const MIN_SAMPLES: usize = 100;

/// `ease = intercept + slope * answer_len`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearModel {
    pub fn predict(&self, answer_len: usize) -> f64 {
        self.intercept + self.slope * answer_len as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson correlation coefficient of two equally long series
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    let mean_x = mean(x);
    let mean_y = mean(y);

    let mut numerator = 0.0;
    let mut sum_squares_x = 0.0;
    let mut sum_squares_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        numerator += dx * dy;
        sum_squares_x += dx * dx;
        sum_squares_y += dy * dy;
    }

    numerator / (sum_squares_x * sum_squares_y).sqrt()
}

/// Sample standard deviation (n - 1 denominator). Needs at least two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    let sum_squares: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (sum_squares / (values.len() - 1) as f64).sqrt()
}

/// Fit ease against answer length.
///
/// Returns `None` when there is too little data, when the correlation is
/// positive, or when it is undefined because one of the series is constant.
pub fn fit(samples: &[(usize, f64)]) -> Option<LinearModel> {
    if samples.len() <= MIN_SAMPLES {
        return None;
    }

    let x: Vec<f64> = samples.iter().map(|(len, _)| *len as f64).collect();
    let y: Vec<f64> = samples.iter().map(|(_, ease)| *ease).collect();

    let r = pearson_correlation(&x, &y);
    if !r.is_finite() {
        log::warn!("Ease regression skipped: correlation undefined over {} cards", samples.len());
        return None;
    }
    if r > 0.0 {
        log::debug!("Ease regression rejected: positive correlation r={:.3}", r);
        return None;
    }

    let slope = r * sample_std_dev(&y) / sample_std_dev(&x);
    let intercept = mean(&y) - slope * mean(&x);
    log::debug!("Ease regression fit: ease = {:.4} + {:.6} * chars (r={:.3})", intercept, slope, r);

    Some(LinearModel { intercept, slope })
}

/// Fit a model over the answer lengths and eases of existing cards
pub fn fit_cards(cards: &[Card]) -> Option<LinearModel> {
    let samples: Vec<(usize, f64)> = cards.iter().map(|c| (c.answer_len(), c.ease)).collect();
    fit(&samples)
}

/// Starting ease for a new card, clamped to the allowed range
pub fn estimate_initial_ease(answer_len: usize, model: Option<&LinearModel>) -> f64 {
    match model {
        Some(model) => clamp_ease(model.predict(answer_len)),
        None => DEFAULT_EASE,
    }
}
