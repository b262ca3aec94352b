//! Ranking quality metrics against a set of known-relevant documents

use crate::processing::ranker::RankedBatch;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecisionAtK {
    pub k: usize,
    pub precision: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub precision_at_k: Vec<PrecisionAtK>,
    /// Pearson correlation of lexical and semantic scores across the batch
    pub score_correlation: Option<f64>,
    pub relevant_found: usize,
    pub relevant_total: usize,
}

/// Fraction of the first `k` ranked ids that are relevant; 0 when `k` is 0.
///
/// A ranking shorter than `k` still divides by `k`.
pub fn precision_at_k(ranked_ids: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = ranked_ids
        .iter()
        .take(k)
        .filter(|id| relevant.contains(*id))
        .count();
    hits as f64 / k as f64
}

/// `None` for fewer than two points or when either series is constant
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }
    Some(covariance / (variance_x.sqrt() * variance_y.sqrt()))
}

pub fn evaluate(batch: &RankedBatch, relevant_ids: &[String], ks: &[usize]) -> EvaluationReport {
    let relevant: HashSet<&str> = relevant_ids.iter().map(String::as_str).collect();
    let ranked_ids: Vec<&str> = batch.results.iter().map(|r| r.id.as_str()).collect();

    let precision_at_k = ks
        .iter()
        .map(|&k| PrecisionAtK {
            k,
            precision: precision_at_k(&ranked_ids, &relevant, k),
        })
        .collect();

    let lexical: Vec<f64> = batch.results.iter().map(|r| f64::from(r.lexical_score)).collect();
    let semantic: Vec<f64> = batch.results.iter().map(|r| f64::from(r.semantic_score)).collect();

    EvaluationReport {
        precision_at_k,
        score_correlation: pearson(&lexical, &semantic),
        relevant_found: ranked_ids.iter().filter(|id| relevant.contains(*id)).count(),
        relevant_total: relevant.len(),
    }
}
