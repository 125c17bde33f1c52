//! Vose's alias method.  Construction is O(n), after which every draw costs one uniform bin
//! choice and one coin flip regardless of how skewed the distribution is.  Tables are
//! immutable once built, so a single table can be shared by every worker thread.
use rand::prelude::*;
use rand_distr::{Distribution,Uniform};

use crate::error::{Result,WalkError};

/// How far a probability vector may drift from summing to one.  Inputs are f32, so this is
/// loose enough to accept vectors normalized in single precision.
pub const PROB_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
    accept: Vec<f32>,
    alias: Vec<usize>
}

impl AliasTable {

    /// Builds a table from a normalized probability vector.
    pub fn new(probs: &[f32]) -> Result<Self> {
        let total = check_entries(probs)?;
        if (total - 1.).abs() > PROB_TOLERANCE {
            return Err(WalkError::InvalidDistribution(
                format!("probabilities sum to {}, expected 1", total)))
        }
        Ok(AliasTable::construct(probs))
    }

    /// Builds a table from unnormalized, non-negative weights.
    pub fn from_weights(weights: &[f32]) -> Result<Self> {
        let total = check_entries(weights)?;
        if total <= 0. {
            return Err(WalkError::InvalidDistribution("weights sum to zero".into()))
        }
        let probs: Vec<f32> = weights.iter()
            .map(|w| (*w as f64 / total) as f32)
            .collect();
        Ok(AliasTable::construct(&probs))
    }

    /// Wraps an (accept, alias) pair that was computed elsewhere.
    pub fn from_parts(accept: Vec<f32>, alias: Vec<usize>) -> Result<Self> {
        if accept.is_empty() {
            return Err(WalkError::InvalidDistribution("alias table is empty".into()))
        }
        if accept.len() != alias.len() {
            return Err(WalkError::InvalidDistribution(
                format!("accept has {} entries but alias has {}", accept.len(), alias.len())))
        }
        if let Some(a) = accept.iter().find(|a| !(0f32..=1f32).contains(*a)) {
            return Err(WalkError::InvalidDistribution(
                format!("accept value {} outside [0, 1]", a)))
        }
        if let Some(idx) = alias.iter().find(|idx| **idx >= accept.len()) {
            return Err(WalkError::InvalidDistribution(
                format!("alias index {} out of range for {} bins", idx, accept.len())))
        }
        Ok(AliasTable { accept, alias })
    }

    fn construct(probs: &[f32]) -> Self {
        let n = probs.len();
        let mut scaled: Vec<f32> = probs.iter().map(|p| p * n as f32).collect();
        let mut accept = vec![0f32; n];
        let mut alias: Vec<usize> = (0..n).collect();

        // Ties at exactly 1.0 go to large
        let (mut small, mut large): (Vec<usize>, Vec<usize>) = (0..n)
            .partition(|idx| scaled[*idx] < 1.);

        while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
            small.pop();
            large.pop();

            accept[s] = scaled[s];
            alias[s] = l;

            scaled[l] -= 1. - scaled[s];
            if scaled[l] < 1. {
                small.push(l);
            } else {
                large.push(l);
            }
        }

        // Whatever is left over is certain, up to rounding error
        for idx in small.into_iter().chain(large.into_iter()) {
            accept[idx] = 1.;
            alias[idx] = idx;
        }

        AliasTable { accept, alias }
    }

    /// Draws a bin index in O(1).
    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let idx = Uniform::new(0, self.accept.len()).sample(rng);
        if rng.gen::<f32>() < self.accept[idx] {
            idx
        } else {
            self.alias[idx]
        }
    }

    pub fn len(&self) -> usize {
        self.accept.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accept.is_empty()
    }

    pub fn accept(&self) -> &[f32] {
        &self.accept
    }

    pub fn alias(&self) -> &[usize] {
        &self.alias
    }

    /// Recovers the distribution encoded by the table.
    pub fn probabilities(&self) -> Vec<f32> {
        let n = self.accept.len() as f32;
        let mut probs = vec![0f32; self.accept.len()];
        self.accept.iter().zip(self.alias.iter()).enumerate().for_each(|(idx, (a, al))| {
            probs[idx] += a / n;
            probs[*al] += (1. - a) / n;
        });
        probs
    }
}

/// Rejects empty, negative and non-finite entries, returning the sum.
fn check_entries(values: &[f32]) -> Result<f64> {
    if values.is_empty() {
        return Err(WalkError::InvalidDistribution("distribution is empty".into()))
    }
    let mut total = 0f64;
    for (idx, v) in values.iter().enumerate() {
        if !v.is_finite() || *v < 0. {
            return Err(WalkError::InvalidDistribution(
                format!("entry {} has invalid value {}", idx, v)))
        }
        total += *v as f64;
    }
    Ok(total)
}
