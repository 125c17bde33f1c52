//! Walk generation settings.  Everything here is checked up front so that bad settings are
//! reported before any worker is started.
use crate::error::{Result,WalkError};

pub const SEED: u64 = 20222022;

/// Settings for single graph walks: DeepWalk and node2vec.
#[derive(Clone,Debug)]
pub struct WalkConfig {
    /// Return parameter; lower values make revisiting the previous node more likely.
    pub p: f32,

    /// In-out parameter; lower values push walks outward, higher values keep them local.
    pub q: f32,

    /// Bias second order steps with a rejection sampler instead of precomputed edge tables.
    pub use_rejection_sampling: bool,

    /// Maximum number of nodes in a walk
    pub walk_length: usize,

    /// Walks started from every node, summed across workers
    pub num_walks: usize,

    pub workers: usize,

    pub seed: u64,

    /// Show a progress bar
    pub verbose: bool
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            p: 1.,
            q: 1.,
            use_rejection_sampling: false,
            walk_length: 80,
            num_walks: 10,
            workers: 1,
            seed: SEED,
            verbose: false
        }
    }
}

impl WalkConfig {
    pub fn validate(&self) -> Result<()> {
        check_bias(self.p, self.q)?;
        check_counts(self.walk_length, self.num_walks, self.workers)
    }
}

/// Settings for walks across a stack of layers.
#[derive(Clone,Debug)]
pub struct MultiLayerConfig {
    pub walk_length: usize,
    pub num_walks: usize,
    pub workers: usize,

    /// Probability that a step moves to a neighbor within the current layer rather than
    /// trying to change layers.
    pub stay_prob: f32,

    pub seed: u64,
    pub verbose: bool
}

impl Default for MultiLayerConfig {
    fn default() -> Self {
        MultiLayerConfig {
            walk_length: 80,
            num_walks: 10,
            workers: 1,
            stay_prob: 0.3,
            seed: SEED,
            verbose: false
        }
    }
}

impl MultiLayerConfig {
    pub fn validate(&self) -> Result<()> {
        check_stay_prob(self.stay_prob)?;
        check_counts(self.walk_length, self.num_walks, self.workers)
    }
}

pub(crate) fn check_bias(p: f32, q: f32) -> Result<()> {
    if !(p.is_finite() && p > 0.) {
        return Err(WalkError::InvalidParameters(format!("p must be positive, got {}", p)))
    }
    if !(q.is_finite() && q > 0.) {
        return Err(WalkError::InvalidParameters(format!("q must be positive, got {}", q)))
    }
    Ok(())
}

/// A stay probability of zero would never add a node to the walk.
pub(crate) fn check_stay_prob(stay_prob: f32) -> Result<()> {
    if stay_prob > 0. && stay_prob <= 1. {
        Ok(())
    } else {
        Err(WalkError::InvalidParameters(
            format!("stay_prob must be in (0, 1], got {}", stay_prob)))
    }
}

pub(crate) fn check_walk_length(walk_length: usize) -> Result<()> {
    if walk_length == 0 {
        return Err(WalkError::InvalidParameters("walk_length must be at least 1".into()))
    }
    Ok(())
}

fn check_counts(walk_length: usize, num_walks: usize, workers: usize) -> Result<()> {
    check_walk_length(walk_length)?;
    if num_walks == 0 {
        return Err(WalkError::InvalidParameters("num_walks must be at least 1".into()))
    }
    if workers == 0 {
        return Err(WalkError::InvalidParameters("workers must be at least 1".into()))
    }
    Ok(())
}
