//! Error types for walk generation.

use thiserror::Error;

use crate::graph::NodeID;

/// Everything that can stop a corpus from being generated.  Configuration problems are
/// reported before any worker is started; sampling problems are reported after all workers
/// have joined.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalkError {
    /// Probability vector or raw alias table is malformed.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A walk or strategy parameter is out of range.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// There are no nodes to start walks from.
    #[error("graph has no nodes to start walks from")]
    EmptyGraph,

    /// Edge weights must be finite and non-negative.
    #[error("edge has invalid weight {weight}")]
    NegativeWeight { weight: f32 },

    /// The rejection sampler failed to accept a candidate.
    #[error("rejection sampling did not converge after {iterations} iterations")]
    SamplingDivergence { iterations: usize },

    /// A multi-layer walk reached a (layer, node) pair with no precomputed data.
    #[error("layer {layer} has no data for node {node}")]
    MissingLayerData { layer: usize, node: NodeID },

    /// The worker pool couldn't be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, WalkError>;
