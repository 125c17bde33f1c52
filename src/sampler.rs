//! Single step samplers: given the node a walk is on, pick the next one without regard to
//! where the walk came from.
use rand::prelude::*;
use rand_distr::{Distribution,Uniform};

use crate::graph::{Graph,NodeID};
use crate::algos::transition::TransitionModel;

pub trait Sampler<G: Graph> {
    /// Returns None when the node has nowhere to go.
    fn sample<R: Rng>(&self, g: &G, node: NodeID, rng: &mut R) -> Option<NodeID>;
}

/// Picks any neighbor with equal probability, ignoring weights.
pub struct Unweighted;

impl <G: Graph> Sampler<G> for Unweighted {
    fn sample<R: Rng>(&self, g: &G, node: NodeID, rng: &mut R) -> Option<NodeID> {
        let edges = g.get_edges(node).0;
        if edges.is_empty() {
            return None
        }

        let idx = Uniform::new(0, edges.len()).sample(rng);
        Some(edges[idx])
    }
}

/// Picks a neighbor proportional to edge weight using the node's first-step alias table.
pub struct Weighted<'a>(pub &'a TransitionModel);

impl <'a, G: Graph> Sampler<G> for Weighted<'a> {
    fn sample<R: Rng>(&self, g: &G, node: NodeID, rng: &mut R) -> Option<NodeID> {
        let table = self.0.first_step(node)?;
        let edges = g.get_edges(node).0;
        Some(edges[table.sample(rng)])
    }
}
