//! Single graph walk strategies: DeepWalk's uniform walk and node2vec's second order biased
//! walk, the latter either from precomputed edge tables or by rejection sampling against the
//! first-step tables.  The strategy is chosen once up front; a walk never re-decides it.
use float_ord::FloatOrd;
use rand::prelude::*;

use crate::config::{check_bias,check_walk_length,WalkConfig};
use crate::error::{Result,WalkError};
use crate::graph::{Graph,NodeID};
use crate::sampler::{Sampler,Unweighted,Weighted};
use crate::algos::transition::TransitionModel;

/// Upper bound on rejection rounds for a single step.
pub const MAX_REJECTION_ITERATIONS: usize = 10_000;

pub enum WalkStrategy {
    /// Uniform choice among neighbors; ignores weights and history.
    DeepWalk,

    /// Second order steps drawn from per-edge alias tables.
    Node2VecExact(TransitionModel),

    /// Second order steps drawn by rejection sampling the first-step tables.
    Node2VecRejection(RejectionSampler)
}

impl WalkStrategy {

    pub fn deepwalk() -> Self {
        WalkStrategy::DeepWalk
    }

    pub fn node2vec_exact(graph: &(impl Graph + Sync), p: f32, q: f32) -> Result<Self> {
        WalkStrategy::exact(graph, p, q, false)
    }

    pub fn node2vec_rejection(graph: &(impl Graph + Sync), p: f32, q: f32) -> Result<Self> {
        WalkStrategy::rejection(graph, p, q, false)
    }

    /// Picks the cheapest strategy that produces the distribution the config asks for.
    pub fn from_config(graph: &(impl Graph + Sync), config: &WalkConfig) -> Result<Self> {
        config.validate()?;
        let unbiased = config.p == 1. && config.q == 1.;
        let strategy = if unbiased && graph.is_uniformly_weighted() {
            WalkStrategy::DeepWalk
        } else if unbiased || !config.use_rejection_sampling {
            WalkStrategy::exact(graph, config.p, config.q, config.verbose)?
        } else {
            WalkStrategy::rejection(graph, config.p, config.q, config.verbose)?
        };
        log::info!("Selected {} walks (p={}, q={})", strategy.name(), config.p, config.q);
        Ok(strategy)
    }

    fn exact(graph: &(impl Graph + Sync), p: f32, q: f32, verbose: bool) -> Result<Self> {
        check_bias(p, q)?;
        // With p == q == 1 every edge table equals the next node's first-step table
        let bias = if p == 1. && q == 1. { None } else { Some((p, q)) };
        let model = TransitionModel::build(graph, bias, verbose)?;
        Ok(WalkStrategy::Node2VecExact(model))
    }

    fn rejection(graph: &(impl Graph + Sync), p: f32, q: f32, verbose: bool) -> Result<Self> {
        check_bias(p, q)?;
        let model = TransitionModel::build(graph, None, verbose)?;
        Ok(WalkStrategy::Node2VecRejection(RejectionSampler::new(model, p, q)))
    }

    pub fn name(&self) -> &'static str {
        match self {
            WalkStrategy::DeepWalk => "deepwalk",
            WalkStrategy::Node2VecExact(_) => "node2vec",
            WalkStrategy::Node2VecRejection(_) => "node2vec (rejection sampling)"
        }
    }

    /// Walks from `start` until `walk_length` nodes have been visited or a node without
    /// outgoing edges is reached, in which case the walk is returned short.
    pub fn walk<G: Graph, R: Rng>(
        &self,
        graph: &G,
        start: NodeID,
        walk_length: usize,
        rng: &mut R
    ) -> Result<Vec<NodeID>> {
        check_walk_length(walk_length)?;
        let mut walk = Vec::with_capacity(walk_length);
        walk.push(start);

        let mut prev = None;
        let mut cur = start;
        while walk.len() < walk_length {
            let next = match (self, prev) {
                (WalkStrategy::DeepWalk, _) => Unweighted.sample(graph, cur, rng),

                (WalkStrategy::Node2VecExact(model), None) |
                (WalkStrategy::Node2VecRejection(RejectionSampler { model, .. }), None) => {
                    Weighted(model).sample(graph, cur, rng)
                },

                (WalkStrategy::Node2VecExact(model), Some(prev)) => {
                    model.second_step(graph, prev, cur)
                        .map(|table| graph.get_edges(cur).0[table.sample(rng)])
                },

                (WalkStrategy::Node2VecRejection(sampler), Some(prev)) => {
                    sampler.sample(graph, prev, cur, rng)?
                }
            };

            match next {
                Some(node) => {
                    walk.push(node);
                    prev = Some(cur);
                    cur = node;
                },
                None => break
            }
        }
        Ok(walk)
    }
}

/// Draws node2vec steps without per-edge tables.  Candidates are proposed from the current
/// node's unbiased table and accepted against an envelope of height max(1, 1/p, 1/q).
///
/// When 1/p towers over the other biases, giving the previous node the full envelope would
/// waste most rounds, so the envelope is capped at max(1, 1/q) and the previous node's
/// missing mass is carved out as a separate "shatter" slice at the top that returns to it
/// directly.  The slice is sized from the previous node's first-step probability, which keeps
/// the accepted distribution identical to the precomputed tables.
pub struct RejectionSampler {
    model: TransitionModel,
    inv_p: f32,
    inv_q: f32,

    // max(1, 1/q): the envelope for everything but the previous node
    outer: f32,

    // min(1, 1/p, 1/q): everything under this is accepted outright
    lower: f32
}

impl RejectionSampler {
    pub fn new(model: TransitionModel, p: f32, q: f32) -> Self {
        let inv_p = 1. / p;
        let inv_q = 1. / q;
        let outer = [1., inv_q].iter().copied().map(FloatOrd).max()
            .map(|v| v.0).unwrap_or(1.);
        let lower = [1., inv_p, inv_q].iter().copied().map(FloatOrd).min()
            .map(|v| v.0).unwrap_or(1.);

        RejectionSampler { model, inv_p, inv_q, outer, lower }
    }

    pub fn model(&self) -> &TransitionModel {
        &self.model
    }

    /// Envelope height and the slice at its top reserved for returning to `prev`.
    fn bounds<G: Graph>(&self, graph: &G, prev: NodeID, cur: NodeID) -> (f32, f32) {
        if self.inv_p > self.outer {
            let shatter = (self.inv_p - self.outer)
                * self.model.first_step_probability(graph, cur, prev);
            (self.outer + shatter, shatter)
        } else {
            (self.outer, 0.)
        }
    }

    fn bias<G: Graph>(&self, graph: &G, prev: NodeID, candidate: NodeID) -> f32 {
        if candidate == prev {
            self.inv_p
        } else if graph.has_edge(candidate, prev) {
            1.
        } else {
            self.inv_q
        }
    }

    /// Next node after arriving at `cur` from `prev`.  None for a dead end.
    pub fn sample<G: Graph, R: Rng>(
        &self,
        graph: &G,
        prev: NodeID,
        cur: NodeID,
        rng: &mut R
    ) -> Result<Option<NodeID>> {
        let table = match self.model.first_step(cur) {
            Some(table) => table,
            None => return Ok(None)
        };
        let edges = graph.get_edges(cur).0;
        let (upper, shatter) = self.bounds(graph, prev, cur);

        for _ in 0..MAX_REJECTION_ITERATIONS {
            let prob = rng.gen::<f32>() * upper;
            if shatter > 0. && prob + shatter >= upper {
                return Ok(Some(prev))
            }

            let candidate = edges[table.sample(rng)];
            if prob < self.lower || prob < self.bias(graph, prev, candidate) {
                return Ok(Some(candidate))
            }
        }

        Err(WalkError::SamplingDivergence { iterations: MAX_REJECTION_ITERATIONS })
    }
}
