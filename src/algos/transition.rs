//! Precomputed transition tables.  Every node gets an alias table over its outgoing weights,
//! used for the first step of a walk.  For node2vec, every directed edge (t, v) additionally
//! gets a table over v's neighbors reweighted by the return and in-out parameters, so that
//! later steps cost O(1) at the price of O(|E| * avg degree) work up front.
use rayon::prelude::*;

use crate::alias::AliasTable;
use crate::config::check_bias;
use crate::error::Result;
use crate::graph::{Graph,NodeID};
use crate::progress::CLProgressBar;

pub struct TransitionModel {
    node_tables: Vec<Option<AliasTable>>,
    out_weights: Vec<f32>,

    // Indexed by Graph::edge_offset
    edge_tables: Option<Vec<Option<AliasTable>>>
}

impl TransitionModel {

    /// Builds only the first-step tables.  Second steps fall back to the current node's
    /// table, which is exactly what the bias rule reduces to when p == q == 1.
    pub fn first_order(graph: &(impl Graph + Sync)) -> Result<Self> {
        TransitionModel::build(graph, None, false)
    }

    /// Builds first-step tables and a biased table for every directed edge.
    pub fn second_order(graph: &(impl Graph + Sync), p: f32, q: f32) -> Result<Self> {
        TransitionModel::build(graph, Some((p, q)), false)
    }

    pub(crate) fn build(
        graph: &(impl Graph + Sync),
        bias: Option<(f32, f32)>,
        verbose: bool
    ) -> Result<Self> {
        if let Some((p, q)) = bias {
            check_bias(p, q)?;
        }

        let passes = if bias.is_some() { 2 } else { 1 };
        let work = passes * graph.len() as u64;
        let pb = CLProgressBar::new(work, "Transition tables", verbose);

        let node_tables = (0..graph.len()).into_par_iter()
            .map(|node| {
                let table = build_table(graph.get_edges(node).1);
                pb.inc(1);
                table
            })
            .collect::<Result<Vec<_>>>()?;

        let out_weights = (0..graph.len()).into_par_iter()
            .map(|node| graph.get_edges(node).1.iter().sum::<f32>())
            .collect();

        let edge_tables = if let Some((p, q)) = bias {
            let per_node = (0..graph.len()).into_par_iter()
                .map(|prev| {
                    let tables = graph.get_edges(prev).0.iter()
                        .map(|cur| {
                            let weights = biased_weights(graph, prev, *cur, p, q);
                            build_table(&weights)
                        })
                        .collect::<Result<Vec<_>>>();
                    pb.inc(1);
                    tables
                })
                .collect::<Result<Vec<_>>>()?;

            Some(per_node.into_iter().flatten().collect::<Vec<_>>())
        } else {
            None
        };
        pb.finish();

        log::info!("Built {} node tables and {} edge tables",
                   node_tables.iter().filter(|t| t.is_some()).count(),
                   edge_tables.as_ref().map(|t| t.iter().filter(|t| t.is_some()).count()).unwrap_or(0));

        Ok(TransitionModel { node_tables, out_weights, edge_tables })
    }

    pub fn has_edge_tables(&self) -> bool {
        self.edge_tables.is_some()
    }

    /// Table for the first step out of `node`.  None when it has nowhere to go.
    pub fn first_step(&self, node: NodeID) -> Option<&AliasTable> {
        self.node_tables.get(node)?.as_ref()
    }

    /// Probability that a first step out of `from` lands on `to`.
    pub fn first_step_probability<G: Graph>(&self, graph: &G, from: NodeID, to: NodeID) -> f32 {
        match (graph.edge_weight(from, to), self.out_weights.get(from)) {
            (Some(w), Some(total)) if *total > 0. => w / total,
            _ => 0.
        }
    }

    /// Table for the step out of `cur` given the walk arrived from `prev`.
    pub fn second_step<G: Graph>(&self, graph: &G, prev: NodeID, cur: NodeID) -> Option<&AliasTable> {
        match &self.edge_tables {
            Some(tables) => tables.get(graph.edge_offset(prev, cur)?)?.as_ref(),
            None => self.first_step(cur)
        }
    }

    /// (neighbor, probability) pairs of the first step out of `node`.
    pub fn first_step_distribution<G: Graph>(&self, graph: &G, node: NodeID) -> Vec<(NodeID, f32)> {
        match self.first_step(node) {
            Some(table) => pair_up(graph.get_edges(node).0, table),
            None => Vec::new()
        }
    }

    /// (neighbor, probability) pairs of the step out of `cur` after arriving from `prev`.
    pub fn second_step_distribution<G: Graph>(
        &self,
        graph: &G,
        prev: NodeID,
        cur: NodeID
    ) -> Vec<(NodeID, f32)> {
        match self.second_step(graph, prev, cur) {
            Some(table) => pair_up(graph.get_edges(cur).0, table),
            None => Vec::new()
        }
    }
}

fn pair_up(neighbors: &[NodeID], table: &AliasTable) -> Vec<(NodeID, f32)> {
    neighbors.iter().copied().zip(table.probabilities().into_iter()).collect()
}

/// Nodes without outgoing weight get no table and end walks early.
fn build_table(weights: &[f32]) -> Result<Option<AliasTable>> {
    if weights.is_empty() || weights.iter().all(|w| *w == 0.) {
        Ok(None)
    } else {
        AliasTable::from_weights(weights).map(Some)
    }
}

/// Unnormalized weights over the neighbors of `cur` for a walk that arrived from `prev`.
/// Returning to `prev` is scaled by 1/p, staying within distance one of `prev` is left
/// alone, and moving further away is scaled by 1/q.
pub(crate) fn biased_weights<G: Graph>(
    graph: &G,
    prev: NodeID,
    cur: NodeID,
    p: f32,
    q: f32
) -> Vec<f32> {
    let (edges, weights) = graph.get_edges(cur);
    edges.iter().zip(weights.iter())
        .map(|(x, w)| {
            if *x == prev {
                w / p
            } else if graph.has_edge(*x, prev) {
                *w
            } else {
                w / q
            }
        })
        .collect()
}
