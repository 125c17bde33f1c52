use std::hash::Hash;

use itertools::Itertools;

use crate::algos::driver::generate_walks;
use crate::config::WalkConfig;
use crate::error::{Result,WalkError};
use crate::vocab::Vocab;

pub type NodeID = usize;

pub trait Graph {
    /// Get number of nodes in graph
    fn len(&self) -> usize;

    /// Get number of edges in graph
    fn edges(&self) -> usize;

    /// Get degree of node in graph
    fn degree(&self, idx: NodeID) -> usize;

    /// Get edges and corresponding weights.  Neighbors are sorted ascending.
    fn get_edges(&self, idx: NodeID) -> (&[NodeID], &[f32]);

    /// Position of the directed edge (from, to) when edges are enumerated node by node in
    /// the order get_edges returns them.
    fn edge_offset(&self, from: NodeID, to: NodeID) -> Option<usize>;

    fn has_edge(&self, from: NodeID, to: NodeID) -> bool {
        self.edge_offset(from, to).is_some()
    }

    fn edge_weight(&self, from: NodeID, to: NodeID) -> Option<f32> {
        if from >= self.len() {
            return None
        }
        let (edges, weights) = self.get_edges(from);
        edges.binary_search(&to).ok().map(|idx| weights[idx])
    }

    /// True when every node spreads a positive outgoing weight evenly over its neighbors, in
    /// which case a uniform neighbor draw and a weighted draw are the same distribution.
    /// Zero weight rows are dead ends for a weighted draw, so they never count as uniform.
    fn is_uniformly_weighted(&self) -> bool {
        (0..self.len()).all(|node| {
            let weights = self.get_edges(node).1;
            weights.first().map(|w| *w > 0.).unwrap_or(true)
                && weights.windows(2).all(|w| w[0] == w[1])
        })
    }
}

/// Compressed Sparse Row Format.  We use this for graphs since adjancency
/// lists tend to use more memory.
#[derive(Debug, Clone)]
pub struct CSR {
    rows: Vec<usize>,
    columns: Vec<NodeID>,
    weights: Vec<f32>
}

impl CSR {
    pub fn construct_from_edges(edges: Vec<(NodeID, NodeID, f32)>) -> Self {
        // Determine the number of rows in the adjacency graph
        let num_nodes = edges.iter().map(|(from_node, to_node, _)| {
            *from_node.max(to_node) + 1
        }).max().unwrap_or(0);

        CSR::construct_with_size(num_nodes, edges)
    }

    /// Builds the graph with exactly `num_nodes` rows, so nodes without edges still exist.
    /// Duplicate edges are merged by summing their weights.
    pub fn construct_with_size(num_nodes: usize, mut edges: Vec<(NodeID, NodeID, f32)>) -> Self {
        let num_nodes = edges.iter()
            .map(|(f, t, _)| *f.max(t) + 1)
            .fold(num_nodes, usize::max);

        // Sorting up front keeps every row ordered by column
        edges.sort_by_key(|(f, t, _)| (*f, *t));
        let edges: Vec<_> = edges.into_iter()
            .coalesce(|a, b| {
                if a.0 == b.0 && a.1 == b.1 {
                    Ok((a.0, a.1, a.2 + b.2))
                } else {
                    Err((a, b))
                }
            })
            .collect();

        // Figure out how many out edges per node
        let mut rows = vec![0; num_nodes + 1];
        edges.iter().for_each(|(from_node, _to_node, _w)| {
            rows[*from_node + 1] += 1;
        });

        // Convert to row offset format
        let mut offset = 0;
        rows.iter_mut().skip(1).for_each(|count| {
            offset += *count;
            *count = offset;
        });

        let (columns, weights) = edges.into_iter()
            .map(|(_f, t, w)| (t, w))
            .unzip();

        CSR { rows, columns, weights }
    }
}

impl Graph for CSR {
    fn len(&self) -> usize {
        self.rows.len() - 1
    }

    fn edges(&self) -> usize {
        self.weights.len()
    }

    fn degree(&self, idx: NodeID) -> usize {
        self.rows[idx+1] - self.rows[idx]
    }

    fn get_edges(&self, idx: NodeID) -> (&[NodeID], &[f32]) {
        let start = self.rows[idx];
        let stop  = self.rows[idx+1];
        (&self.columns[start..stop], &self.weights[start..stop])
    }

    fn edge_offset(&self, from: NodeID, to: NodeID) -> Option<usize> {
        if from >= self.len() {
            return None
        }
        let start = self.rows[from];
        self.get_edges(from).0.binary_search(&to).ok().map(|idx| start + idx)
    }
}

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum EdgeType {
    Directed,
    Undirected
}

/// Accumulates edges over arbitrary node identifiers.
pub struct GraphBuilder<K: Hash + Eq> {
    vocab: Vocab<K>,
    edges: Vec<(NodeID, NodeID, f32)>,
    edge_type: EdgeType
}

impl <K: Hash + Eq> GraphBuilder<K> {
    pub fn new(edge_type: EdgeType) -> Self {
        GraphBuilder {
            vocab: Vocab::new(),
            edges: Vec::new(),
            edge_type
        }
    }

    /// Registers a node, which is useful for nodes that have no edges.
    pub fn add_node(&mut self, node: K) -> NodeID {
        self.vocab.get_or_insert(node)
    }

    /// Adds an edge; a missing weight defaults to 1.  A rejected edge leaves the builder
    /// untouched.
    pub fn add_edge(&mut self, from_node: K, to_node: K, weight: Option<f32>) -> Result<()> {
        let weight = weight.unwrap_or(1.);
        if !weight.is_finite() || weight < 0. {
            return Err(WalkError::NegativeWeight { weight })
        }

        let f_id = self.vocab.get_or_insert(from_node);
        let t_id = self.vocab.get_or_insert(to_node);

        self.edges.push((f_id, t_id, weight));
        if matches!(self.edge_type, EdgeType::Undirected) && f_id != t_id {
            self.edges.push((t_id, f_id, weight));
        }
        Ok(())
    }

    pub fn build(self) -> WalkGraph<K> {
        let graph = CSR::construct_with_size(self.vocab.len(), self.edges);
        log::info!("Constructed graph with {} nodes and {} edges", graph.len(), graph.edges());
        WalkGraph {
            graph,
            vocab: self.vocab,
            edge_type: self.edge_type
        }
    }
}

/// A graph paired with the vocabulary used to build it.
pub struct WalkGraph<K: Hash + Eq> {
    graph: CSR,
    vocab: Vocab<K>,
    edge_type: EdgeType
}

impl <K: Hash + Eq> WalkGraph<K> {
    pub fn graph(&self) -> &CSR {
        &self.graph
    }

    pub fn vocab(&self) -> &Vocab<K> {
        &self.vocab
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn node_id(&self, node: &K) -> Option<NodeID> {
        self.vocab.get_node_id(node)
    }
}

impl <K: Hash + Eq + Clone> WalkGraph<K> {
    /// Generates a corpus of walks, translated back into the caller's identifiers.
    pub fn generate_walks(&self, config: &WalkConfig) -> Result<Vec<Vec<K>>> {
        let walks = generate_walks(&self.graph, config)?;
        Ok(walks.into_iter()
            .map(|walk| {
                walk.into_iter()
                    .filter_map(|node_id| self.vocab.get_name(node_id).cloned())
                    .collect()
            })
            .collect())
    }
}
