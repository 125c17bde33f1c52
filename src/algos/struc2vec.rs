//! Walks across a stack of graph layers, as used by struc2vec.  Each step either moves to a
//! neighbor inside the current layer or tries to switch layers.  Switching only changes the
//! layer, never the node, and adds nothing to the walk.
//!
//! The layer adjacency lists, alias tables and gamma values are computed elsewhere; this
//! module only validates them and walks over them.
use std::f32::consts::E;

use hashbrown::HashMap;
use itertools::izip;
use rand::prelude::*;

use crate::alias::AliasTable;
use crate::config::{check_stay_prob,check_walk_length};
use crate::error::{Result,WalkError};
use crate::graph::NodeID;

/// Everything a walk needs to know about one node in one layer.
#[derive(Debug, Clone)]
pub struct LayerNode {
    neighbors: Vec<NodeID>,
    table: AliasTable,
    gamma: f32
}

impl LayerNode {
    pub fn new(neighbors: Vec<NodeID>, table: AliasTable, gamma: f32) -> Result<Self> {
        if neighbors.len() != table.len() {
            return Err(WalkError::InvalidDistribution(
                format!("{} neighbors but alias table has {} bins", neighbors.len(), table.len())))
        }
        if !gamma.is_finite() || gamma < 0. {
            return Err(WalkError::InvalidParameters(
                format!("gamma must be non-negative, got {}", gamma)))
        }
        Ok(LayerNode { neighbors, table, gamma })
    }

    pub fn neighbors(&self) -> &[NodeID] {
        &self.neighbors
    }

    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Probability that a layer change goes up rather than down.  Grows with gamma, from
    /// 1/2 at gamma = 0 toward 1.
    pub fn move_up_prob(&self) -> f32 {
        let x = (self.gamma + E).ln();
        x / (x + 1.)
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> NodeID {
        self.neighbors[self.table.sample(rng)]
    }
}

/// Layer index -> node -> precomputed walk data.  Layer 0 is the bottom of the stack.
#[derive(Debug, Clone, Default)]
pub struct MultiLayerTables {
    layers: Vec<HashMap<NodeID, LayerNode>>
}

impl MultiLayerTables {
    pub fn new() -> Self {
        MultiLayerTables { layers: Vec::new() }
    }

    /// Zips the three parallel per-layer inputs into one structure.  Every node with an
    /// adjacency list needs a matching alias table and gamma.
    pub fn from_parts(
        adjacency: Vec<HashMap<NodeID, Vec<NodeID>>>,
        mut tables: Vec<HashMap<NodeID, AliasTable>>,
        gammas: Vec<HashMap<NodeID, f32>>
    ) -> Result<Self> {
        if adjacency.len() != tables.len() || adjacency.len() != gammas.len() {
            return Err(WalkError::InvalidParameters(format!(
                "layer counts differ: {} adjacency, {} alias, {} gamma",
                adjacency.len(), tables.len(), gammas.len())))
        }

        let mut layers = Vec::with_capacity(adjacency.len());
        for (layer, (adj, layer_tables, layer_gammas)) in izip!(adjacency, tables.iter_mut(), gammas.iter()).enumerate() {
            let mut nodes = HashMap::with_capacity(adj.len());
            for (node, neighbors) in adj.into_iter() {
                let missing = WalkError::MissingLayerData { layer, node };
                let table = layer_tables.remove(&node).ok_or_else(|| missing.clone())?;
                let gamma = *layer_gammas.get(&node).ok_or(missing)?;
                nodes.insert(node, LayerNode::new(neighbors, table, gamma)?);
            }
            layers.push(nodes);
        }

        log::debug!("Loaded {} layers", layers.len());
        Ok(MultiLayerTables { layers })
    }

    /// Adds a node to a layer, appending the layer if it is the next one up.
    pub fn insert(&mut self, layer: usize, node: NodeID, entry: LayerNode) -> Result<()> {
        if layer == self.layers.len() {
            self.layers.push(HashMap::new());
        }
        match self.layers.get_mut(layer) {
            Some(nodes) => {
                nodes.insert(node, entry);
                Ok(())
            },
            None => Err(WalkError::InvalidParameters(
                format!("layer {} skips past the {} existing layers", layer, self.layers.len())))
        }
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn get(&self, layer: usize, node: NodeID) -> Option<&LayerNode> {
        self.layers.get(layer)?.get(&node)
    }

    pub fn contains(&self, layer: usize, node: NodeID) -> bool {
        self.get(layer, node).is_some()
    }

    /// Walks start from every node of the bottom layer.
    pub fn start_nodes(&self) -> Vec<NodeID> {
        let mut nodes: Vec<_> = self.layers.first()
            .map(|l| l.keys().copied().collect())
            .unwrap_or_default();
        nodes.sort_unstable();
        nodes
    }
}

/// Outcome of a single step: either the walk moved to a node, or it now sits on a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Step {
    Node(NodeID),
    Layer(usize)
}

pub struct MultiLayerWalkStrategy<'a> {
    tables: &'a MultiLayerTables,
    stay_prob: f32
}

impl <'a> MultiLayerWalkStrategy<'a> {
    pub fn new(tables: &'a MultiLayerTables, stay_prob: f32) -> Result<Self> {
        check_stay_prob(stay_prob)?;
        Ok(MultiLayerWalkStrategy { tables, stay_prob })
    }

    pub fn tables(&self) -> &MultiLayerTables {
        self.tables
    }

    fn entry(&self, layer: usize, node: NodeID) -> Result<&'a LayerNode> {
        self.tables.get(layer, node)
            .ok_or(WalkError::MissingLayerData { layer, node })
    }

    /// Walks from `start` on the bottom layer until `walk_length` nodes have been visited.
    pub fn walk<R: Rng>(&self, start: NodeID, walk_length: usize, rng: &mut R) -> Result<Vec<NodeID>> {
        check_walk_length(walk_length)?;
        let mut path = Vec::with_capacity(walk_length);
        path.push(start);

        let mut layer = 0;
        let mut node = start;
        let mut entry = self.entry(layer, node)?;
        while path.len() < walk_length {
            match self.step(layer, node, entry, rng) {
                Step::Node(next) => {
                    node = next;
                    path.push(node);
                },
                Step::Layer(next) => layer = next
            }
            entry = self.entry(layer, node)?;
        }
        Ok(path)
    }

    /// A failed move down from the bottom layer leaves the walk where it is rather than
    /// falling through to a move up.
    fn step<R: Rng>(&self, layer: usize, node: NodeID, entry: &LayerNode, rng: &mut R) -> Step {
        if rng.gen::<f32>() < self.stay_prob {
            Step::Node(entry.sample(rng))
        } else if rng.gen::<f32>() > entry.move_up_prob() {
            Step::Layer(layer.saturating_sub(1))
        } else if self.tables.contains(layer + 1, node) {
            Step::Layer(layer + 1)
        } else {
            Step::Layer(layer)
        }
    }
}
