//! Maps the caller's node identifiers to the dense ids used internally.
use std::hash::Hash;
use std::sync::Arc;

use hashbrown::HashMap;
use crate::graph::NodeID;

#[derive(Debug)]
pub struct Vocab<K: Hash + Eq> {
    vocab_to_idx: HashMap<Arc<K>, NodeID>,
    idx_to_vocab: Vec<Arc<K>>
}

impl <K: Hash + Eq> Vocab<K> {
    pub fn new() -> Self {
        Vocab {
            vocab_to_idx: HashMap::new(),
            idx_to_vocab: Vec::new()
        }
    }

    pub fn get_node_id(&self, name: &K) -> Option<NodeID> {
        self.vocab_to_idx.get(name).copied()
    }

    pub fn get_or_insert(&mut self, name: K) -> NodeID {
        if let Some(node_id) = self.vocab_to_idx.get(&name) {
            *node_id
        } else {
            let node = Arc::new(name);
            let new_idx = self.idx_to_vocab.len();
            self.vocab_to_idx.insert(node.clone(), new_idx);
            self.idx_to_vocab.push(node);
            new_idx
        }
    }

    pub fn get_name(&self, node: NodeID) -> Option<&K> {
        self.idx_to_vocab.get(node).map(|v| v.as_ref())
    }

    pub fn len(&self) -> usize {
        self.idx_to_vocab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx_to_vocab.is_empty()
    }
}

impl <K: Hash + Eq> Default for Vocab<K> {
    fn default() -> Self {
        Vocab::new()
    }
}
