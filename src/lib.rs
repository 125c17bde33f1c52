//! Random walk corpora for graph embeddings: DeepWalk, node2vec (exact or rejection sampled)
//! and struc2vec style multi-layer walks, generated across a pool of workers.

pub mod alias;
pub mod algos;
pub mod config;
pub mod error;
pub mod graph;
pub mod sampler;
pub mod vocab;
mod progress;

#[cfg(feature = "python")]
mod python;

pub use crate::alias::AliasTable;
pub use crate::algos::driver::{generate_layer_walks,generate_walks,partition_num,GraphWalker,WalkDriver,Walker};
pub use crate::algos::node2vec::{RejectionSampler,WalkStrategy};
pub use crate::algos::struc2vec::{LayerNode,MultiLayerTables,MultiLayerWalkStrategy};
pub use crate::algos::transition::TransitionModel;
pub use crate::config::{MultiLayerConfig,WalkConfig,SEED};
pub use crate::error::{Result,WalkError};
pub use crate::graph::{EdgeType,Graph,GraphBuilder,NodeID,WalkGraph,CSR};
