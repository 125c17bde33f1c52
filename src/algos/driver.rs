//! Fans walk generation out across a pool of workers.  The requested number of walks per
//! node is split as evenly as possible between workers; each worker owns its own rng,
//! reshuffles the start order on every repetition and writes only to its own buffer.  Results
//! are merged once every worker has finished, and a single failure discards the whole corpus.
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;

use crate::config::{MultiLayerConfig,WalkConfig};
use crate::error::{Result,WalkError};
use crate::graph::{Graph,NodeID};
use crate::progress::CLProgressBar;
use crate::algos::node2vec::WalkStrategy;
use crate::algos::struc2vec::{MultiLayerTables,MultiLayerWalkStrategy};

/// Something that can produce walks from a set of start nodes.
pub trait Walker: Sync {
    fn start_nodes(&self) -> Vec<NodeID>;

    fn walk<R: Rng>(&self, start: NodeID, walk_length: usize, rng: &mut R) -> Result<Vec<NodeID>>;
}

/// Binds a single graph strategy to the graph it was built for.
pub struct GraphWalker<'a, G: Graph> {
    graph: &'a G,
    strategy: &'a WalkStrategy
}

impl <'a, G: Graph> GraphWalker<'a, G> {
    pub fn new(graph: &'a G, strategy: &'a WalkStrategy) -> Self {
        GraphWalker { graph, strategy }
    }
}

impl <'a, G: Graph + Sync> Walker for GraphWalker<'a, G> {
    fn start_nodes(&self) -> Vec<NodeID> {
        (0..self.graph.len()).collect()
    }

    fn walk<R: Rng>(&self, start: NodeID, walk_length: usize, rng: &mut R) -> Result<Vec<NodeID>> {
        self.strategy.walk(self.graph, start, walk_length, rng)
    }
}

impl <'a> Walker for MultiLayerWalkStrategy<'a> {
    fn start_nodes(&self) -> Vec<NodeID> {
        self.tables().start_nodes()
    }

    fn walk<R: Rng>(&self, start: NodeID, walk_length: usize, rng: &mut R) -> Result<Vec<NodeID>> {
        MultiLayerWalkStrategy::walk(self, start, walk_length, rng)
    }
}

/// Splits `total` into `workers` shares that differ by at most one, larger shares first.
pub fn partition_num(total: usize, workers: usize) -> Vec<usize> {
    if workers == 0 {
        return Vec::new()
    }
    let base = total / workers;
    let rem = total % workers;
    (0..workers).map(|i| base + if i < rem { 1 } else { 0 }).collect()
}

#[derive(Clone,Debug)]
pub struct WalkDriver {
    pub walk_length: usize,
    pub num_walks: usize,
    pub workers: usize,
    pub seed: u64,
    pub verbose: bool
}

impl From<&WalkConfig> for WalkDriver {
    fn from(config: &WalkConfig) -> Self {
        WalkDriver {
            walk_length: config.walk_length,
            num_walks: config.num_walks,
            workers: config.workers,
            seed: config.seed,
            verbose: config.verbose
        }
    }
}

impl From<&MultiLayerConfig> for WalkDriver {
    fn from(config: &MultiLayerConfig) -> Self {
        WalkDriver {
            walk_length: config.walk_length,
            num_walks: config.num_walks,
            workers: config.workers,
            seed: config.seed,
            verbose: config.verbose
        }
    }
}

impl WalkDriver {

    fn validate(&self) -> Result<()> {
        if self.walk_length == 0 || self.num_walks == 0 || self.workers == 0 {
            return Err(WalkError::InvalidParameters(format!(
                "walk_length, num_walks and workers must all be at least 1, got {}, {}, {}",
                self.walk_length, self.num_walks, self.workers)))
        }
        Ok(())
    }

    /// Produces `num_walks` walks from every start node.  Output order is unspecified.
    pub fn simulate<W: Walker>(&self, walker: &W) -> Result<Vec<Vec<NodeID>>> {
        self.validate()?;
        let nodes = walker.start_nodes();
        if nodes.is_empty() {
            return Err(WalkError::EmptyGraph)
        }

        let shares = partition_num(self.num_walks, self.workers);
        log::info!("Generating {} walks per node over {} nodes with {} workers, shares {:?}",
                   self.num_walks, nodes.len(), self.workers, shares);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| WalkError::ThreadPool(e.to_string()))?;

        let pb = CLProgressBar::new((self.num_walks * nodes.len()) as u64, "Walks", self.verbose);
        let results: Vec<Result<Vec<Vec<NodeID>>>> = pool.install(|| {
            shares.par_iter().enumerate()
                .map(|(worker, reps)| self.run_worker(walker, &nodes, worker, *reps, &pb))
                .collect()
        });
        pb.finish();

        let mut walks = Vec::with_capacity(self.num_walks * nodes.len());
        for (worker, worker_walks) in results.into_iter().enumerate() {
            match worker_walks {
                Ok(w) => walks.extend(w),
                Err(e) => {
                    log::warn!("Worker {} failed, discarding corpus: {}", worker, e);
                    return Err(e)
                }
            }
        }
        log::info!("Generated {} walks", walks.len());
        Ok(walks)
    }

    fn run_worker<W: Walker>(
        &self,
        walker: &W,
        nodes: &[NodeID],
        worker: usize,
        reps: usize,
        pb: &CLProgressBar
    ) -> Result<Vec<Vec<NodeID>>> {
        let mut rng = XorShiftRng::seed_from_u64(self.seed.wrapping_add(worker as u64));
        let mut order = nodes.to_vec();
        let mut walks = Vec::with_capacity(reps * nodes.len());
        for _ in 0..reps {
            order.shuffle(&mut rng);
            for node in order.iter() {
                walks.push(walker.walk(*node, self.walk_length, &mut rng)?);
            }
            pb.inc(nodes.len() as u64);
        }
        Ok(walks)
    }
}

/// Builds whatever transition tables the config needs and generates the corpus.
pub fn generate_walks<G: Graph + Sync>(graph: &G, config: &WalkConfig) -> Result<Vec<Vec<NodeID>>> {
    config.validate()?;
    if graph.len() == 0 {
        return Err(WalkError::EmptyGraph)
    }
    let strategy = WalkStrategy::from_config(graph, config)?;
    WalkDriver::from(config).simulate(&GraphWalker::new(graph, &strategy))
}

/// Generates a corpus over a stack of precomputed layers.
pub fn generate_layer_walks(tables: &MultiLayerTables, config: &MultiLayerConfig) -> Result<Vec<Vec<NodeID>>> {
    config.validate()?;
    let strategy = MultiLayerWalkStrategy::new(tables, config.stay_prob)?;
    WalkDriver::from(config).simulate(&strategy)
}
