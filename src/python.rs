//! Python bindings, built with the `python` feature.
use pyo3::prelude::*;
use pyo3::exceptions::PyValueError;

use crate::config::{WalkConfig,SEED};
use crate::error::WalkError;
use crate::graph::{EdgeType,Graph as _,GraphBuilder,WalkGraph};

fn to_py_err(err: WalkError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

#[pyclass(name = "Graph")]
struct PyGraph {
    graph: WalkGraph<String>
}

#[pymethods]
impl PyGraph {

    #[new]
    fn new(edges: Vec<(String, String, Option<f32>)>, directed: Option<bool>) -> PyResult<Self> {
        let edge_type = if directed.unwrap_or(false) {
            EdgeType::Directed
        } else {
            EdgeType::Undirected
        };

        let mut builder = GraphBuilder::new(edge_type);
        for (from_node, to_node, weight) in edges {
            builder.add_edge(from_node, to_node, weight).map_err(to_py_err)?;
        }
        Ok(PyGraph { graph: builder.build() })
    }

    pub fn nodes(&self) -> usize {
        self.graph.graph().len()
    }

    pub fn edges(&self) -> usize {
        self.graph.graph().edges()
    }

    pub fn walk(
        &self,
        walk_length: usize,
        num_walks: usize,
        p: Option<f32>,
        q: Option<f32>,
        use_rejection_sampling: Option<bool>,
        workers: Option<usize>,
        seed: Option<u64>,
        verbose: Option<bool>
    ) -> PyResult<Vec<Vec<String>>> {
        let config = WalkConfig {
            p: p.unwrap_or(1.),
            q: q.unwrap_or(1.),
            use_rejection_sampling: use_rejection_sampling.unwrap_or(false),
            walk_length,
            num_walks,
            workers: workers.unwrap_or(1),
            seed: seed.unwrap_or(SEED),
            verbose: verbose.unwrap_or(true)
        };
        self.graph.generate_walks(&config).map_err(to_py_err)
    }
}

#[pymodule]
fn rambler(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyGraph>()?;
    Ok(())
}
