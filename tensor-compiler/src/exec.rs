//! Input binding and the execution value table.
//!
//! Kernels are not run here; the executor only prepares the named values a
//! runtime would start from and the order it would visit nodes in.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::ir::{Graph, Node, Tensor, TensorKind};
use crate::schedule::schedule;

/// Builds input tensors for every declared graph input.
///
/// Each tensor is `f32`, takes the shape declared for that input (empty when
/// the graph has no record of it) and carries `values` as little-endian
/// bytes. Fails on the first input, in declaration order, with no value.
pub fn load_inputs(
    graph: &Graph,
    values: &HashMap<String, Vec<f32>>,
) -> Result<HashMap<String, Tensor>> {
    let mut loaded = HashMap::with_capacity(graph.inputs().len());

    for name in graph.inputs() {
        let data = values
            .get(name)
            .ok_or_else(|| Error::MissingInput(name.clone()))?;
        let shape = graph
            .tensor(name)
            .map(|t| t.shape().to_vec())
            .unwrap_or_default();

        let tensor = Tensor::from_f32(name.as_str(), shape, data, TensorKind::Input);
        if let Some(n) = tensor.num_elements() {
            if n != data.len() {
                log::warn!(
                    "input {}: shape {:?} holds {} elements, got {}",
                    name,
                    tensor.shape(),
                    n,
                    data.len()
                );
            }
        }
        loaded.insert(name.clone(), tensor);
    }

    let unused: Vec<&String> = values.keys().filter(|k| !loaded.contains_key(*k)).collect();
    if !unused.is_empty() {
        log::debug!("ignoring values for non-input names: {:?}", unused);
    }

    Ok(loaded)
}

/// Value table for one run of a graph, keyed by tensor name.
pub struct Executor<'a> {
    graph: &'a Graph,
    values: HashMap<String, Tensor>,
}

impl<'a> Executor<'a> {
    /// Seeds the table with every constant tensor of `graph`.
    pub fn new(graph: &'a Graph) -> Self {
        let values: HashMap<String, Tensor> = graph
            .constants()
            .map(|t| (t.name().to_string(), t.clone()))
            .collect();
        log::debug!("executor seeded with {} constants", values.len());
        Self { graph, values }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Adds the graph inputs to the table.
    ///
    /// On error the table is left unchanged.
    pub fn load_inputs(&mut self, values: &HashMap<String, Vec<f32>>) -> Result<()> {
        let loaded = load_inputs(self.graph, values)?;
        log::info!("loaded {} graph inputs", loaded.len());
        self.values.extend(loaded);
        Ok(())
    }

    pub fn value(&self, name: &str) -> Option<&Tensor> {
        self.values.get(name)
    }

    pub fn values(&self) -> &HashMap<String, Tensor> {
        &self.values
    }

    pub fn order(&self) -> Result<Vec<&'a Node>> {
        schedule(self.graph)
    }
}
