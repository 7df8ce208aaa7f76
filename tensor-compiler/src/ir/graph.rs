//! Core graph container.
//!
//! Tensors live in an arena indexed by [`TensorId`] with a name index on the
//! side; nodes live in a vector in builder order.

use std::collections::HashMap;

use super::node::{Node, NodeId};
use super::tensor::{Tensor, TensorKind};

/// Slot of a tensor in the graph's arena. Slots are never reused or removed.
pub type TensorId = usize;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    name: String,
    tensors: Vec<Tensor>,
    tensor_ids: HashMap<String, TensorId>,
    nodes: Vec<Node>,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// All tensors, in the order their names were first inserted.
    pub fn tensors(&self) -> &[Tensor] {
        &self.tensors
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn tensor_id(&self, name: &str) -> Option<TensorId> {
        self.tensor_ids.get(name).copied()
    }

    pub fn tensor(&self, name: &str) -> Option<&Tensor> {
        self.tensor_id(name).map(|id| &self.tensors[id])
    }

    pub fn tensor_by_id(&self, id: TensorId) -> &Tensor {
        &self.tensors[id]
    }

    pub fn contains_tensor(&self, name: &str) -> bool {
        self.tensor_ids.contains_key(name)
    }

    /// Looks a node up by [`Node::id`].
    ///
    /// Built graphs number nodes by storage position, so that slot is tried
    /// first; hand-built graphs may use any ids.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        match self.nodes.get(id) {
            Some(node) if node.id() == id => Some(node),
            _ => self.nodes.iter().find(|n| n.id() == id),
        }
    }

    pub fn constants(&self) -> impl Iterator<Item = &Tensor> {
        self.tensors.iter().filter(|t| t.is_constant())
    }

    /// Inserts `tensor`, replacing any tensor with the same name.
    ///
    /// A replaced tensor keeps its arena slot, so ids handed out earlier stay
    /// valid and now refer to the new record.
    pub fn add_tensor(&mut self, tensor: Tensor) -> TensorId {
        if let Some(&id) = self.tensor_ids.get(tensor.name()) {
            let previous = std::mem::replace(&mut self.tensors[id], tensor);
            if previous.kind() != self.tensors[id].kind() {
                log::debug!(
                    "tensor {} replaced: {} -> {}",
                    previous.name(),
                    previous.kind(),
                    self.tensors[id].kind()
                );
            }
            return id;
        }
        let id = self.tensors.len();
        self.tensor_ids.insert(tensor.name().to_string(), id);
        self.tensors.push(tensor);
        id
    }

    /// Inserts an intermediate placeholder for `name` unless a tensor with
    /// that name already exists. Returns whether a placeholder was created.
    pub fn ensure_tensor(&mut self, name: &str) -> bool {
        if self.contains_tensor(name) {
            return false;
        }
        self.add_tensor(Tensor::new(
            name,
            Default::default(),
            Vec::new(),
            TensorKind::Intermediate,
        ));
        true
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn add_input(&mut self, name: impl Into<String>) {
        self.inputs.push(name.into());
    }

    pub fn add_output(&mut self, name: impl Into<String>) {
        self.outputs.push(name.into());
    }

    pub fn set_inputs(&mut self, inputs: Vec<String>) {
        self.inputs = inputs;
    }

    pub fn set_outputs(&mut self, outputs: Vec<String>) {
        self.outputs = outputs;
    }
}
