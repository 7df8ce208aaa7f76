//! ONNX model front end: decodes a model into a name-keyed graph IR and
//! computes a dependency-respecting execution order over its nodes.

pub mod dump;
pub mod error;
pub mod exec;
pub mod ir;
pub mod parse;
pub mod schedule;

pub use error::{Error, Result};
pub use exec::{load_inputs, Executor};
pub use ir::{AttrValue, Attribute, DType, Graph, Node, NodeId, Tensor, TensorId, TensorKind};
pub use schedule::{schedule, Dependencies};
