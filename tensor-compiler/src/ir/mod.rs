pub mod attribute;
pub mod graph;
pub mod node;
pub mod tensor;

pub use attribute::{AttrValue, Attribute};
pub use graph::{Graph, TensorId};
pub use node::{Node, NodeId};
pub use tensor::{DType, Tensor, TensorKind};
