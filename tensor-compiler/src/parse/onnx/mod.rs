//! ONNX front-end: protobuf subset plus the lowering into [`crate::ir::Graph`].

mod lowering;
pub mod proto;

pub use lowering::{build_graph, decode_model, load_model, to_graph_ir};
