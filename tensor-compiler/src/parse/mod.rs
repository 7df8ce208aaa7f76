//! Model front-ends.

pub mod onnx;
