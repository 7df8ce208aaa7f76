//! ONNX to graph IR lowering pass.
//!
//! Ingestion is best-effort: odd shapes, unknown element types, unsupported
//! attribute kinds and unsupported constant encodings are normalized, never
//! rejected. Only decoding the protobuf itself can fail.

use std::fs;
use std::path::Path;

use prost::Message;

use super::proto::tensor_shape_proto::dimension;
use super::proto::{
    attribute_type, AttributeProto, GraphProto, ModelProto, NodeProto, TensorProto,
    ValueInfoProto,
};
use crate::error::{Error, Result};
use crate::ir::{AttrValue, DType, Graph, Node, Tensor, TensorKind};

/// Read and lower an ONNX model file.
pub fn load_model(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("read {} ({} bytes)", path.display(), data.len());
    to_graph_ir(&data)
}

/// Decode an ONNX model buffer and lower its graph into the IR.
pub fn to_graph_ir(model_data: &[u8]) -> Result<Graph> {
    let model = decode_model(model_data)?;
    let graph = model.graph.as_ref().ok_or(Error::MissingGraph)?;
    Ok(build_graph(graph))
}

pub fn decode_model(model_data: &[u8]) -> Result<ModelProto> {
    let model = ModelProto::decode(model_data)?;
    log::debug!(
        "decoded ModelProto: ir_version {}, producer {:?} {:?}",
        model.ir_version,
        model.producer_name,
        model.producer_version
    );
    Ok(model)
}

/// Lower a decoded ONNX graph.
///
/// Phases run in a fixed order: initializers, declared inputs, nodes,
/// declared outputs. A later phase overwrites any same-named tensor from an
/// earlier one.
pub fn build_graph(proto: &GraphProto) -> Graph {
    let mut graph = Graph::named(proto.name.as_str());

    for init in &proto.initializer {
        graph.add_tensor(lower_initializer(init));
    }

    for input in &proto.input {
        graph.add_tensor(lower_value_info(input, TensorKind::Input));
        graph.add_input(input.name.as_str());
    }

    let mut placeholders = 0usize;
    for (id, node) in proto.node.iter().enumerate() {
        let node = lower_node(id, node);
        for name in node.inputs().iter().chain(node.outputs()) {
            if !name.is_empty() && graph.ensure_tensor(name) {
                log::debug!("node {}: materialized intermediate {}", node.label(), name);
                placeholders += 1;
            }
        }
        graph.add_node(node);
    }

    for output in &proto.output {
        graph.add_tensor(lower_value_info(output, TensorKind::Output));
        graph.add_output(output.name.as_str());
    }

    log::info!(
        "lowered graph {:?}: {} tensors ({} intermediate placeholders), {} nodes, {} inputs, {} outputs",
        graph.name(),
        graph.tensors().len(),
        placeholders,
        graph.nodes().len(),
        graph.inputs().len(),
        graph.outputs().len()
    );

    graph
}

/// Initializer -> constant tensor.
fn lower_initializer(init: &TensorProto) -> Tensor {
    let dtype = DType::from_onnx(init.data_type);
    Tensor::new(init.name.as_str(), dtype, init.dims.clone(), TensorKind::Constant)
        .with_data(tensor_bytes(init, dtype))
}

/// Declared graph input/output -> tensor with the given role.
fn lower_value_info(info: &ValueInfoProto, kind: TensorKind) -> Tensor {
    Tensor::new(info.name.as_str(), elem_type(info), dims(info), kind)
}

fn lower_node(id: usize, proto: &NodeProto) -> Node {
    let mut node = Node::new(id, proto.op_type.as_str(), proto.name.as_str())
        .with_inputs(proto.input.iter().cloned())
        .with_outputs(proto.output.iter().cloned());

    for attr in &proto.attribute {
        match convert_attribute(attr) {
            Some(value) => node.set_attribute(&attr.name, value),
            None => log::warn!(
                "node {}: dropped attribute {} of unsupported type {}",
                node.label(),
                attr.name,
                attr.r#type
            ),
        }
    }

    node
}

/// Convert an ONNX attribute to our value type.
///
/// Only float, int, string, floats and ints are kept.
fn convert_attribute(attr: &AttributeProto) -> Option<AttrValue> {
    match attr.r#type {
        attribute_type::FLOAT => Some(AttrValue::Float(attr.f)),
        attribute_type::INT => Some(AttrValue::Int(attr.i)),
        attribute_type::STRING => Some(AttrValue::String(
            String::from_utf8_lossy(&attr.s).into_owned(),
        )),
        attribute_type::FLOATS => Some(AttrValue::Floats(attr.floats.clone())),
        attribute_type::INTS => Some(AttrValue::Ints(attr.ints.clone())),
        _ => None,
    }
}

fn elem_type(info: &ValueInfoProto) -> DType {
    info.r#type
        .as_ref()
        .and_then(|t| t.tensor_type.as_ref())
        .map(|t| DType::from_onnx(t.elem_type))
        .unwrap_or_default()
}

/// Declared dimensions; symbolic or missing dims become `-1`.
fn dims(info: &ValueInfoProto) -> Vec<i64> {
    let Some(shape) = info
        .r#type
        .as_ref()
        .and_then(|t| t.tensor_type.as_ref())
        .and_then(|t| t.shape.as_ref())
    else {
        return Vec::new();
    };

    shape
        .dim
        .iter()
        .map(|d| match d.value {
            Some(dimension::Value::DimValue(v)) => v,
            _ => -1,
        })
        .collect()
}

/// Payload bytes for an initializer.
///
/// `raw_data` is taken verbatim when present; otherwise the typed field that
/// ONNX uses for `dtype` is re-encoded little-endian at the element width.
fn tensor_bytes(t: &TensorProto, dtype: DType) -> Vec<u8> {
    if !t.raw_data.is_empty() {
        return t.raw_data.clone();
    }

    let bytes: Option<Vec<u8>> = match dtype {
        DType::F32 => Some(t.float_data.iter().flat_map(|v| v.to_le_bytes()).collect()),
        DType::F64 => Some(t.double_data.iter().flat_map(|v| v.to_le_bytes()).collect()),
        DType::I64 => Some(t.int64_data.iter().flat_map(|v| v.to_le_bytes()).collect()),
        DType::I32 => Some(t.int32_data.iter().flat_map(|v| v.to_le_bytes()).collect()),
        // 16-bit types (including f16/bf16 bit patterns) are stored widened in int32_data
        DType::I16 | DType::U16 | DType::F16 | DType::BF16 => Some(
            t.int32_data
                .iter()
                .flat_map(|&v| (v as u16).to_le_bytes())
                .collect(),
        ),
        DType::I8 | DType::U8 | DType::Bool => {
            Some(t.int32_data.iter().map(|&v| v as u8).collect())
        }
        DType::U32 => Some(
            t.uint64_data
                .iter()
                .flat_map(|&v| (v as u32).to_le_bytes())
                .collect(),
        ),
        DType::U64 => Some(t.uint64_data.iter().flat_map(|v| v.to_le_bytes()).collect()),
        _ => None,
    };

    bytes.unwrap_or_else(|| {
        log::warn!(
            "initializer {}: no raw_data and {} typed data is unsupported, payload left empty",
            t.name,
            dtype
        );
        Vec::new()
    })
}
