use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::ir::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Model or input file could not be read
    Io { path: PathBuf, source: io::Error },
    /// Bytes are not a valid ONNX ModelProto
    Decode(prost::DecodeError),
    /// ModelProto decoded but carries no graph
    MissingGraph,
    /// Input-values file is not a name -> [f32] object
    InvalidInputs(String),
    /// No topological order exists; lists the nodes that never became ready
    Cycle { unscheduled: Vec<NodeId> },
    /// A graph input has no supplied value
    MissingInput(String),
    /// Writing a dump or report failed
    Write(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Error::Decode(e) => write!(f, "failed to decode ONNX model: {e}"),
            Error::MissingGraph => write!(f, "ONNX model has no graph"),
            Error::InvalidInputs(msg) => write!(f, "invalid input values: {msg}"),
            Error::Cycle { unscheduled } => write!(
                f,
                "graph has a cycle (or unresolved dependencies): {} node(s) never became ready, ids {:?}",
                unscheduled.len(),
                unscheduled
            ),
            Error::MissingInput(name) => write!(f, "missing input value for: {name}"),
            Error::Write(e) => write!(f, "failed to write output: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Decode(e) => Some(e),
            Error::Write(e) => Some(e),
            _ => None,
        }
    }
}

impl From<prost::DecodeError> for Error {
    fn from(e: prost::DecodeError) -> Self {
        Error::Decode(e)
    }
}
