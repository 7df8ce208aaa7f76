//! Tensor descriptors.

use std::fmt;

/// Element type of a tensor, keyed by the ONNX `TensorProto.DataType` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DType {
    #[default]
    Undefined,
    F32,
    U8,
    I8,
    U16,
    I16,
    I32,
    I64,
    String,
    Bool,
    F16,
    F64,
    U32,
    U64,
    Complex64,
    Complex128,
    BF16,
    /// A code this crate does not know about, kept verbatim.
    Other(i32),
}

impl DType {
    pub fn from_onnx(code: i32) -> Self {
        match code {
            0 => DType::Undefined,
            1 => DType::F32,
            2 => DType::U8,
            3 => DType::I8,
            4 => DType::U16,
            5 => DType::I16,
            6 => DType::I32,
            7 => DType::I64,
            8 => DType::String,
            9 => DType::Bool,
            10 => DType::F16,
            11 => DType::F64,
            12 => DType::U32,
            13 => DType::U64,
            14 => DType::Complex64,
            15 => DType::Complex128,
            16 => DType::BF16,
            other => DType::Other(other),
        }
    }

    pub fn onnx_code(self) -> i32 {
        match self {
            DType::Undefined => 0,
            DType::F32 => 1,
            DType::U8 => 2,
            DType::I8 => 3,
            DType::U16 => 4,
            DType::I16 => 5,
            DType::I32 => 6,
            DType::I64 => 7,
            DType::String => 8,
            DType::Bool => 9,
            DType::F16 => 10,
            DType::F64 => 11,
            DType::U32 => 12,
            DType::U64 => 13,
            DType::Complex64 => 14,
            DType::Complex128 => 15,
            DType::BF16 => 16,
            DType::Other(code) => code,
        }
    }

    /// Size of one element in bytes, for fixed-width numeric types.
    pub fn size_of(self) -> Option<usize> {
        match self {
            DType::U8 | DType::I8 | DType::Bool => Some(1),
            DType::U16 | DType::I16 | DType::F16 | DType::BF16 => Some(2),
            DType::F32 | DType::I32 | DType::U32 => Some(4),
            DType::F64 | DType::I64 | DType::U64 | DType::Complex64 => Some(8),
            DType::Complex128 => Some(16),
            DType::Undefined | DType::String | DType::Other(_) => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Undefined => "undefined",
            DType::F32 => "f32",
            DType::U8 => "u8",
            DType::I8 => "i8",
            DType::U16 => "u16",
            DType::I16 => "i16",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::String => "string",
            DType::Bool => "bool",
            DType::F16 => "f16",
            DType::F64 => "f64",
            DType::U32 => "u32",
            DType::U64 => "u64",
            DType::Complex64 => "complex64",
            DType::Complex128 => "complex128",
            DType::BF16 => "bf16",
            DType::Other(code) => return write!(f, "dtype({code})"),
        };
        f.write_str(name)
    }
}

/// Role of a tensor within its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TensorKind {
    #[default]
    Unknown,
    /// Graph input - provided by caller
    Input,
    /// Graph output - returned to caller
    Output,
    /// Produced and consumed inside the graph
    Intermediate,
    /// Initializer - carries its own payload
    Constant,
}

impl fmt::Display for TensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TensorKind::Unknown => "unknown",
            TensorKind::Input => "input",
            TensorKind::Output => "output",
            TensorKind::Intermediate => "intermediate",
            TensorKind::Constant => "constant",
        })
    }
}

/// One value flowing through the graph.
///
/// Dimensions are signed; `-1` marks a dimension that is unknown or dynamic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tensor {
    name: String,
    dtype: DType,
    shape: Vec<i64>,
    kind: TensorKind,
    data: Option<Vec<u8>>,
}

impl Tensor {
    pub fn new(name: impl Into<String>, dtype: DType, shape: Vec<i64>, kind: TensorKind) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape,
            kind,
            data: None,
        }
    }

    /// Builds an `f32` tensor whose payload is `values` in little-endian order.
    pub fn from_f32(
        name: impl Into<String>,
        shape: Vec<i64>,
        values: &[f32],
        kind: TensorKind,
    ) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::new(name, DType::F32, shape, kind).with_data(data)
    }

    pub fn with_data(mut self, data: Vec<u8>) -> Self {
        self.data = Some(data);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    pub fn kind(&self) -> TensorKind {
        self.kind
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    pub fn set_dtype(&mut self, dtype: DType) {
        self.dtype = dtype;
    }

    pub fn set_shape(&mut self, shape: Vec<i64>) {
        self.shape = shape;
    }

    pub fn set_kind(&mut self, kind: TensorKind) {
        self.kind = kind;
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = Some(data);
    }

    pub fn is_constant(&self) -> bool {
        self.kind == TensorKind::Constant
    }

    /// Number of elements, or `None` if any dimension is unknown or the
    /// product does not fit in `usize`.
    pub fn num_elements(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(usize::try_from(d).ok()?))
    }

    /// Decodes the payload as little-endian `f32`s.
    ///
    /// Returns `None` unless the tensor is `f32` and carries a payload whose
    /// length is a multiple of four.
    pub fn f32_values(&self) -> Option<Vec<f32>> {
        let data = self.data.as_deref()?;
        if self.dtype != DType::F32 || data.len() % 4 != 0 {
            return None;
        }
        Some(
            data.chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        )
    }
}
