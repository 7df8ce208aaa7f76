//! Operator attributes.

use std::fmt;

/// Value carried by an [`Attribute`].
///
/// Only the five kinds below survive ingestion; tensor, graph and
/// string-list attributes are dropped by the builder.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Float(f32),
    Int(i64),
    String(String),
    Floats(Vec<f32>),
    Ints(Vec<i64>),
}

impl AttrValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttrValue::Float(_) => "float",
            AttrValue::Int(_) => "int",
            AttrValue::String(_) => "string",
            AttrValue::Floats(_) => "floats",
            AttrValue::Ints(_) => "ints",
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_floats(&self) -> Option<&[f32]> {
        match self {
            AttrValue::Floats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i64]> {
        match self {
            AttrValue::Ints(v) => Some(v),
            _ => None,
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::String(v) => write!(f, "{v:?}"),
            AttrValue::Floats(v) => write_list(f, v),
            AttrValue::Ints(v) => write_list(f, v),
        }
    }
}

/// A named attribute owned by a single node.
///
/// The name is fixed at construction; the value may be replaced, including
/// with a value of a different kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    value: AttrValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttrValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &AttrValue {
        &self.value
    }

    pub fn set_value(&mut self, value: AttrValue) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_can_change_kind() {
        let mut attr = Attribute::new("alpha", AttrValue::Float(0.5));
        assert_eq!(attr.value().as_float(), Some(0.5));

        attr.set_value(AttrValue::Ints(vec![1, 2]));
        assert_eq!(attr.name(), "alpha");
        assert_eq!(attr.value().as_ints(), Some(&[1, 2][..]));
        assert_eq!(attr.value().as_float(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(AttrValue::Int(-3).to_string(), "-3");
        assert_eq!(AttrValue::String("same".into()).to_string(), "\"same\"");
        assert_eq!(AttrValue::Ints(vec![1, 1, 2]).to_string(), "[1,1,2]");
        assert_eq!(AttrValue::Floats(vec![]).to_string(), "[]");
        assert_eq!(AttrValue::Floats(vec![0.5, 2.0]).to_string(), "[0.5,2]");
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(AttrValue::Float(1.0).kind_name(), "float");
        assert_eq!(AttrValue::Ints(vec![]).kind_name(), "ints");
        assert_eq!(AttrValue::String(String::new()).as_str(), Some(""));
    }
}
