//! Operator nodes.

use std::collections::BTreeMap;

use super::attribute::{AttrValue, Attribute};

/// Position of a node in builder order. Stable for the node's lifetime.
pub type NodeId = usize;

/// One operator invocation.
///
/// Inputs and outputs are tensor names in positional order. An empty name
/// marks an omitted optional slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    opcode: String,
    name: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
    attributes: BTreeMap<String, Attribute>,
}

impl Node {
    pub fn new(id: NodeId, opcode: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            opcode: opcode.into(),
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_inputs(inputs);
        self
    }

    pub fn with_outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_outputs(outputs);
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn opcode(&self) -> &str {
        &self.opcode
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }

    pub fn attributes(&self) -> &BTreeMap<String, Attribute> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name).map(Attribute::value)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_inputs<I, S>(&mut self, inputs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
    }

    pub fn set_outputs<I, S>(&mut self, outputs: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
    }

    /// Sets `name` to `value`, replacing the value of an existing attribute.
    pub fn set_attribute(&mut self, name: &str, value: AttrValue) {
        match self.attributes.get_mut(name) {
            Some(attr) => attr.set_value(value),
            None => {
                self.attributes
                    .insert(name.to_string(), Attribute::new(name, value));
            }
        }
    }

    /// Label used in dumps and diagnostics: the node name, or `opcode#id`
    /// when the model left it empty.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            format!("{}#{}", self.opcode, self.id)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_keep_order_and_duplicates() {
        let node = Node::new(3, "Add", "sum")
            .with_inputs(["b", "a", "b"])
            .with_outputs(["c"]);

        assert_eq!(node.id(), 3);
        assert_eq!(node.opcode(), "Add");
        assert_eq!(node.inputs(), ["b", "a", "b"]);
        assert_eq!(node.outputs(), ["c"]);
    }

    #[test]
    fn test_set_attribute_overwrites_value_keeps_name() {
        let mut node = Node::new(0, "Conv", "c0");
        node.set_attribute("group", AttrValue::Int(1));
        node.set_attribute("group", AttrValue::String("depthwise".into()));

        assert_eq!(node.attributes().len(), 1);
        assert!(node.has_attribute("group"));
        assert_eq!(node.attribute("group").and_then(AttrValue::as_str), Some("depthwise"));
        assert_eq!(node.attributes()["group"].name(), "group");
        assert!(!node.has_attribute("pads"));
    }

    #[test]
    fn test_label_falls_back_to_opcode_and_id() {
        assert_eq!(Node::new(4, "Relu", "").label(), "Relu#4");
        assert_eq!(Node::new(4, "Relu", "act").label(), "act");

        let mut node = Node::new(4, "Relu", "");
        node.set_name("renamed");
        assert_eq!(node.label(), "renamed");
        assert_eq!(node.id(), 4);
    }
}
