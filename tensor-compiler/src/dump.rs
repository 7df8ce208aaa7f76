//! Plain-text rendering of a graph for inspection.

use std::io::{self, Write};

use crate::ir::{Graph, Node};

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Writes the graph name and every tensor in first-insertion order.
pub fn write_tensors<W: Write>(graph: &Graph, w: &mut W) -> io::Result<()> {
    writeln!(w, "Graph name: {}", graph.name())?;
    writeln!(w, "Tensors:")?;
    for t in graph.tensors() {
        writeln!(
            w,
            "  {}: type={}, kind={}, shape=[{}]",
            t.name(),
            t.dtype(),
            t.kind(),
            join(t.shape())
        )?;
    }
    Ok(())
}

/// Writes every node in storage order, attributes sorted by name.
pub fn write_nodes<W: Write>(graph: &Graph, w: &mut W) -> io::Result<()> {
    writeln!(w, "Nodes:")?;
    for node in graph.nodes() {
        writeln!(w, "  Node name: {} (id {})", node.name(), node.id())?;
        writeln!(w, "    Opcode: {}", node.opcode())?;
        writeln!(w, "    Inputs: [{}]", join(node.inputs()))?;
        writeln!(w, "    Outputs: [{}]", join(node.outputs()))?;
        for (name, attr) in node.attributes() {
            writeln!(w, "    Attr {} = {}", name, attr.value())?;
        }
    }
    Ok(())
}

/// Writes an execution order, one node per line.
pub fn write_order<W: Write>(order: &[&Node], w: &mut W) -> io::Result<()> {
    writeln!(w, "Execution order:")?;
    for (step, node) in order.iter().enumerate() {
        writeln!(w, "  {:>3}: {} ({})", step, node.label(), node.opcode())?;
    }
    Ok(())
}

/// Tensors followed by nodes.
pub fn write_graph<W: Write>(graph: &Graph, w: &mut W) -> io::Result<()> {
    write_tensors(graph, w)?;
    write_nodes(graph, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{AttrValue, DType, Tensor, TensorKind};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> Graph {
        let mut g = Graph::named("G");
        g.add_tensor(Tensor::new("X", DType::F32, vec![1, 4], TensorKind::Input));
        g.add_tensor(Tensor::new("Y", DType::F32, vec![], TensorKind::Output));
        let mut relu = Node::new(0, "LeakyRelu", "act")
            .with_inputs(["X"])
            .with_outputs(["Y"]);
        relu.set_attribute("alpha", AttrValue::Float(0.5));
        g.add_node(relu);
        g
    }

    #[test]
    fn test_write_tensors() {
        let g = sample();
        let out = render(|w| write_tensors(&g, w));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Graph name: G");
        assert_eq!(lines[1], "Tensors:");
        assert!(lines[2].starts_with("  X: type="));
        assert!(lines[2].ends_with("shape=[1, 4]"));
        assert!(lines[3].ends_with("shape=[]"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_write_nodes_includes_attributes() {
        let g = sample();
        let out = render(|w| write_nodes(&g, w));
        assert!(out.contains("  Node name: act (id 0)\n"));
        assert!(out.contains("    Opcode: LeakyRelu\n"));
        assert!(out.contains("    Inputs: [X]\n"));
        assert!(out.contains("    Outputs: [Y]\n"));
        assert!(out.contains("    Attr alpha = 0.5\n"));
    }

    #[test]
    fn test_write_order() {
        let g = sample();
        let order: Vec<&Node> = g.nodes().iter().collect();
        let out = render(|w| write_order(&order, w));
        assert_eq!(out, "Execution order:\n    0: act (LeakyRelu)\n");
    }

    #[test]
    fn test_write_graph_empty() {
        let g = Graph::new();
        let out = render(|w| write_graph(&g, w));
        assert_eq!(out, "Graph name: \nTensors:\nNodes:\n");
    }
}
