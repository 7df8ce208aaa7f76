//! Topological scheduling of graph nodes.
//!
//! Edges are derived from tensor names: a node depends on the producer of
//! each of its inputs. The producer of a name is the last node in storage
//! order listing it as an output. Names without a producer (graph inputs,
//! constants, unresolved references) contribute no edge.
//!
//! Ordering is Kahn's algorithm with a FIFO queue seeded in storage order,
//! so the result is fully determined by the graph.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::ir::{Graph, Node};

/// Node-to-node dependencies of a graph, indexed by storage position.
#[derive(Debug, Clone)]
pub struct Dependencies<'a> {
    producers: HashMap<&'a str, usize>,
    successors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
    num_edges: usize,
}

impl<'a> Dependencies<'a> {
    pub fn build(graph: &'a Graph) -> Self {
        let nodes = graph.nodes();

        let mut producers: HashMap<&'a str, usize> = HashMap::new();
        for (pos, node) in nodes.iter().enumerate() {
            for out in node.outputs().iter().filter(|n| !n.is_empty()) {
                if let Some(prev) = producers.insert(out.as_str(), pos) {
                    log::debug!(
                        "tensor {} produced by both {} and {}; keeping the latter",
                        out,
                        nodes[prev].label(),
                        node.label()
                    );
                }
            }
        }

        let mut successors = vec![Vec::new(); nodes.len()];
        let mut in_degree = vec![0usize; nodes.len()];
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for (consumer, node) in nodes.iter().enumerate() {
            for input in node.inputs().iter().filter(|n| !n.is_empty()) {
                let Some(&producer) = producers.get(input.as_str()) else {
                    continue;
                };
                if seen.insert((producer, consumer)) {
                    successors[producer].push(consumer);
                    in_degree[consumer] += 1;
                }
            }
        }

        Self {
            producers,
            successors,
            in_degree,
            num_edges: seen.len(),
        }
    }

    /// Storage position of the node producing `tensor`.
    pub fn producer(&self, tensor: &str) -> Option<usize> {
        self.producers.get(tensor).copied()
    }

    /// Consumers of node `pos`, in the order their edges were discovered.
    pub fn successors(&self, pos: usize) -> &[usize] {
        &self.successors[pos]
    }

    pub fn in_degree(&self, pos: usize) -> usize {
        self.in_degree[pos]
    }

    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// All deduplicated edges as `(producer, consumer)` storage positions.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(p, succ)| succ.iter().map(move |&c| (p, c)))
    }

    /// Kahn's algorithm over storage positions.
    fn order(&self) -> std::result::Result<Vec<usize>, Vec<usize>> {
        let n = self.in_degree.len();
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(pos) = queue.pop_front() {
            order.push(pos);
            for &next in &self.successors[pos] {
                in_degree[next] -= 1;
                if in_degree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }

        if order.len() == n {
            Ok(order)
        } else {
            Err((0..n).filter(|&i| in_degree[i] > 0).collect())
        }
    }
}

/// Computes an execution order for `graph`.
///
/// Every producer precedes its consumers. Fails with [`Error::Cycle`] when
/// some nodes can never become ready; no partial order is returned.
pub fn schedule(graph: &Graph) -> Result<Vec<&Node>> {
    let deps = Dependencies::build(graph);
    log::debug!(
        "scheduling {} nodes over {} edges",
        graph.nodes().len(),
        deps.num_edges()
    );

    match deps.order() {
        Ok(order) => Ok(order.into_iter().map(|pos| &graph.nodes()[pos]).collect()),
        Err(stuck) => Err(Error::Cycle {
            unscheduled: stuck.into_iter().map(|pos| graph.nodes()[pos].id()).collect(),
        }),
    }
}

impl Graph {
    /// See [`schedule`].
    pub fn schedule(&self) -> Result<Vec<&Node>> {
        schedule(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DType, NodeId, Tensor, TensorKind};

    fn op(name: &str, inputs: &[&str], outputs: &[&str]) -> (String, Vec<String>, Vec<String>) {
        let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        (name.to_string(), strings(inputs), strings(outputs))
    }

    fn graph_of(nodes: Vec<(String, Vec<String>, Vec<String>)>) -> Graph {
        let mut g = Graph::named("test");
        for (id, (name, inputs, outputs)) in nodes.into_iter().enumerate() {
            g.add_node(
                Node::new(id, "Op", name)
                    .with_inputs(inputs)
                    .with_outputs(outputs),
            );
        }
        g
    }

    fn names(order: &[&Node]) -> Vec<String> {
        order.iter().map(|n| n.name().to_string()).collect()
    }

    fn position(order: &[&Node], id: NodeId) -> usize {
        order.iter().position(|n| n.id() == id).unwrap()
    }

    #[test]
    fn test_single_node() {
        let mut g = graph_of(vec![op("N0", &["X", "W"], &["Y"])]);
        g.add_tensor(Tensor::new("X", DType::F32, vec![2], TensorKind::Input));
        let order = schedule(&g).unwrap();
        assert_eq!(names(&order), ["N0"]);
    }

    #[test]
    fn test_empty_graph() {
        let g = Graph::new();
        assert!(schedule(&g).unwrap().is_empty());
    }

    #[test]
    fn test_reverse_storage_order_chain() {
        // storage: c consumes b, b consumes a
        let g = graph_of(vec![
            op("c", &["t2"], &["out"]),
            op("b", &["t1"], &["t2"]),
            op("a", &["in"], &["t1"]),
        ]);
        let order = schedule(&g).unwrap();
        assert_eq!(names(&order), ["a", "b", "c"]);
    }

    #[test]
    fn test_ties_follow_storage_order_fifo() {
        // two independent roots, each feeding a sink; join at the end
        let g = graph_of(vec![
            op("r1", &["x"], &["a"]),
            op("r2", &["x"], &["b"]),
            op("s2", &["b"], &["d"]),
            op("s1", &["a"], &["c"]),
            op("join", &["c", "d"], &["y"]),
        ]);
        let order = schedule(&g).unwrap();
        // r1, r2 seeded; r1 releases s1, r2 releases s2
        assert_eq!(names(&order), ["r1", "r2", "s1", "s2", "join"]);
    }

    #[test]
    fn test_diamond_respects_every_edge() {
        let g = graph_of(vec![
            op("sink", &["l", "r"], &["y"]),
            op("right", &["s"], &["r"]),
            op("left", &["s"], &["l"]),
            op("split", &["x"], &["s"]),
        ]);
        let order = schedule(&g).unwrap();
        let deps = Dependencies::build(&g);

        assert_eq!(order.len(), g.nodes().len());
        let mut ids: Vec<NodeId> = order.iter().map(|n| n.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), g.nodes().len());

        for (p, c) in deps.edges() {
            let (p, c) = (g.nodes()[p].id(), g.nodes()[c].id());
            assert!(position(&order, p) < position(&order, c));
        }
    }

    #[test]
    fn test_deterministic() {
        let g = graph_of(vec![
            op("d", &["b", "c"], &["e"]),
            op("b", &["a"], &["b"]),
            op("c", &["a"], &["c"]),
            op("a", &["x"], &["a"]),
            op("z", &["y"], &["w"]),
        ]);
        let first: Vec<NodeId> = schedule(&g).unwrap().iter().map(|n| n.id()).collect();
        let second: Vec<NodeId> = schedule(&g).unwrap().iter().map(|n| n.id()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_two_node_cycle_is_error() {
        let g = graph_of(vec![op("A", &["b_out"], &["a_out"]), op("B", &["a_out"], &["b_out"])]);
        match schedule(&g) {
            Err(Error::Cycle { unscheduled }) => assert_eq!(unscheduled, [0, 1]),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_downstream_nodes_also_unscheduled() {
        let g = graph_of(vec![
            op("ok", &["x"], &["a"]),
            op("A", &["a", "q"], &["p"]),
            op("B", &["p"], &["q"]),
            op("tail", &["q"], &["y"]),
        ]);
        match schedule(&g) {
            Err(Error::Cycle { unscheduled }) => assert_eq!(unscheduled, [1, 2, 3]),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_is_error() {
        let g = graph_of(vec![op("loop", &["t"], &["t"])]);
        assert!(matches!(schedule(&g), Err(Error::Cycle { .. })));
    }

    #[test]
    fn test_edges_deduplicated() {
        // consumer reads two outputs of the producer plus one twice
        let g = graph_of(vec![
            op("split", &["x"], &["a", "b"]),
            op("concat", &["a", "b", "a"], &["y"]),
        ]);
        let deps = Dependencies::build(&g);
        assert_eq!(deps.num_edges(), 1);
        assert_eq!(deps.successors(0), [1]);
        assert_eq!(deps.in_degree(1), 1);
        assert_eq!(names(&schedule(&g).unwrap()), ["split", "concat"]);
    }

    #[test]
    fn test_last_producer_wins() {
        let g = graph_of(vec![
            op("consumer", &["t"], &["y"]),
            op("first", &["x"], &["t"]),
            op("second", &["x"], &["t"]),
        ]);
        let deps = Dependencies::build(&g);
        assert_eq!(deps.producer("t"), Some(2));
        assert!(deps.successors(1).is_empty());

        let order = schedule(&g).unwrap();
        assert_eq!(names(&order), ["first", "second", "consumer"]);
    }

    #[test]
    fn test_unresolved_and_empty_names_add_no_edges() {
        let g = graph_of(vec![
            op("a", &["missing", ""], &["", "t"]),
            op("b", &["", "t"], &[""]),
        ]);
        let deps = Dependencies::build(&g);
        assert_eq!(deps.producer(""), None);
        assert_eq!(deps.producer("missing"), None);
        assert_eq!(deps.edges().collect::<Vec<_>>(), [(0, 1)]);
    }

    #[test]
    fn test_graph_method_matches_free_function() {
        let g = graph_of(vec![op("b", &["t"], &["y"]), op("a", &["x"], &["t"])]);
        let a: Vec<NodeId> = g.schedule().unwrap().iter().map(|n| n.id()).collect();
        let b: Vec<NodeId> = schedule(&g).unwrap().iter().map(|n| n.id()).collect();
        assert_eq!(a, b);
        assert_eq!(a, [1, 0]);
    }
}
