//! The lineage multigraph.
//!
//! Nodes are fully qualified data names; edges are labeled with the kind of
//! step that moved data between them. Parallel edges are expected (the same
//! pair of tables can be linked by several steps) and cycles are legal
//! (iterative jobs write back to their inputs), so no ordering is imposed.

use petgraph::dot::{Config, Dot};
use petgraph::graph::{Graph, NodeIndex};
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::sm_component::Component;
use crate::sm_log::Procedure;

/// A directed multigraph of `table --(step kind)--> table` edges.
#[derive(Debug, Default)]
pub struct LineageGraph {
    graph: Graph<String, String>,
    nodes: HashMap<String, NodeIndex>,
}

impl LineageGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph for a script's components. Components without both
    /// an input and an output contribute no edges.
    pub fn from_components(components: &[Component]) -> Self {
        let mut g = Self::new();
        for comp in components {
            let Some(label) = comp.step_label() else {
                continue;
            };
            let (Some(ins), Some(outs)) = (comp.data_in(), comp.data_out()) else {
                continue;
            };
            for data_in in ins {
                for data_out in outs {
                    g.add_edge(&data_in.to_string(), &data_out.to_string(), label);
                }
            }
        }
        g
    }

    /// Builds the graph for a log's grouped procedures. Libref bookkeeping
    /// procedures and unclassified groups never contribute edges.
    pub fn from_procedures(procedures: &[Procedure]) -> Self {
        let mut g = Self::new();
        for proc in procedures {
            let kind = proc.kind.to_uppercase();
            if kind.is_empty() || kind == "LIBREFASSIGN" || kind == "LIBREFDEASSIGN" {
                continue;
            }
            for data_in in &proc.inputs {
                for data_out in &proc.outputs {
                    g.add_edge(data_in, data_out, &kind);
                }
            }
        }
        g
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        match self.nodes.get(name) {
            Some(&ix) => ix,
            None => {
                let ix = self.graph.add_node(name.to_string());
                self.nodes.insert(name.to_string(), ix);
                ix
            }
        }
    }

    /// Adds one labeled edge, interning both endpoints.
    pub fn add_edge(&mut self, from: &str, to: &str, label: &str) {
        let a = self.node(from);
        let b = self.node(to);
        self.graph.add_edge(a, b, label.to_string());
    }

    /// Number of distinct data names seen.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges, parallel edges counted individually.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Edges as `(from, to, label)` triples, in insertion order.
    pub fn edges(&self) -> Vec<(String, String, String)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some((
                    self.graph[a].clone(),
                    self.graph[b].clone(),
                    self.graph[e].clone(),
                ))
            })
            .collect()
    }

    /// Serializes the graph in DOT format with the layout attributes the
    /// downstream renderer expects (`rankdir=LR`, `splines=line`).
    pub fn to_dot(&self) -> String {
        let body = Dot::with_config(&self.graph, &[Config::GraphContentOnly]);
        let mut out = String::new();
        let _ = writeln!(out, "digraph {{");
        let _ = writeln!(out, "    graph [rankdir=LR, splines=line]");
        let _ = write!(out, "{body}");
        let _ = writeln!(out, "}}");
        out
    }
}
