// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! GraphViz export for visualising tree shape.

use core::fmt::{self, Write};

use crate::node::NULL_INDEX;
use crate::tree::Tree;

/// Above this many in-use nodes, [`Tree::write_dot`] switches from labelled shapes to
/// unlabelled points: past this size, per-node labels make the rendered graph unreadable.
const DENSE_NODE_CUTOFF: i32 = 50;

impl Tree {
    /// Write a GraphViz `digraph` describing the tree to `out`.
    ///
    /// For a tree with at most [`DENSE_NODE_CUTOFF`] in-use nodes, internal nodes are
    /// drawn as filled boxes labelled with their height and leaves as circles labelled
    /// with their object index; past the cutoff, every node is drawn as a tiny unlabelled
    /// point so the graph stays legible at scale. Either way, a graph-level label reports
    /// the overall area ratio and summed internal area. Takes [`core::fmt::Write`] rather
    /// than `std::io::Write` so the crate stays usable in `no_std` contexts; `std` callers
    /// can target a `String` and write that to a file themselves.
    pub fn write_dot<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "digraph Tree {{")?;
        writeln!(out, "  node [fontname=\"monospace\"];")?;

        let dense = self.node_count() > DENSE_NODE_CUTOFF;
        if dense {
            writeln!(out, "  node [shape=point, width=0.05];")?;
        }

        let area_ratio = self.get_area_ratio();
        let inner_area = self.get_area();
        writeln!(
            out,
            "  labelloc=\"t\"; label=\"area ratio = {area_ratio:.3}, inner area = {inner_area:.1}\";"
        )?;

        if self.root != NULL_INDEX {
            self.write_dot_node(out, self.root, dense)?;
        }
        writeln!(out, "}}")
    }

    fn write_dot_node<W: Write>(&self, out: &mut W, index: i32, dense: bool) -> fmt::Result {
        let node = &self.nodes[index as usize];
        if !dense {
            if node.is_leaf {
                writeln!(
                    out,
                    "  n{index} [shape=circle, label=\"leaf {}\\nobj {}\"];",
                    index, node.object_index
                )?;
            } else {
                writeln!(
                    out,
                    "  n{index} [shape=box, style=filled, fillcolor=lightgray, label=\"h={}\"];",
                    node.height
                )?;
            }
        }
        if !node.is_leaf {
            writeln!(out, "  n{index} -> n{};", node.child1)?;
            writeln!(out, "  n{index} -> n{};", node.child2)?;
            self.write_dot_node(out, node.child1, dense)?;
            self.write_dot_node(out, node.child2, dense)?;
        }
        Ok(())
    }
}
