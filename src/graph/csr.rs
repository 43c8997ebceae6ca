use serde::{Deserialize, Serialize};

use super::Digraph;
use crate::common::VertexId;
use crate::error::{TaxoError, TaxoResult};

/// Frozen CSR adjacency: `offsets` has one entry per vertex plus a final
/// end marker, `neighbors` holds all out-edges contiguously. Built once,
/// never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactGraph {
    offsets: Vec<usize>,
    neighbors: Vec<VertexId>,
}

impl CompactGraph {
    /// Freezes a [`Digraph`] into compact form with a two-pass counting
    /// build. Fails if the source adjacency references a vertex outside
    /// its own vertex count.
    pub fn from_digraph(graph: &Digraph) -> TaxoResult<Self> {
        let num_vertices = graph.num_vertices();

        let mut offsets = Vec::with_capacity(num_vertices + 1);
        let mut current_offset = 0;
        offsets.push(0);
        for neighbors in graph.adjacency() {
            current_offset += neighbors.len();
            offsets.push(current_offset);
        }

        let mut neighbors = Vec::with_capacity(current_offset);
        for adjacent in graph.adjacency() {
            for &dst in adjacent {
                if dst as usize >= num_vertices {
                    let err =
                        format!("neighbor id {dst} exceeds vertex count {num_vertices}");
                    return Err(TaxoError::Graph(err));
                }
                neighbors.push(dst);
            }
        }

        Ok(Self { offsets, neighbors })
    }

    pub fn num_vertices(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn num_edges(&self) -> usize {
        self.neighbors.len()
    }

    #[inline]
    pub fn contains(&self, vertex: VertexId) -> bool {
        (vertex as usize) < self.num_vertices()
    }

    /// Out-neighbors of `vertex` in edge-discovery order. Out-of-range ids
    /// read as an empty slice.
    #[inline]
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        let index = vertex as usize;
        if index >= self.num_vertices() {
            return &[];
        }
        let start = self.offsets[index];
        let end = self.offsets[index + 1];
        &self.neighbors[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_digraph;

    #[test]
    fn test_from_digraph() {
        let graph = build_digraph(4, &[(0, 1), (0, 2), (2, 3), (3, 1)]);
        let compact = CompactGraph::from_digraph(&graph).unwrap();
        let expected = CompactGraph {
            offsets: vec![0, 2, 2, 3, 4],
            neighbors: vec![1, 2, 3, 1],
        };
        assert_eq!(compact, expected);

        assert_eq!(compact.num_vertices(), 4);
        assert_eq!(compact.num_edges(), 4);
        assert_eq!(compact.neighbors(0), &[1, 2]);
        assert!(compact.neighbors(1).is_empty());
        assert_eq!(compact.neighbors(3), &[1]);
    }

    #[test]
    fn test_empty_graph() {
        let compact = CompactGraph::from_digraph(&Digraph::new(0)).unwrap();
        assert_eq!(compact.num_vertices(), 0);
        assert_eq!(compact.num_edges(), 0);
        assert!(compact.neighbors(0).is_empty());
    }

    #[test]
    fn test_neighbors_out_of_range() {
        let graph = build_digraph(2, &[(1, 0)]);
        let compact = CompactGraph::from_digraph(&graph).unwrap();
        assert!(compact.neighbors(2).is_empty());
        assert!(!compact.contains(2));
        assert!(compact.contains(1));
    }

    #[test]
    fn test_neighbor_order_is_insertion_order() {
        let graph = build_digraph(4, &[(0, 3), (0, 1), (0, 2)]);
        let compact = CompactGraph::from_digraph(&graph).unwrap();
        assert_eq!(compact.neighbors(0), &[3, 1, 2]);
    }
}
