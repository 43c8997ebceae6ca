use std::sync::Arc;

use crate::common::VertexId;
use crate::graph::{CompactGraph, Digraph};
use crate::sap::Sap;
use crate::taxonomy::Taxonomy;

pub const SAMPLE_SYNSETS: &str = "\
0,entity,the most general concept
1,animal being,a living creature
2,plant being,a living organism lacking locomotion
3,dog,a domesticated canid
4,cat,a small feline
";

pub const SAMPLE_HYPERNYMS: &str = "\
0
1,0
2,0
3,1
4,1
";

pub fn build_digraph(num_vertices: usize, edges: &[(VertexId, VertexId)]) -> Digraph {
    let mut graph = Digraph::new(num_vertices);
    for &(src, dst) in edges {
        graph.add_edge(src, dst).unwrap();
    }
    graph
}

pub fn build_compact_graph(
    num_vertices: usize,
    edges: &[(VertexId, VertexId)],
) -> Arc<CompactGraph> {
    let graph = build_digraph(num_vertices, edges);
    Arc::new(CompactGraph::from_digraph(&graph).unwrap())
}

pub fn build_sap(num_vertices: usize, edges: &[(VertexId, VertexId)]) -> Sap {
    Sap::new(build_compact_graph(num_vertices, edges))
}

pub fn build_sample_taxonomy() -> Taxonomy {
    Taxonomy::from_readers(SAMPLE_SYNSETS.as_bytes(), SAMPLE_HYPERNYMS.as_bytes()).unwrap()
}
