use std::sync::Arc;

use log::trace;

use crate::common::{Distance, Generation, VertexId};
use crate::error::{TaxoError, TaxoResult};
use crate::graph::CompactGraph;

/// Per-vertex search state with generation-stamped validity.
///
/// Instead of clearing the `distance`/`predecessor` arrays before every
/// search, each slot carries the generation that last wrote it; a slot is
/// current iff its stamp equals `generation`. Starting a new search is then
/// a counter increment, and the arrays are allocated exactly once.
#[derive(Debug, Clone)]
struct SearchState {
    stamp: Vec<Generation>,
    distance: Vec<Distance>,
    predecessor: Vec<VertexId>,
    generation: Generation,
}

impl SearchState {
    fn new(num_vertices: usize) -> Self {
        // Stamps start at zero and the generation at one, so a fresh
        // engine has no vertex visited even before the first reset.
        Self {
            stamp: vec![0; num_vertices],
            distance: vec![0; num_vertices],
            predecessor: vec![0; num_vertices],
            generation: 1,
        }
    }

    /// Begins a new generation. On counter overflow every stamp is cleared
    /// back to zero so no slot written in a previous epoch can be misread
    /// as current; the counter restarts at one and stays nonzero, so the
    /// cleared stamps can never match it.
    fn advance(&mut self) {
        if self.generation == Generation::MAX {
            trace!("search generation wrapped, clearing {} stamps", self.stamp.len());
            self.stamp.fill(0);
            self.generation = 1;
        } else {
            self.generation += 1;
        }
    }

    #[inline]
    fn is_visited(&self, vertex: VertexId) -> bool {
        match self.stamp.get(vertex as usize) {
            Some(&stamp) => stamp == self.generation,
            None => false,
        }
    }

    #[inline]
    fn visit(&mut self, vertex: VertexId, distance: Distance, predecessor: VertexId) {
        let index = vertex as usize;
        self.stamp[index] = self.generation;
        self.distance[index] = distance;
        self.predecessor[index] = predecessor;
    }
}

/// Reusable FIFO frontier. Backed by one vertex-capacity buffer; clearing
/// resets the head cursor and length without touching elements.
#[derive(Debug, Clone)]
struct Frontier {
    queue: Vec<VertexId>,
    head: usize,
}

impl Frontier {
    fn new(capacity: usize) -> Self {
        Self {
            queue: Vec::with_capacity(capacity),
            head: 0,
        }
    }

    #[inline]
    fn clear(&mut self) {
        self.queue.clear();
        self.head = 0;
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.head == self.queue.len()
    }

    #[inline]
    fn enqueue(&mut self, vertex: VertexId) {
        self.queue.push(vertex);
    }

    #[inline]
    fn dequeue(&mut self) -> Option<VertexId> {
        let vertex = self.queue.get(self.head).copied()?;
        self.head += 1;
        Some(vertex)
    }
}

/// Steppable multi-source BFS over a shared [`CompactGraph`].
///
/// One instance runs arbitrarily many searches; `reset` is O(1) amortized
/// thanks to the generation stamps (O(V) only on the rare counter
/// wraparound). `step` advances the search by a single dequeued vertex so
/// two engines can be driven in lockstep by an outer loop.
#[derive(Debug, Clone)]
pub struct ReusableBfs {
    graph: Arc<CompactGraph>,
    state: SearchState,
    frontier: Frontier,
    current_distance: Distance,
}

impl ReusableBfs {
    pub fn new(graph: Arc<CompactGraph>) -> Self {
        let num_vertices = graph.num_vertices();
        Self {
            graph,
            state: SearchState::new(num_vertices),
            frontier: Frontier::new(num_vertices),
            current_distance: 0,
        }
    }

    pub fn graph(&self) -> &Arc<CompactGraph> {
        &self.graph
    }

    /// Begins a new search. Previous results become unreadable immediately.
    pub fn reset(&mut self) {
        self.state.advance();
        self.frontier.clear();
        self.current_distance = 0;
    }

    /// Seeds the current search with `sources`, all at distance zero.
    /// Duplicate ids are enqueued once.
    pub fn add_sources(&mut self, sources: &[VertexId]) -> TaxoResult<()> {
        if sources.is_empty() {
            return Err(TaxoError::Search("empty source set".into()));
        }
        for &source in sources {
            if !self.graph.contains(source) {
                let err = format!("source vertex {source} is out of range");
                return Err(TaxoError::Search(err));
            }
        }
        for &source in sources {
            if self.state.is_visited(source) {
                continue;
            }
            self.state.visit(source, 0, source);
            self.frontier.enqueue(source);
        }
        Ok(())
    }

    /// Dequeues and expands one frontier vertex, returning it; `None` once
    /// the frontier is exhausted. FIFO order keeps the layer-by-layer BFS
    /// guarantee the lockstep driver relies on.
    pub fn step(&mut self) -> Option<VertexId> {
        let vertex = self.frontier.dequeue()?;
        self.current_distance = self.state.distance[vertex as usize];
        let next_distance = self.current_distance + 1;
        for &neighbor in self.graph.neighbors(vertex) {
            if self.state.is_visited(neighbor) {
                continue;
            }
            self.state.visit(neighbor, next_distance, vertex);
            self.frontier.enqueue(neighbor);
        }
        Some(vertex)
    }

    /// Runs the current search to exhaustion.
    pub fn run(&mut self) {
        while self.step().is_some() {}
    }

    /// Empties the frontier so further `step` calls return `None`. Already
    /// stamped state stays queryable; used by the lockstep driver to prune
    /// a side that can no longer improve the answer.
    pub fn terminate(&mut self) {
        self.frontier.clear();
    }

    /// Distance of the most recently dequeued vertex, i.e. how far the
    /// frontier has advanced.
    pub fn current_distance(&self) -> Distance {
        self.current_distance
    }

    pub fn has_path_to(&self, vertex: VertexId) -> bool {
        self.state.is_visited(vertex)
    }

    pub fn distance_to(&self, vertex: VertexId) -> Option<Distance> {
        if !self.state.is_visited(vertex) {
            return None;
        }
        Some(self.state.distance[vertex as usize])
    }

    /// Shortest path from a source of the current search to `vertex`,
    /// source first; `None` if `vertex` was not reached.
    pub fn path_to(&self, vertex: VertexId) -> Option<Vec<VertexId>> {
        if !self.state.is_visited(vertex) {
            return None;
        }
        let mut path = vec![vertex];
        let mut current = vertex;
        while self.state.distance[current as usize] != 0 {
            current = self.state.predecessor[current as usize];
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::build_compact_graph;

    //      4
    //      |
    //      2   3
    //       \ /
    //        1
    //        |
    //        0
    fn diamond() -> Arc<CompactGraph> {
        build_compact_graph(5, &[(1, 0), (2, 1), (3, 1), (4, 2)])
    }

    #[test]
    fn test_single_source_distances() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.reset();
        bfs.add_sources(&[4]).unwrap();
        bfs.run();

        assert_eq!(bfs.distance_to(4), Some(0));
        assert_eq!(bfs.distance_to(2), Some(1));
        assert_eq!(bfs.distance_to(1), Some(2));
        assert_eq!(bfs.distance_to(0), Some(3));
        assert_eq!(bfs.distance_to(3), None);
        assert!(!bfs.has_path_to(3));
        assert!(bfs.has_path_to(0));
    }

    #[test]
    fn test_multi_source_takes_minimum() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.reset();
        bfs.add_sources(&[4, 3]).unwrap();
        bfs.run();

        // 1 is one hop from 3 even though it is two hops from 4.
        assert_eq!(bfs.distance_to(1), Some(1));
        assert_eq!(bfs.distance_to(0), Some(2));
        assert_eq!(bfs.distance_to(2), Some(1));
    }

    #[test]
    fn test_step_is_fifo() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.reset();
        bfs.add_sources(&[4, 3]).unwrap();

        assert_eq!(bfs.step(), Some(4));
        assert_eq!(bfs.current_distance(), 0);
        assert_eq!(bfs.step(), Some(3));
        assert_eq!(bfs.current_distance(), 0);
        assert_eq!(bfs.step(), Some(2));
        assert_eq!(bfs.current_distance(), 1);
        assert_eq!(bfs.step(), Some(1));
        assert_eq!(bfs.step(), Some(0));
        assert_eq!(bfs.current_distance(), 2);
        assert_eq!(bfs.step(), None);
    }

    #[test]
    fn test_reset_discards_previous_search() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.reset();
        bfs.add_sources(&[4]).unwrap();
        bfs.run();
        assert!(bfs.has_path_to(0));

        bfs.reset();
        bfs.add_sources(&[3]).unwrap();
        // Nothing from the old generation is visible before stepping.
        assert!(!bfs.has_path_to(4));
        assert!(!bfs.has_path_to(0));
        bfs.run();
        assert_eq!(bfs.distance_to(0), Some(2));
        assert_eq!(bfs.distance_to(4), None);
    }

    #[test]
    fn test_terminate_stops_stepping_but_keeps_state() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.reset();
        bfs.add_sources(&[4]).unwrap();
        assert_eq!(bfs.step(), Some(4));
        bfs.terminate();
        assert_eq!(bfs.step(), None);
        // The part explored before termination is still readable.
        assert_eq!(bfs.distance_to(2), Some(1));
        assert_eq!(bfs.distance_to(1), None);
    }

    #[test]
    fn test_add_sources_validation() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.reset();
        assert!(matches!(
            bfs.add_sources(&[]),
            Err(TaxoError::Search(_))
        ));
        assert!(matches!(
            bfs.add_sources(&[5]),
            Err(TaxoError::Search(_))
        ));
        // Duplicates are fine and enqueued once.
        bfs.add_sources(&[2, 2]).unwrap();
        assert_eq!(bfs.step(), Some(2));
        assert_eq!(bfs.step(), Some(1));
        assert_eq!(bfs.step(), Some(0));
        assert_eq!(bfs.step(), None);
    }

    #[test]
    fn test_path_to() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.reset();
        bfs.add_sources(&[4]).unwrap();
        bfs.run();

        assert_eq!(bfs.path_to(0), Some(vec![4, 2, 1, 0]));
        assert_eq!(bfs.path_to(4), Some(vec![4]));
        assert_eq!(bfs.path_to(3), None);
    }

    #[test]
    fn test_generation_wraparound() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.reset();
        bfs.add_sources(&[4]).unwrap();
        bfs.run();

        // Force the next reset to wrap the generation counter.
        bfs.state.generation = Generation::MAX;
        bfs.reset();
        assert_eq!(bfs.state.generation, 1);
        // Stamps from before the wrap must not read as visited.
        assert!(!bfs.has_path_to(4));
        assert!(!bfs.has_path_to(0));

        bfs.add_sources(&[3]).unwrap();
        bfs.run();
        assert_eq!(bfs.distance_to(0), Some(2));
        assert_eq!(bfs.distance_to(4), None);
    }

    #[test]
    fn test_searches_after_wraparound_stay_consistent() {
        let mut bfs = ReusableBfs::new(diamond());
        bfs.state.generation = Generation::MAX - 1;
        for _ in 0..3 {
            bfs.reset();
            bfs.add_sources(&[4]).unwrap();
            bfs.run();
            assert_eq!(bfs.distance_to(0), Some(3));
            assert_eq!(bfs.distance_to(3), None);
        }
    }
}
