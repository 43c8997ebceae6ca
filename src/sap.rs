use std::sync::Arc;

use itertools::Itertools;
use log::debug;

use crate::common::{Distance, VertexId};
use crate::error::{TaxoError, TaxoResult};
use crate::graph::CompactGraph;
use crate::search::ReusableBfs;

/// A common ancestor witnessing a shortest ancestral path, together with
/// the length of that path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ancestor {
    pub vertex: VertexId,
    pub length: Distance,
}

#[derive(Debug, Clone)]
struct CachedQuery {
    key: (Vec<VertexId>, Vec<VertexId>),
    result: Option<Ancestor>,
}

/// Shortest-ancestral-path finder.
///
/// Owns two [`ReusableBfs`] sides over the same graph and advances them in
/// lockstep, one step each per iteration, so both frontiers grow together.
/// Whenever a side dequeues a vertex the other side has already reached,
/// the summed distances form a candidate answer; a side whose frontier has
/// advanced strictly beyond the best candidate is terminated, since every
/// vertex it would still dequeue can only start a longer path.
#[derive(Debug, Clone)]
pub struct Sap {
    side_a: ReusableBfs,
    side_b: ReusableBfs,
    cache: Option<CachedQuery>,
}

impl Sap {
    pub fn new(graph: Arc<CompactGraph>) -> Self {
        Self {
            side_a: ReusableBfs::new(Arc::clone(&graph)),
            side_b: ReusableBfs::new(graph),
            cache: None,
        }
    }

    /// Length of the shortest ancestral path between `v` and `w`; `None`
    /// if they share no ancestor.
    pub fn length(&mut self, v: VertexId, w: VertexId) -> TaxoResult<Option<Distance>> {
        self.length_of_sets(&[v], &[w])
    }

    /// A common ancestor of `v` and `w` on a shortest ancestral path.
    pub fn ancestor(&mut self, v: VertexId, w: VertexId) -> TaxoResult<Option<VertexId>> {
        self.ancestor_of_sets(&[v], &[w])
    }

    /// Shortest ancestral path length between any vertex in `a` and any
    /// vertex in `b`.
    pub fn length_of_sets(
        &mut self,
        a: &[VertexId],
        b: &[VertexId],
    ) -> TaxoResult<Option<Distance>> {
        let result = self.search_sets(a, b)?;
        Ok(result.map(|ancestor| ancestor.length))
    }

    /// A common ancestor participating in a shortest ancestral path
    /// between the sets `a` and `b`.
    pub fn ancestor_of_sets(
        &mut self,
        a: &[VertexId],
        b: &[VertexId],
    ) -> TaxoResult<Option<VertexId>> {
        let result = self.search_sets(a, b)?;
        Ok(result.map(|ancestor| ancestor.vertex))
    }

    /// Runs one query, returning the witnessing ancestor and path length
    /// together. Back-to-back repeats of the same unordered set pair are
    /// answered from the single-slot cache without searching.
    pub fn search_sets(
        &mut self,
        a: &[VertexId],
        b: &[VertexId],
    ) -> TaxoResult<Option<Ancestor>> {
        self.validate_set(a)?;
        self.validate_set(b)?;

        let key = normalize_key(a, b);
        if let Some(cached) = &self.cache {
            if cached.key == key {
                debug!("sap cache hit for {:?}", key);
                return Ok(cached.result);
            }
        }

        let result = self.lockstep_search(a, b)?;
        self.cache = Some(CachedQuery { key, result });
        Ok(result)
    }

    fn lockstep_search(
        &mut self,
        a: &[VertexId],
        b: &[VertexId],
    ) -> TaxoResult<Option<Ancestor>> {
        self.side_a.reset();
        self.side_a.add_sources(a)?;
        self.side_b.reset();
        self.side_b.add_sources(b)?;

        let mut best: Option<Ancestor> = None;
        loop {
            let stepped_a = self.side_a.step();
            if let Some(vertex) = stepped_a {
                update_candidate(&mut best, vertex, &self.side_a, &self.side_b);
            }
            let stepped_b = self.side_b.step();
            if let Some(vertex) = stepped_b {
                update_candidate(&mut best, vertex, &self.side_b, &self.side_a);
            }

            if let Some(ancestor) = best {
                // Strict comparison: a frontier exactly at the best length
                // can still surface an equally short witness, only a
                // strictly deeper one is provably useless.
                if self.side_a.current_distance() > ancestor.length {
                    self.side_a.terminate();
                }
                if self.side_b.current_distance() > ancestor.length {
                    self.side_b.terminate();
                }
            }

            if stepped_a.is_none() && stepped_b.is_none() {
                break;
            }
        }

        debug!("sap result for {a:?} x {b:?}: {best:?}");
        Ok(best)
    }

    fn validate_set(&self, set: &[VertexId]) -> TaxoResult<()> {
        if set.is_empty() {
            return Err(TaxoError::Query("empty source set".into()));
        }
        let graph = self.side_a.graph();
        for &vertex in set {
            if !graph.contains(vertex) {
                let err = format!("vertex id {vertex} is out of range");
                return Err(TaxoError::Query(err));
            }
        }
        Ok(())
    }
}

/// Takes the smaller candidate through `stepped`, a vertex just dequeued
/// by `own` and possibly already reached by `other`.
fn update_candidate(
    best: &mut Option<Ancestor>,
    stepped: VertexId,
    own: &ReusableBfs,
    other: &ReusableBfs,
) {
    let (own_distance, other_distance) =
        match (own.distance_to(stepped), other.distance_to(stepped)) {
            (Some(own_distance), Some(other_distance)) => (own_distance, other_distance),
            _ => return,
        };
    let length = own_distance + other_distance;
    if best.map_or(true, |current| length < current.length) {
        *best = Some(Ancestor {
            vertex: stepped,
            length,
        });
    }
}

/// Normalized, order-independent cache key: both sets sorted and
/// deduplicated, the pair itself ordered so `(a, b)` and `(b, a)` agree.
fn normalize_key(a: &[VertexId], b: &[VertexId]) -> (Vec<VertexId>, Vec<VertexId>) {
    let a: Vec<_> = a.iter().copied().sorted_unstable().dedup().collect();
    let b: Vec<_> = b.iter().copied().sorted_unstable().dedup().collect();
    if b < a {
        (b, a)
    } else {
        (a, b)
    }
}
